//! Centralized error types for the watches loader
//!
//! Uses thiserror for typed errors that can be matched on by the
//! operator's startup sequence, which treats any of them as fatal.

use thiserror::Error;

use crate::gvk::Gvk;

/// Top-level error type for loading a watches file
#[derive(Error, Debug)]
pub enum WatchError {
    #[error("failed to read watches file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse watches file {path}: {source}")]
    Parse {
        path: String,
        source: serde_yaml::Error,
    },

    #[error("invalid GVK: {gvk}: {source}")]
    InvalidGvk { gvk: Gvk, source: GvkError },

    #[error("failed to parse '{value}' as a duration: {source}")]
    InvalidReconcilePeriod {
        value: String,
        source: humantime::DurationError,
    },

    #[error("duplicate GVK: {gvk}")]
    DuplicateGvk { gvk: Gvk },

    #[error("watch for GVK {gvk} failed validation: {source}")]
    Invalid { gvk: Gvk, source: ValidationError },
}

/// GroupVersionKind verification errors
#[derive(Error, Debug)]
pub enum GvkError {
    #[error("version must not be empty")]
    EmptyVersion,

    #[error("kind must not be empty")]
    EmptyKind,
}

/// Per-entry validation errors
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("playbook path must be absolute: {path}")]
    PlaybookNotAbsolute { path: String },

    #[error("playbook was not found: {path}")]
    PlaybookNotFound { path: String },

    #[error("role path must be absolute: {path}")]
    RoleNotAbsolute { path: String },

    #[error("role path was not found: {path}")]
    RoleNotFound { path: String },

    #[error("must specify Role or Playbook")]
    NoAnsiblePath,

    #[error("finalizer must have a name")]
    FinalizerWithoutName,

    #[error("invalid finalizer: {source}")]
    Finalizer { source: Box<ValidationError> },
}
