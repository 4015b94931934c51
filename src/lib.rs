//! # Ansible watch mapping
//!
//! Loads and validates the watches file: the declarative mapping that binds
//! Kubernetes resource kinds (GVKs) to the Ansible playbook or role that
//! reconciles them, plus per-watch execution options.
//!
//! ## Pipeline
//!
//! [`load`] runs a sequential read → decode → resolve → validate pipeline
//! and returns either a fully validated, duplicate-free set of [`Watch`]
//! entries or the first error it hit. The reconciliation runtime treats the
//! returned set as immutable configuration.
//!
//! ## Environment overrides
//!
//! `maxWorkers` and `ansibleVerbosity` are never read from the watches
//! file. They resolve from per-GVK environment variables
//! (`WORKER_<KIND>_<GROUP>`, `ANSIBLE_VERBOSITY_<KIND>_<GROUP>`) with the
//! caller's process-wide defaults as fallback — see [`overrides`].
//!
//! ## Example
//!
//! ```rust,ignore
//! let watches = ansible_watches::load("/opt/ansible/watches.yaml", 1, 2)?;
//! for watch in &watches {
//!     println!("{} -> workers={}", watch.gvk, watch.max_workers);
//! }
//! ```

pub mod error;
pub mod gvk;
pub mod load;
pub mod overrides;
pub mod watch;

pub use error::{GvkError, ValidationError, WatchError};
pub use gvk::Gvk;
pub use load::load;
pub use watch::{Finalizer, Watch, DEFAULT_ANSIBLE_VERBOSITY, DEFAULT_MAX_WORKERS};
