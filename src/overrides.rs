//! Per-GVK environment overrides for runtime tuning.
//!
//! `maxWorkers` and `ansibleVerbosity` are deliberately not configurable
//! through the watches file. Cluster operators set per-GVK environment
//! variables instead, so the same mapping file can ship unchanged across
//! clusters with different resources while the CLI default stays a
//! suggestion.

use tracing::{debug, warn};

use crate::gvk::Gvk;

pub(crate) const WORKER_PREFIX: &str = "WORKER_";
pub(crate) const VERBOSITY_PREFIX: &str = "ANSIBLE_VERBOSITY_";

/// Derive the override variable name for a GVK: `{prefix}{KIND}_{GROUP}`,
/// uppercased, with every `.` replaced by `_`.
pub fn env_var_name(prefix: &str, gvk: &Gvk) -> String {
    format!("{}{}_{}", prefix, gvk.kind, gvk.group)
        .to_uppercase()
        .replace('.', "_")
}

/// Resolve the worker count for a GVK from `WORKER_<KIND>_<GROUP>`.
///
/// Values that are unset, unparsable, or not positive fall back to the
/// supplied process-wide default.
pub fn max_workers(gvk: &Gvk, default: u32) -> u32 {
    let var = env_var_name(WORKER_PREFIX, gvk);
    match lookup_integer(&var) {
        Some(value) => match u32::try_from(value) {
            Ok(workers) if workers > 0 => workers,
            _ => {
                warn!(var = %var, value, default, "worker count must be a positive u32; using default");
                default
            }
        },
        None => default,
    }
}

/// Resolve the Ansible verbosity for a GVK from
/// `ANSIBLE_VERBOSITY_<KIND>_<GROUP>`.
///
/// Values that are unset, unparsable, or outside 0..=7 fall back to the
/// supplied process-wide default.
pub fn ansible_verbosity(gvk: &Gvk, default: u8) -> u8 {
    let var = env_var_name(VERBOSITY_PREFIX, gvk);
    match lookup_integer(&var) {
        Some(value) if (0..=7).contains(&value) => value as u8,
        Some(value) => {
            warn!(var = %var, value, default, "verbosity must be in 0..=7; using default");
            default
        }
        None => default,
    }
}

fn lookup_integer(var: &str) -> Option<i64> {
    let raw = match std::env::var(var) {
        Ok(raw) => raw,
        Err(_) => {
            debug!(var = %var, "environment variable not set; using default");
            return None;
        }
    };
    match raw.parse::<i64>() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(var = %var, value = %raw, "could not parse environment variable as an integer; using default");
            None
        }
    }
}
