//! Watch entries: the binding of a GroupVersionKind to an Ansible playbook
//! or role plus its execution options.
//!
//! Entries are built once at load time and treated as immutable
//! configuration afterwards; the reconciliation runtime only reads them.

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use tracing::error;

use crate::error::{ValidationError, WatchError};
use crate::gvk::Gvk;
use crate::overrides;

/// Built-in process defaults for the fields resolved outside the watches
/// file. `load` takes explicit values instead; these apply only to entries
/// built with [`Watch::new`].
pub const DEFAULT_MAX_WORKERS: u32 = 1;
pub const DEFAULT_ANSIBLE_VERBOSITY: u8 = 2;

fn default_max_runner_artifacts() -> u32 {
    20
}

fn default_reconcile_period() -> String {
    "0s".to_string()
}

fn default_manage_status() -> bool {
    true
}

fn default_watch_dependent_resources() -> bool {
    true
}

/// One watch: a GVK mapped to the automation that reconciles it.
#[derive(Debug, Clone)]
pub struct Watch {
    /// Identity of the watched resource type; unique across the loaded set.
    pub gvk: Gvk,

    /// Resource types excluded from dependent-resource watching.
    pub blacklist: Vec<Gvk>,

    /// Absolute path to a playbook. Exactly one of playbook/role must
    /// resolve to an existing file or directory.
    pub playbook: String,

    /// Absolute path to a role.
    pub role: String,

    /// Extra parameters passed to the automation. Schema-free by design.
    pub vars: HashMap<String, serde_yaml::Value>,

    /// How many runner artifact directories to retain per resource.
    pub max_runner_artifacts: u32,

    /// Requeue interval for unchanged resources. Zero means
    /// reconcile-on-change only.
    pub reconcile_period: Duration,

    /// Automation to run on resource deletion.
    pub finalizer: Option<Finalizer>,

    /// Whether the runtime writes status subresource updates.
    pub manage_status: bool,

    pub watch_dependent_resources: bool,

    pub watch_cluster_scoped_resources: bool,

    /// Resolved from `WORKER_<KIND>_<GROUP>`, never from the watches file.
    pub max_workers: u32,

    /// Resolved from `ANSIBLE_VERBOSITY_<KIND>_<GROUP>`, never from the
    /// watches file.
    pub ansible_verbosity: u8,
}

/// Automation invoked on resource deletion, before the resource is removed
/// from the cluster.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Finalizer {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub playbook: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub vars: HashMap<String, serde_yaml::Value>,
}

/// Wire form of a watch entry.
///
/// Defaults are applied here, during deserialization, so fields omitted
/// from the document pick up the documented defaults rather than zero
/// values. `maxWorkers` and `ansibleVerbosity` have no field on purpose:
/// they are only ever resolved from the environment.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawWatch {
    #[serde(default)]
    group: String,
    #[serde(default)]
    version: String,
    #[serde(default)]
    kind: String,
    #[serde(default)]
    playbook: String,
    #[serde(default)]
    role: String,
    #[serde(default)]
    vars: HashMap<String, serde_yaml::Value>,
    #[serde(default = "default_max_runner_artifacts")]
    max_runner_artifacts: u32,
    #[serde(default = "default_reconcile_period")]
    reconcile_period: String,
    #[serde(default = "default_manage_status")]
    manage_status: bool,
    #[serde(default = "default_watch_dependent_resources")]
    watch_dependent_resources: bool,
    #[serde(default)]
    watch_cluster_scoped_resources: bool,
    #[serde(default)]
    blacklist: Vec<Gvk>,
    #[serde(default)]
    finalizer: Option<Finalizer>,
}

impl RawWatch {
    /// Finish decoding: verify the GVK, parse the reconcile period, and
    /// resolve the environment-tuned fields against the supplied defaults.
    pub(crate) fn into_watch(
        self,
        default_max_workers: u32,
        default_ansible_verbosity: u8,
    ) -> Result<Watch, WatchError> {
        let gvk = Gvk::new(&self.group, &self.version, &self.kind);
        gvk.verify().map_err(|source| WatchError::InvalidGvk {
            gvk: gvk.clone(),
            source,
        })?;

        let reconcile_period = humantime::parse_duration(&self.reconcile_period).map_err(
            |source| WatchError::InvalidReconcilePeriod {
                value: self.reconcile_period.clone(),
                source,
            },
        )?;

        let max_workers = overrides::max_workers(&gvk, default_max_workers);
        let ansible_verbosity = overrides::ansible_verbosity(&gvk, default_ansible_verbosity);

        Ok(Watch {
            gvk,
            blacklist: self.blacklist,
            playbook: self.playbook,
            role: self.role,
            vars: self.vars,
            max_runner_artifacts: self.max_runner_artifacts,
            reconcile_period,
            finalizer: self.finalizer,
            manage_status: self.manage_status,
            watch_dependent_resources: self.watch_dependent_resources,
            watch_cluster_scoped_resources: self.watch_cluster_scoped_resources,
            max_workers,
            ansible_verbosity,
        })
    }
}

impl Watch {
    /// Build a watch programmatically with the same defaults the parse
    /// path applies to omitted fields.
    pub fn new(
        gvk: Gvk,
        role: impl Into<String>,
        playbook: impl Into<String>,
        vars: HashMap<String, serde_yaml::Value>,
        finalizer: Option<Finalizer>,
    ) -> Self {
        Self {
            gvk,
            blacklist: Vec::new(),
            playbook: playbook.into(),
            role: role.into(),
            vars,
            max_runner_artifacts: default_max_runner_artifacts(),
            reconcile_period: Duration::ZERO,
            finalizer,
            manage_status: default_manage_status(),
            watch_dependent_resources: default_watch_dependent_resources(),
            watch_cluster_scoped_resources: false,
            max_workers: DEFAULT_MAX_WORKERS,
            ansible_verbosity: DEFAULT_ANSIBLE_VERBOSITY,
        }
    }

    /// Check that this watch can actually drive automation:
    /// - exactly one of playbook/role points at an existing absolute path
    /// - a finalizer, if present, has a name and either its own valid
    ///   playbook/role path or inline vars standing in for one
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Err(err) = verify_ansible_path(&self.playbook, &self.role) {
            error!(gvk = %self.gvk, error = %err, "invalid ansible path");
            return Err(err);
        }

        if let Some(finalizer) = &self.finalizer {
            if finalizer.name.is_empty() {
                error!(gvk = %self.gvk, "invalid finalizer: missing name");
                return Err(ValidationError::FinalizerWithoutName);
            }
            // A vars-only finalizer is allowed: inline variables can stand
            // in for an external automation file.
            if let Err(err) = verify_ansible_path(&finalizer.playbook, &finalizer.role) {
                if finalizer.vars.is_empty() {
                    error!(gvk = %self.gvk, error = %err, "invalid ansible path on finalizer");
                    return Err(ValidationError::Finalizer {
                        source: Box::new(err),
                    });
                }
            }
        }

        Ok(())
    }
}

/// Check that a playbook or role points at an existing absolute path.
/// Playbook wins when both are set; role is only consulted when the
/// playbook is empty.
fn verify_ansible_path(playbook: &str, role: &str) -> Result<(), ValidationError> {
    if !playbook.is_empty() {
        let path = Path::new(playbook);
        if !path.is_absolute() {
            return Err(ValidationError::PlaybookNotAbsolute {
                path: playbook.to_string(),
            });
        }
        if !path.exists() {
            return Err(ValidationError::PlaybookNotFound {
                path: playbook.to_string(),
            });
        }
    } else if !role.is_empty() {
        let path = Path::new(role);
        if !path.is_absolute() {
            return Err(ValidationError::RoleNotAbsolute {
                path: role.to_string(),
            });
        }
        if !path.exists() {
            return Err(ValidationError::RoleNotFound {
                path: role.to_string(),
            });
        }
    } else {
        return Err(ValidationError::NoAnsiblePath);
    }
    Ok(())
}
