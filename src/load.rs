//! Loading and whole-set validation of a watches file.

use std::collections::HashSet;
use std::path::Path;

use tracing::{debug, error};

use crate::error::WatchError;
use crate::watch::{RawWatch, Watch};

/// Load watch entries from the YAML mapping file at `path`.
///
/// The pipeline is sequential and all-or-nothing: read, decode each entry
/// with defaults applied, resolve the environment-tuned fields against the
/// supplied process defaults, then reject duplicate GVKs and validate each
/// entry in document order. The first failure aborts the load; the caller
/// never sees a partial set.
///
/// The process defaults are threaded through every resolution call rather
/// than cached anywhere, so concurrent loads with different defaults
/// cannot interfere with each other.
pub fn load(
    path: impl AsRef<Path>,
    default_max_workers: u32,
    default_ansible_verbosity: u8,
) -> Result<Vec<Watch>, WatchError> {
    let path = path.as_ref();

    let content = std::fs::read_to_string(path).map_err(|source| {
        error!(path = %path.display(), error = %source, "failed to read watches file");
        WatchError::Read {
            path: path.display().to_string(),
            source,
        }
    })?;

    let raw: Vec<RawWatch> = serde_yaml::from_str(&content).map_err(|source| {
        error!(path = %path.display(), error = %source, "failed to parse watches file");
        WatchError::Parse {
            path: path.display().to_string(),
            source,
        }
    })?;

    let mut watches = Vec::with_capacity(raw.len());
    for entry in raw {
        watches.push(entry.into_watch(default_max_workers, default_ansible_verbosity)?);
    }

    let mut seen = HashSet::with_capacity(watches.len());
    for watch in &watches {
        if !seen.insert(watch.gvk.clone()) {
            return Err(WatchError::DuplicateGvk {
                gvk: watch.gvk.clone(),
            });
        }
        watch.validate().map_err(|source| WatchError::Invalid {
            gvk: watch.gvk.clone(),
            source,
        })?;
    }

    debug!(path = %path.display(), count = watches.len(), "loaded watches");
    Ok(watches)
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::time::Duration;

    use super::*;
    use crate::error::{GvkError, ValidationError};
    use crate::gvk::Gvk;

    struct Fixture {
        dir: tempfile::TempDir,
    }

    impl Fixture {
        fn new() -> Self {
            let dir = tempfile::tempdir().unwrap();
            std::fs::write(dir.path().join("playbook.yml"), "---\n").unwrap();
            std::fs::create_dir(dir.path().join("role")).unwrap();
            Self { dir }
        }

        fn playbook(&self) -> String {
            self.dir.path().join("playbook.yml").display().to_string()
        }

        fn role(&self) -> String {
            self.dir.path().join("role").display().to_string()
        }

        fn write_watches(&self, yaml: &str) -> std::path::PathBuf {
            let path = self.dir.path().join("watches.yaml");
            let mut f = std::fs::File::create(&path).unwrap();
            f.write_all(yaml.as_bytes()).unwrap();
            path
        }
    }

    #[test]
    fn test_load_full_file() {
        let fx = Fixture::new();
        let path = fx.write_watches(&format!(
            r#"
- group: app.example.com
  version: v1alpha1
  kind: LoadFullA
  playbook: {playbook}
  reconcilePeriod: 5m
  manageStatus: false
  watchClusterScopedResources: true
  vars:
    replicas: 3
    verbose: true
  blacklist:
    - group: apps
      version: v1
      kind: Deployment
- version: v1
  kind: LoadFullB
  role: {role}
  maxRunnerArtifacts: 50
  finalizer:
    name: finalizer.app.example.com
    vars:
      state: absent
"#,
            playbook = fx.playbook(),
            role = fx.role(),
        ));

        let watches = load(&path, 1, 2).unwrap();
        assert_eq!(watches.len(), 2);

        let first = &watches[0];
        assert_eq!(first.gvk, Gvk::new("app.example.com", "v1alpha1", "LoadFullA"));
        assert_eq!(first.playbook, fx.playbook());
        assert_eq!(first.reconcile_period, Duration::from_secs(300));
        assert!(!first.manage_status);
        assert!(first.watch_cluster_scoped_resources);
        assert_eq!(first.vars.len(), 2);
        assert_eq!(first.blacklist, vec![Gvk::new("apps", "v1", "Deployment")]);
        assert_eq!(first.max_workers, 1);
        assert_eq!(first.ansible_verbosity, 2);

        let second = &watches[1];
        assert_eq!(second.gvk, Gvk::new("", "v1", "LoadFullB"));
        assert_eq!(second.max_runner_artifacts, 50);
        let finalizer = second.finalizer.as_ref().unwrap();
        assert_eq!(finalizer.name, "finalizer.app.example.com");
        assert!(finalizer.playbook.is_empty() && finalizer.role.is_empty());
        assert_eq!(finalizer.vars.len(), 1);
    }

    #[test]
    fn test_load_applies_defaults_to_omitted_fields() {
        let fx = Fixture::new();
        let path = fx.write_watches(&format!(
            "- group: app.example.com\n  version: v1\n  kind: LoadDefaults\n  role: {}\n",
            fx.role(),
        ));

        let watches = load(&path, 1, 2).unwrap();
        let watch = &watches[0];
        assert_eq!(watch.max_runner_artifacts, 20);
        assert_eq!(watch.reconcile_period, Duration::ZERO);
        assert!(watch.manage_status);
        assert!(watch.watch_dependent_resources);
        assert!(!watch.watch_cluster_scoped_resources);
        assert!(watch.blacklist.is_empty());
        assert!(watch.vars.is_empty());
        assert!(watch.finalizer.is_none());
    }

    #[test]
    fn test_load_ignores_worker_fields_in_document() {
        // maxWorkers/ansibleVerbosity come from the environment only; values
        // in the file must not leak through.
        let fx = Fixture::new();
        let path = fx.write_watches(&format!(
            "- version: v1\n  kind: LoadIgnored\n  role: {}\n  maxWorkers: 42\n  ansibleVerbosity: 7\n",
            fx.role(),
        ));

        let watches = load(&path, 3, 1).unwrap();
        assert_eq!(watches[0].max_workers, 3);
        assert_eq!(watches[0].ansible_verbosity, 1);
    }

    #[test]
    fn test_load_resolves_environment_overrides() {
        let fx = Fixture::new();
        std::env::set_var("WORKER_LOADENV_APP_EXAMPLE_COM", "6");
        std::env::set_var("ANSIBLE_VERBOSITY_LOADENV_APP_EXAMPLE_COM", "4");
        let path = fx.write_watches(&format!(
            "- group: app.example.com\n  version: v1\n  kind: LoadEnv\n  role: {}\n",
            fx.role(),
        ));

        let watches = load(&path, 1, 2).unwrap();
        assert_eq!(watches[0].max_workers, 6);
        assert_eq!(watches[0].ansible_verbosity, 4);
    }

    #[test]
    fn test_load_missing_file() {
        let fx = Fixture::new();
        let err = load(fx.dir.path().join("nope.yaml"), 1, 2).unwrap_err();
        assert!(matches!(err, WatchError::Read { .. }));
    }

    #[test]
    fn test_load_malformed_yaml() {
        let fx = Fixture::new();
        let path = fx.write_watches("- version: v1\n kind: [broken\n");
        let err = load(&path, 1, 2).unwrap_err();
        assert!(matches!(err, WatchError::Parse { .. }));
    }

    #[test]
    fn test_load_rejects_duplicate_gvk() {
        let fx = Fixture::new();
        let entry = format!(
            "- group: app.example.com\n  version: v1\n  kind: LoadDupe\n  role: {}\n",
            fx.role(),
        );
        let path = fx.write_watches(&format!("{entry}{entry}"));

        let err = load(&path, 1, 2).unwrap_err();
        match err {
            WatchError::DuplicateGvk { gvk } => {
                assert_eq!(gvk, Gvk::new("app.example.com", "v1", "LoadDupe"));
            }
            other => panic!("expected DuplicateGvk, got {other:?}"),
        }
    }

    #[test]
    fn test_load_rejects_empty_kind() {
        let fx = Fixture::new();
        let path = fx.write_watches(&format!("- version: v1\n  role: {}\n", fx.role()));
        let err = load(&path, 1, 2).unwrap_err();
        assert!(matches!(
            err,
            WatchError::InvalidGvk {
                source: GvkError::EmptyKind,
                ..
            }
        ));
    }

    #[test]
    fn test_load_rejects_entry_without_automation() {
        let fx = Fixture::new();
        let path = fx.write_watches("- version: v1\n  kind: LoadNoPath\n");
        let err = load(&path, 1, 2).unwrap_err();
        assert!(matches!(
            err,
            WatchError::Invalid {
                source: ValidationError::NoAnsiblePath,
                ..
            }
        ));
    }

    #[test]
    fn test_load_fails_fast_on_first_invalid_entry() {
        let fx = Fixture::new();
        let path = fx.write_watches(&format!(
            "- version: v1\n  kind: LoadBadFirst\n  playbook: relative.yml\n- version: v1\n  kind: LoadGoodSecond\n  role: {}\n",
            fx.role(),
        ));
        let err = load(&path, 1, 2).unwrap_err();
        match err {
            WatchError::Invalid { gvk, source } => {
                assert_eq!(gvk.kind, "LoadBadFirst");
                assert!(matches!(source, ValidationError::PlaybookNotAbsolute { .. }));
            }
            other => panic!("expected Invalid, got {other:?}"),
        }
    }
}
