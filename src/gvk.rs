//! GroupVersionKind: the identity tuple naming a Kubernetes resource type.

use std::fmt;

use serde::Deserialize;

use crate::error::GvkError;

/// Identity of a watched resource type.
///
/// Group may be empty (core-group resources); version and kind must not be.
/// A GVK without a group is accepted here, but certain scenarios may cause
/// it to fail later in the operator's initialization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Deserialize)]
pub struct Gvk {
    #[serde(default)]
    pub group: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub kind: String,
}

impl Gvk {
    pub fn new(group: &str, version: &str, kind: &str) -> Self {
        Self {
            group: group.to_string(),
            version: version.to_string(),
            kind: kind.to_string(),
        }
    }

    /// Check that the GVK names a usable resource type: version and kind
    /// are required, group is not.
    pub fn verify(&self) -> Result<(), GvkError> {
        if self.version.is_empty() {
            return Err(GvkError::EmptyVersion);
        }
        if self.kind.is_empty() {
            return Err(GvkError::EmptyKind);
        }
        Ok(())
    }
}

impl fmt::Display for Gvk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}, Kind={}", self.group, self.version, self.kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_format() {
        let gvk = Gvk::new("cache.example.com", "v1alpha1", "Memcached");
        assert_eq!(gvk.to_string(), "cache.example.com/v1alpha1, Kind=Memcached");
    }

    #[test]
    fn test_verify_requires_version_and_kind() {
        assert!(matches!(
            Gvk::new("apps", "", "Deployment").verify(),
            Err(GvkError::EmptyVersion)
        ));
        assert!(matches!(
            Gvk::new("apps", "v1", "").verify(),
            Err(GvkError::EmptyKind)
        ));
        assert!(Gvk::new("apps", "v1", "Deployment").verify().is_ok());
    }

    #[test]
    fn test_empty_group_is_valid() {
        assert!(Gvk::new("", "v1", "ConfigMap").verify().is_ok());
    }

    #[test]
    fn test_deserialize_missing_group_defaults_to_empty() {
        let gvk: Gvk = serde_yaml::from_str("version: v1\nkind: Pod\n").unwrap();
        assert_eq!(gvk, Gvk::new("", "v1", "Pod"));
    }
}
