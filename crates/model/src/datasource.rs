//! The datasource entity and its field-ownership merge.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::MergeError;
use crate::types::{AccessMode, Health, NamespacedName};

/// Declarative datasource configuration.
///
/// Every field here is remote-owned: the declarative source is authoritative
/// and local edits are overwritten on the next sync.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasourceSpec {
    /// Datasource kind, e.g. "prometheus" or "loki".
    pub kind: String,
    /// Base URL the runtime connects to.
    pub url: String,
    /// Access mode.
    pub access: AccessMode,
    /// Whether this is the default datasource for its namespace.
    pub is_default: bool,
    /// Free-form kind-specific options.
    pub json_data: Option<serde_json::Value>,
}

impl DatasourceSpec {
    /// Create a new spec with the given kind and URL.
    pub fn new(kind: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            url: url.into(),
            access: AccessMode::Proxy,
            is_default: false,
            json_data: None,
        }
    }

    /// Set the access mode.
    pub fn with_access(mut self, access: AccessMode) -> Self {
        self.access = access;
        self
    }

    /// Mark as the namespace default (or not).
    pub fn with_default(mut self, is_default: bool) -> Self {
        self.is_default = is_default;
        self
    }

    /// Set kind-specific options.
    pub fn with_json_data(mut self, json_data: serde_json::Value) -> Self {
        self.json_data = Some(json_data);
        self
    }
}

/// Operational state of a datasource.
///
/// Locally-owned: written by the runtime's health checks, never present in
/// the remote object, and preserved across syncs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DatasourceStatus {
    /// Observed health.
    pub health: Health,
    /// Human-readable detail for the current health.
    pub message: Option<String>,
    /// When the datasource was last probed.
    pub last_checked_at: Option<DateTime<Utc>>,
}

impl DatasourceStatus {
    /// Record a successful probe.
    pub fn up() -> Self {
        Self {
            health: Health::Up,
            message: None,
            last_checked_at: Some(Utc::now()),
        }
    }

    /// Record a failed probe with a reason.
    pub fn down(message: impl Into<String>) -> Self {
        Self {
            health: Health::Down,
            message: Some(message.into()),
            last_checked_at: Some(Utc::now()),
        }
    }
}

/// A datasource entity.
///
/// Two independently-owned copies exist at any time: one in the remote
/// declarative source and one in the local store. Reconciliation holds only
/// transient copies of either.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Datasource {
    /// Correlation key.
    pub key: NamespacedName,
    /// Remote-owned declarative configuration.
    pub spec: DatasourceSpec,
    /// Locally-owned operational state.
    pub status: DatasourceStatus,
}

impl Datasource {
    /// Create a new datasource with an empty status.
    pub fn new(key: NamespacedName, spec: DatasourceSpec) -> Self {
        Self {
            key,
            spec,
            status: DatasourceStatus::default(),
        }
    }

    /// Set the status.
    pub fn with_status(mut self, status: DatasourceStatus) -> Self {
        self.status = status;
        self
    }

    /// Merge this (previous local) value with the current remote value.
    ///
    /// Deterministic and side-effect free: the result takes `spec` wholly
    /// from `remote` and `status` wholly from `self`. Both entities must
    /// carry the same key.
    pub fn merged_with(&self, remote: &Datasource) -> Result<Datasource, MergeError> {
        if self.key != remote.key {
            return Err(MergeError::KeyMismatch {
                local: self.key.clone(),
                remote: remote.key.clone(),
            });
        }

        Ok(Datasource {
            key: self.key.clone(),
            spec: remote.spec.clone(),
            status: self.status.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key() -> NamespacedName {
        NamespacedName::new("ns1", "ds-a")
    }

    #[test]
    fn test_spec_builder() {
        let spec = DatasourceSpec::new("prometheus", "http://prom:9090")
            .with_access(AccessMode::Direct)
            .with_default(true);

        assert_eq!(spec.kind, "prometheus");
        assert_eq!(spec.url, "http://prom:9090");
        assert_eq!(spec.access, AccessMode::Direct);
        assert!(spec.is_default);
    }

    #[test]
    fn test_merge_takes_remote_spec() {
        let local = Datasource::new(key(), DatasourceSpec::new("prometheus", "http://x"));
        let remote = Datasource::new(key(), DatasourceSpec::new("prometheus", "http://y"));

        let merged = local.merged_with(&remote);
        assert!(merged.is_ok());
        assert_eq!(merged.map(|m| m.spec.url).ok(), Some("http://y".to_string()));
    }

    #[test]
    fn test_merge_preserves_local_status() {
        let local = Datasource::new(key(), DatasourceSpec::new("prometheus", "http://x"))
            .with_status(DatasourceStatus::down("connection refused"));
        let remote = Datasource::new(key(), DatasourceSpec::new("prometheus", "http://y"));

        let merged = local.merged_with(&remote);
        assert!(merged.is_ok());
        let status = merged.map(|m| m.status).ok();
        assert_eq!(status.as_ref().map(|s| s.health), Some(Health::Down));
        assert_eq!(
            status.and_then(|s| s.message),
            Some("connection refused".to_string())
        );
    }

    #[test]
    fn test_merge_rejects_mismatched_keys() {
        let local = Datasource::new(key(), DatasourceSpec::new("prometheus", "http://x"));
        let remote = Datasource::new(
            NamespacedName::new("ns2", "ds-b"),
            DatasourceSpec::new("prometheus", "http://y"),
        );

        let merged = local.merged_with(&remote);
        assert!(merged.is_err());
    }
}
