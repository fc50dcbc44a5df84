//! Merge policies combining previous local state with new remote state.

use tether_model::Datasource;

use crate::error::{Error, Result};

/// Policy combining the previous local value and the current remote value
/// into the value to persist.
///
/// Implementations must be deterministic and free of side effects; a merge
/// failure aborts the pass and is retried like any other transient failure.
pub trait MergePolicy<E>: Send + Sync {
    /// Merge `local` (previous local value) with `remote` (current remote
    /// value).
    fn merge(&self, local: &E, remote: &E) -> Result<E>;
}

/// The remote value fully overwrites the local one.
///
/// Zero-assumption fallback for entity types without a field-ownership
/// model; any locally-owned state is lost on every sync. Prefer
/// [`OwnershipMerge`] for entities that define ownership.
pub struct RemoteWins;

impl<E: Clone> MergePolicy<E> for RemoteWins {
    fn merge(&self, _local: &E, remote: &E) -> Result<E> {
        Ok(remote.clone())
    }
}

/// Field-ownership merge for datasources.
///
/// Takes the remote-owned spec as authoritative and preserves the
/// locally-owned status, per [`Datasource::merged_with`].
pub struct OwnershipMerge;

impl MergePolicy<Datasource> for OwnershipMerge {
    fn merge(&self, local: &Datasource, remote: &Datasource) -> Result<Datasource> {
        local
            .merged_with(remote)
            .map_err(|e| Error::merge(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tether_model::{DatasourceSpec, DatasourceStatus, Health, NamespacedName};

    fn key() -> NamespacedName {
        NamespacedName::new("ns1", "ds-a")
    }

    #[test]
    fn test_remote_wins_discards_local() {
        let merged = RemoteWins.merge(&"local".to_string(), &"remote".to_string());
        assert_eq!(merged.ok(), Some("remote".to_string()));
    }

    #[test]
    fn test_ownership_merge_preserves_status() {
        let local = Datasource::new(key(), DatasourceSpec::new("prometheus", "http://x"))
            .with_status(DatasourceStatus::up());
        let remote = Datasource::new(key(), DatasourceSpec::new("prometheus", "http://y"));

        let merged = OwnershipMerge.merge(&local, &remote);
        assert!(merged.is_ok());
        let merged = merged.ok();
        assert_eq!(
            merged.as_ref().map(|m| m.spec.url.as_str()),
            Some("http://y")
        );
        assert_eq!(merged.map(|m| m.status.health), Some(Health::Up));
    }

    #[test]
    fn test_ownership_merge_failure_is_merge_error() {
        let local = Datasource::new(key(), DatasourceSpec::new("prometheus", "http://x"));
        let remote = Datasource::new(
            NamespacedName::new("ns2", "ds-b"),
            DatasourceSpec::new("prometheus", "http://y"),
        );

        let result = OwnershipMerge.merge(&local, &remote);
        assert!(matches!(result, Err(Error::Merge { .. })));
    }
}
