//! Error types for the model crate.

use thiserror::Error;

use crate::types::NamespacedName;

/// Errors produced when merging a local and a remote entity.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MergeError {
    #[error("cannot merge entities with different keys: local '{local}', remote '{remote}'")]
    KeyMismatch {
        local: NamespacedName,
        remote: NamespacedName,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_mismatch_display() {
        let err = MergeError::KeyMismatch {
            local: NamespacedName::new("ns1", "ds-a"),
            remote: NamespacedName::new("ns2", "ds-b"),
        };
        assert!(err.to_string().contains("ns1/ds-a"));
        assert!(err.to_string().contains("ns2/ds-b"));
    }
}
