//! Core types for the model crate.

use serde::{Deserialize, Serialize};

/// Unique `(namespace, name)` key for one logical entity instance.
///
/// Stable across the entity's lifetime; the sole correlation key between
/// the remote source and the local store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NamespacedName {
    /// Namespace the entity lives in.
    pub namespace: String,
    /// Entity name, unique within the namespace.
    pub name: String,
}

impl NamespacedName {
    /// Create a new namespaced name.
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }
}

impl std::fmt::Display for NamespacedName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

/// How the runtime reaches a datasource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccessMode {
    /// Requests are proxied through the runtime.
    Proxy,
    /// The client talks to the datasource directly.
    Direct,
}

impl std::fmt::Display for AccessMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Proxy => "proxy",
            Self::Direct => "direct",
        };
        write!(f, "{s}")
    }
}

/// Operational health of a datasource, as observed by the runtime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Health {
    /// Not yet probed.
    #[default]
    Unknown,
    /// Last probe succeeded.
    Up,
    /// Last probe failed.
    Down,
}

impl std::fmt::Display for Health {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Unknown => "unknown",
            Self::Up => "up",
            Self::Down => "down",
        };
        write!(f, "{s}")
    }
}
