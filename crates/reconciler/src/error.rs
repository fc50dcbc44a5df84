//! Error types for the reconciler crate.
//!
//! Every failure a reconciliation pass can observe is classified into
//! exactly two categories: [`Error::is_not_found`] identifies the expected
//! not-found signal that drives state-machine branching; everything else is
//! a transient backend failure that aborts the pass and schedules a retry.

use std::fmt;

use tether_model::NamespacedName;

/// Result type alias for reconciler operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Reconciler error types.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Entity not found. Expected control flow, never surfaced as a failure.
    NotFound { key: NamespacedName },
    /// A backend operation against the remote source or local store failed.
    Backend { operation: String, reason: String },
    /// The merge policy failed.
    Merge { reason: String },
    /// The pass was cancelled before its write completed.
    Cancelled,
    /// The reconcile loop is no longer running.
    LoopStopped,
    /// Invalid configuration.
    InvalidConfig { reason: String },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound { key } => {
                write!(f, "entity '{key}' not found")
            }
            Self::Backend { operation, reason } => {
                write!(f, "backend operation '{operation}' failed: {reason}")
            }
            Self::Merge { reason } => {
                write!(f, "merge failed: {reason}")
            }
            Self::Cancelled => {
                write!(f, "reconciliation pass cancelled")
            }
            Self::LoopStopped => {
                write!(f, "reconcile loop stopped")
            }
            Self::InvalidConfig { reason } => {
                write!(f, "invalid configuration: {reason}")
            }
        }
    }
}

impl std::error::Error for Error {}

impl Error {
    /// Create a not-found error for a key.
    pub fn not_found(key: NamespacedName) -> Self {
        Self::NotFound { key }
    }

    /// Create a backend error.
    pub fn backend(operation: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Backend {
            operation: operation.into(),
            reason: reason.into(),
        }
    }

    /// Create a merge error.
    pub fn merge(reason: impl Into<String>) -> Self {
        Self::Merge {
            reason: reason.into(),
        }
    }

    /// Create an invalid config error.
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }

    /// Whether this is the expected not-found signal.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
