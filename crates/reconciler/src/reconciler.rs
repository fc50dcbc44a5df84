//! Reconciler implementation.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{debug, warn};

use tether_model::NamespacedName;

use crate::error::{Error, Result};
use crate::merge::{MergePolicy, RemoteWins};
use crate::source::RemoteSource;
use crate::store::LocalStore;

/// Outcome of a single reconciliation pass.
///
/// Produced exactly once per invocation; a pass performs at most one write
/// against the local store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ReconcileOutcome {
    /// The pass converged for this key.
    Done,
    /// A transient failure occurred; re-invoke for this key no earlier than
    /// the given delay.
    RetryAfter(Duration),
    /// The entity can never reconcile; do not requeue.
    ///
    /// Reserved for permanent-failure classification; the current decision
    /// table never produces it.
    Fatal(String),
}

impl ReconcileOutcome {
    /// Whether the pass converged.
    pub fn is_done(&self) -> bool {
        matches!(self, Self::Done)
    }

    /// The requested retry delay, if any.
    pub fn retry_delay(&self) -> Option<Duration> {
        match self {
            Self::RetryAfter(delay) => Some(*delay),
            _ => None,
        }
    }
}

/// Configuration for the reconciler.
#[derive(Debug, Clone)]
pub struct ReconcilerConfig {
    /// Delay before a failed pass is retried. Fixed backoff.
    pub retry_delay: Duration,
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            retry_delay: Duration::from_secs(60),
        }
    }
}

/// Reconciliation engine for one entity type.
///
/// Each invocation re-reads the remote source and the local store fresh,
/// decides a single transition, and issues at most one write:
///
/// | remote | local | action |
/// |---|---|---|
/// | absent | any | delete local copy |
/// | present | absent | create local copy from remote |
/// | present | present | merge, then update local copy |
///
/// The remote source is read first; its absence is authoritative and
/// short-circuits to deletion regardless of local state. Any unexpected
/// failure aborts the pass with no write and yields
/// [`ReconcileOutcome::RetryAfter`]; retry is the caller's job.
///
/// Invocations for different keys may run concurrently. Invocations for the
/// same key must be serialized by the caller, since the read-decide-write
/// sequence is not transactional.
pub struct Reconciler<E> {
    source: Arc<dyn RemoteSource<E>>,
    store: Arc<dyn LocalStore<E>>,
    merge: Arc<dyn MergePolicy<E>>,
    config: ReconcilerConfig,
}

impl<E: Clone + PartialEq + Send + Sync + 'static> Reconciler<E> {
    /// Create a new reconciler with all collaborators bound up front.
    pub fn new(
        source: Arc<dyn RemoteSource<E>>,
        store: Arc<dyn LocalStore<E>>,
        merge: Arc<dyn MergePolicy<E>>,
        config: ReconcilerConfig,
    ) -> Self {
        Self {
            source,
            store,
            merge,
            config,
        }
    }

    /// Get the configuration.
    pub fn config(&self) -> &ReconcilerConfig {
        &self.config
    }

    /// Run one reconciliation pass for the given key.
    pub async fn reconcile(&self, key: &NamespacedName) -> ReconcileOutcome {
        let result = self.run_pass(key, None).await;
        self.finish(key, result)
    }

    /// Run one reconciliation pass, aborting without a write if the cancel
    /// signal flips to `true` before the write is issued.
    pub async fn reconcile_with_cancel(
        &self,
        key: &NamespacedName,
        cancel: &watch::Receiver<bool>,
    ) -> ReconcileOutcome {
        let result = self.run_pass(key, Some(cancel)).await;
        self.finish(key, result)
    }

    fn finish(&self, key: &NamespacedName, result: Result<()>) -> ReconcileOutcome {
        match result {
            Ok(()) => ReconcileOutcome::Done,
            Err(e) => {
                warn!(key = %key, error = %e, "reconciliation pass failed, scheduling retry");
                ReconcileOutcome::RetryAfter(self.config.retry_delay)
            }
        }
    }

    async fn run_pass(
        &self,
        key: &NamespacedName,
        cancel: Option<&watch::Receiver<bool>>,
    ) -> Result<()> {
        debug!(key = %key, "received reconciliation request");
        check_cancelled(cancel)?;

        let remote = match self.source.get(key).await {
            Ok(remote) => remote,
            Err(e) if e.is_not_found() => {
                // The object is gone from the remote source, which means it
                // has been deleted. Reconcile by deleting it from the local
                // store as well; an already-absent local copy is success.
                debug!(key = %key, "remote entity absent, removing local copy");
                check_cancelled(cancel)?;
                return match self.store.delete(key).await {
                    Err(e) if e.is_not_found() => Ok(()),
                    other => other,
                };
            }
            Err(e) => return Err(e),
        };

        let local = match self.store.get(key).await {
            Ok(local) => local,
            Err(e) if e.is_not_found() => {
                // First sync for this key: no prior local state to merge.
                debug!(key = %key, "local entity absent, creating from remote");
                check_cancelled(cancel)?;
                return self.store.create(key, &remote).await;
            }
            Err(e) => return Err(e),
        };

        // Merge values from both sides so locally-owned fields survive the
        // remote-driven update.
        let merged = self.merge.merge(&local, &remote)?;
        if merged == local {
            debug!(key = %key, "local entity already up to date");
            return Ok(());
        }

        debug!(key = %key, "updating local entity from merge result");
        check_cancelled(cancel)?;
        self.store.update(key, &merged).await
    }
}

fn check_cancelled(cancel: Option<&watch::Receiver<bool>>) -> Result<()> {
    match cancel {
        Some(rx) if *rx.borrow() => Err(Error::Cancelled),
        _ => Ok(()),
    }
}

/// Builder for [`Reconciler`].
///
/// Fails fast at [`build`] when a collaborator handle is absent; a
/// reconciler never exists half-wired.
///
/// [`build`]: ReconcilerBuilder::build
pub struct ReconcilerBuilder<E> {
    source: Option<Arc<dyn RemoteSource<E>>>,
    store: Option<Arc<dyn LocalStore<E>>>,
    merge: Option<Arc<dyn MergePolicy<E>>>,
    config: ReconcilerConfig,
}

impl<E: Clone + PartialEq + Send + Sync + 'static> ReconcilerBuilder<E> {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            source: None,
            store: None,
            merge: None,
            config: ReconcilerConfig::default(),
        }
    }

    /// Set the remote source handle.
    pub fn with_source(mut self, source: Arc<dyn RemoteSource<E>>) -> Self {
        self.source = Some(source);
        self
    }

    /// Set the local store handle.
    pub fn with_store(mut self, store: Arc<dyn LocalStore<E>>) -> Self {
        self.store = Some(store);
        self
    }

    /// Set a custom merge policy.
    pub fn with_merge(mut self, merge: Arc<dyn MergePolicy<E>>) -> Self {
        self.merge = Some(merge);
        self
    }

    /// Set the configuration.
    pub fn with_config(mut self, config: ReconcilerConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the retry delay.
    pub fn retry_delay(mut self, delay: Duration) -> Self {
        self.config.retry_delay = delay;
        self
    }

    /// Build the reconciler.
    pub fn build(self) -> Result<Reconciler<E>> {
        let source = self
            .source
            .ok_or_else(|| Error::invalid_config("remote source handle is required"))?;

        let store = self
            .store
            .ok_or_else(|| Error::invalid_config("local store handle is required"))?;

        let merge = self.merge.unwrap_or_else(|| Arc::new(RemoteWins));

        Ok(Reconciler::new(source, store, merge, self.config))
    }
}

impl<E: Clone + PartialEq + Send + Sync + 'static> Default for ReconcilerBuilder<E> {
    fn default() -> Self {
        Self::new()
    }
}
