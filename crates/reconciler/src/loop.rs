//! Edge-triggered reconcile loop with retry requeue.

use std::collections::HashSet;
use std::sync::Arc;

use futures::future::BoxFuture;
use futures::stream::{FuturesUnordered, StreamExt};
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info};

use tether_model::NamespacedName;

use crate::error::{Error, Result};
use crate::reconciler::{ReconcileOutcome, Reconciler};

type RetryTimers = FuturesUnordered<BoxFuture<'static, NamespacedName>>;

/// Configuration for the reconcile loop.
#[derive(Debug, Clone)]
pub struct LoopConfig {
    /// Capacity of the trigger queue.
    pub queue_capacity: usize,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self { queue_capacity: 256 }
    }
}

/// Handle used by watchers to enqueue keys for reconciliation.
#[derive(Clone)]
pub struct Trigger {
    tx: mpsc::Sender<NamespacedName>,
}

impl Trigger {
    /// Enqueue a key for reconciliation.
    pub async fn trigger(&self, key: NamespacedName) -> Result<()> {
        self.tx.send(key).await.map_err(|_| Error::LoopStopped)
    }
}

/// Edge-triggered reconciliation loop.
///
/// Owns a [`Reconciler`] and drives it from a trigger queue: watchers
/// enqueue keys on remote-object change events, the loop runs one pass per
/// key, and transient failures are requeued after the outcome's delay.
///
/// Keys are processed strictly serially, which realizes the
/// at-most-one-in-flight-per-key guarantee the reconciler requires. A key
/// already waiting on a retry timer coalesces further triggers into the
/// pending requeue.
///
/// The owning process assembles the reconcilers it wants, wraps each in a
/// loop, and runs them; nothing registers itself implicitly.
pub struct ReconcileLoop<E> {
    reconciler: Arc<Reconciler<E>>,
    rx: mpsc::Receiver<NamespacedName>,
    tx: mpsc::Sender<NamespacedName>,
    /// Keys currently waiting on a retry timer.
    waiting: HashSet<NamespacedName>,
    stop_rx: watch::Receiver<bool>,
    stop_tx: watch::Sender<bool>,
}

impl<E: Clone + PartialEq + Send + Sync + 'static> ReconcileLoop<E> {
    /// Create a new loop around a reconciler.
    pub fn new(reconciler: Arc<Reconciler<E>>, config: LoopConfig) -> Self {
        let (tx, rx) = mpsc::channel(config.queue_capacity.max(1));
        let (stop_tx, stop_rx) = watch::channel(false);
        Self {
            reconciler,
            rx,
            tx,
            waiting: HashSet::new(),
            stop_rx,
            stop_tx,
        }
    }

    /// Get a trigger handle for enqueueing keys.
    pub fn trigger(&self) -> Trigger {
        Trigger {
            tx: self.tx.clone(),
        }
    }

    /// Get a stopper handle.
    pub fn stopper(&self) -> LoopStopper {
        LoopStopper {
            stop_tx: self.stop_tx.clone(),
        }
    }

    /// Run the loop until stopped.
    pub async fn run(&mut self) -> Result<()> {
        info!("starting reconcile loop");

        let mut retries = RetryTimers::new();

        loop {
            tokio::select! {
                _ = self.stop_rx.changed() => {
                    if *self.stop_rx.borrow() {
                        info!("reconcile loop stopped");
                        return Ok(());
                    }
                }
                Some(key) = retries.next(), if !retries.is_empty() => {
                    self.waiting.remove(&key);
                    self.process(&key, &mut retries).await;
                }
                maybe_key = self.rx.recv() => {
                    match maybe_key {
                        Some(key) if self.waiting.contains(&key) => {
                            // A retry timer is already armed for this key;
                            // the pending requeue absorbs the new trigger.
                            debug!(key = %key, "trigger coalesced into pending retry");
                        }
                        Some(key) => {
                            self.process(&key, &mut retries).await;
                        }
                        None => return Err(Error::LoopStopped),
                    }
                }
            }
        }
    }

    async fn process(&mut self, key: &NamespacedName, retries: &mut RetryTimers) {
        let outcome = self
            .reconciler
            .reconcile_with_cancel(key, &self.stop_rx)
            .await;

        match outcome {
            ReconcileOutcome::Done => {
                debug!(key = %key, "reconciled");
            }
            ReconcileOutcome::RetryAfter(delay) => {
                self.waiting.insert(key.clone());
                let key = key.clone();
                retries.push(Box::pin(async move {
                    tokio::time::sleep(delay).await;
                    key
                }));
            }
            ReconcileOutcome::Fatal(reason) => {
                error!(key = %key, reason = %reason, "entity cannot be reconciled, dropping key");
            }
        }
    }
}

/// Handle to stop a reconcile loop.
#[derive(Clone)]
pub struct LoopStopper {
    stop_tx: watch::Sender<bool>,
}

impl LoopStopper {
    /// Stop the loop. An in-flight pass observes the signal as its cancel
    /// signal and aborts before writing.
    pub fn stop(&self) {
        let _ = self.stop_tx.send(true);
    }
}
