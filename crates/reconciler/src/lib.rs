//! Reconciliation engine keeping locally stored entities in sync with a
//! remote declarative source.
//!
//! This crate implements a Kubernetes-style reconciliation pattern:
//!
//! - **Remote Source**: the authoritative declarative store, mutated by
//!   external actors
//! - **Local Store**: the durable copy owned by the consuming runtime
//! - **Merge**: combine previous local state with new remote state
//! - **Outcome**: done, retry after a delay, or (reserved) fatal
//!
//! # Key Concepts
//!
//! ## Reconciliation pass
//!
//! One invocation per key:
//! 1. Read the remote source (its absence is authoritative)
//! 2. Read the local store
//! 3. Decide the transition: delete, create, or merge-update
//! 4. Issue at most one write and return the outcome
//!
//! Every failure other than the expected not-found signal aborts the pass
//! with no write and asks the caller to retry after a fixed delay.
//!
//! ## Reconcile loop
//!
//! [`ReconcileLoop`] drives a reconciler from an edge-triggered queue,
//! serializing passes and requeueing keys whose pass asked for a retry.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//!
//! use tether_model::{Datasource, NamespacedName};
//! use tether_reconciler::{
//!     InMemoryLocalStore, InMemoryRemoteSource, LoopConfig, OwnershipMerge,
//!     ReconcileLoop, Reconciler, ReconcilerConfig,
//! };
//!
//! #[tokio::main]
//! async fn main() {
//!     let source = Arc::new(InMemoryRemoteSource::new());
//!     let store = Arc::new(InMemoryLocalStore::new());
//!     let reconciler = Arc::new(Reconciler::<Datasource>::new(
//!         source,
//!         store,
//!         Arc::new(OwnershipMerge),
//!         ReconcilerConfig::default(),
//!     ));
//!
//!     let mut loop_runner = ReconcileLoop::new(reconciler, LoopConfig::default());
//!     let trigger = loop_runner.trigger();
//!
//!     // Wire `trigger` into the remote-object watch, then:
//!     // loop_runner.run().await;
//! }
//! ```

pub mod error;
pub mod r#loop;
pub mod merge;
pub mod reconciler;
pub mod source;
pub mod store;

// Re-export main types
pub use error::{Error, Result};
pub use merge::{MergePolicy, OwnershipMerge, RemoteWins};
pub use r#loop::{LoopConfig, LoopStopper, ReconcileLoop, Trigger};
pub use reconciler::{ReconcileOutcome, Reconciler, ReconcilerBuilder, ReconcilerConfig};
pub use source::{InMemoryRemoteSource, RemoteSource};
pub use store::{InMemoryLocalStore, LocalStore, StoreOp, TracingLocalStore};
