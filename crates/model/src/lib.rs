//! Domain types for declarative datasource synchronization.
//!
//! A datasource exists as two independently-owned copies: a remote copy in
//! the authoritative declarative source, and a local copy in the runtime's
//! own store. This crate defines the entity shared by both sides and the
//! field-ownership rules that combine them:
//!
//! - **`DatasourceSpec`** is remote-owned: the declarative source is
//!   authoritative for every field in it.
//! - **`DatasourceStatus`** is locally-owned: operational state written by
//!   the consuming runtime (health checks and the like), never present in
//!   the remote object.
//!
//! [`Datasource::merged_with`] applies those rules deterministically and is
//! the merge function used during reconciliation.

pub mod datasource;
pub mod error;
pub mod types;

// Re-export main types
pub use datasource::{Datasource, DatasourceSpec, DatasourceStatus};
pub use error::MergeError;
pub use types::{AccessMode, Health, NamespacedName};
