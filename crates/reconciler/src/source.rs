//! Remote source trait and implementations.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use tether_model::NamespacedName;

use crate::error::{Error, Result};

/// The authoritative, externally-managed declarative source for entities.
///
/// Absence of a key here is authoritative over whether the entity should
/// exist at all, so `get` must distinguish not-found
/// ([`Error::is_not_found`]) from any other failure.
#[async_trait]
pub trait RemoteSource<E>: Send + Sync {
    /// Fetch the entity with the given key.
    async fn get(&self, key: &NamespacedName) -> Result<E>;
}

/// In-memory remote source for testing and development.
///
/// External mutation of the remote side is simulated with [`put`] and
/// [`remove`].
///
/// [`put`]: InMemoryRemoteSource::put
/// [`remove`]: InMemoryRemoteSource::remove
pub struct InMemoryRemoteSource<E> {
    entries: RwLock<HashMap<NamespacedName, E>>,
}

impl<E> InMemoryRemoteSource<E> {
    /// Create a new empty remote source.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Insert or replace an entity.
    pub async fn put(&self, key: NamespacedName, entity: E) {
        self.entries.write().await.insert(key, entity);
    }

    /// Remove an entity.
    pub async fn remove(&self, key: &NamespacedName) {
        self.entries.write().await.remove(key);
    }
}

impl<E> Default for InMemoryRemoteSource<E> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<E: Clone + Send + Sync> RemoteSource<E> for InMemoryRemoteSource<E> {
    async fn get(&self, key: &NamespacedName) -> Result<E> {
        self.entries
            .read()
            .await
            .get(key)
            .cloned()
            .ok_or_else(|| Error::not_found(key.clone()))
    }
}
