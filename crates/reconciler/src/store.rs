//! Local store trait and implementations.

use std::collections::HashMap;

use async_trait::async_trait;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use tether_model::NamespacedName;

use crate::error::{Error, Result};

/// Durable store owned by the consuming runtime, kept in sync with the
/// remote source.
///
/// Every operation must distinguish not-found ([`Error::is_not_found`])
/// from any other failure; other failures are opaque to the reconciler.
#[async_trait]
pub trait LocalStore<E>: Send + Sync {
    /// Fetch the entity with the given key.
    async fn get(&self, key: &NamespacedName) -> Result<E>;

    /// Create a new entity under the given key.
    async fn create(&self, key: &NamespacedName, entity: &E) -> Result<()>;

    /// Replace the entity stored under the given key.
    async fn update(&self, key: &NamespacedName, entity: &E) -> Result<()>;

    /// Delete the entity with the given key.
    async fn delete(&self, key: &NamespacedName) -> Result<()>;
}

/// A write the local store performed, recorded by [`InMemoryLocalStore`]
/// so tests can assert exact write sequences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StoreOp {
    /// An entity was created.
    Create { key: NamespacedName },
    /// An entity was updated.
    Update { key: NamespacedName },
    /// An entity was deleted.
    Delete { key: NamespacedName },
}

/// In-memory local store for testing and development.
pub struct InMemoryLocalStore<E> {
    entries: RwLock<HashMap<NamespacedName, E>>,
    journal: RwLock<Vec<StoreOp>>,
}

impl<E: Clone> InMemoryLocalStore<E> {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            journal: RwLock::new(Vec::new()),
        }
    }

    /// Seed an entity without recording a journal entry.
    pub async fn seed(&self, key: NamespacedName, entity: E) {
        self.entries.write().await.insert(key, entity);
    }

    /// Snapshot of the current contents.
    pub async fn snapshot(&self) -> HashMap<NamespacedName, E> {
        self.entries.read().await.clone()
    }

    /// Keys currently stored, in a stable order.
    pub async fn keys(&self) -> Vec<NamespacedName> {
        self.entries
            .read()
            .await
            .keys()
            .cloned()
            .sorted_by_key(ToString::to_string)
            .collect_vec()
    }

    /// Writes performed so far, in order.
    pub async fn journal(&self) -> Vec<StoreOp> {
        self.journal.read().await.clone()
    }

    /// Number of stored entities.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Whether the store is empty.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

impl<E: Clone> Default for InMemoryLocalStore<E> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<E: Clone + Send + Sync> LocalStore<E> for InMemoryLocalStore<E> {
    async fn get(&self, key: &NamespacedName) -> Result<E> {
        self.entries
            .read()
            .await
            .get(key)
            .cloned()
            .ok_or_else(|| Error::not_found(key.clone()))
    }

    async fn create(&self, key: &NamespacedName, entity: &E) -> Result<()> {
        let mut entries = self.entries.write().await;
        if entries.contains_key(key) {
            return Err(Error::backend("create", format!("'{key}' already exists")));
        }
        entries.insert(key.clone(), entity.clone());

        self.journal
            .write()
            .await
            .push(StoreOp::Create { key: key.clone() });
        Ok(())
    }

    async fn update(&self, key: &NamespacedName, entity: &E) -> Result<()> {
        let mut entries = self.entries.write().await;
        if !entries.contains_key(key) {
            return Err(Error::not_found(key.clone()));
        }
        entries.insert(key.clone(), entity.clone());

        self.journal
            .write()
            .await
            .push(StoreOp::Update { key: key.clone() });
        Ok(())
    }

    async fn delete(&self, key: &NamespacedName) -> Result<()> {
        let mut entries = self.entries.write().await;
        if entries.remove(key).is_none() {
            return Err(Error::not_found(key.clone()));
        }

        self.journal
            .write()
            .await
            .push(StoreOp::Delete { key: key.clone() });
        Ok(())
    }
}

/// A wrapper that adds tracing to a local store.
pub struct TracingLocalStore<S> {
    inner: S,
}

impl<S> TracingLocalStore<S> {
    /// Create a new tracing local store.
    pub fn new(inner: S) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<E, S> LocalStore<E> for TracingLocalStore<S>
where
    E: Send + Sync,
    S: LocalStore<E>,
{
    async fn get(&self, key: &NamespacedName) -> Result<E> {
        tracing::debug!(key = %key, "fetching entity from local store");
        self.inner.get(key).await
    }

    async fn create(&self, key: &NamespacedName, entity: &E) -> Result<()> {
        tracing::debug!(key = %key, "inserting entity into local store");
        self.inner.create(key, entity).await
    }

    async fn update(&self, key: &NamespacedName, entity: &E) -> Result<()> {
        tracing::debug!(key = %key, "updating entity in local store");
        self.inner.update(key, entity).await
    }

    async fn delete(&self, key: &NamespacedName) -> Result<()> {
        tracing::debug!(key = %key, "removing entity from local store");
        self.inner.delete(key).await
    }
}
