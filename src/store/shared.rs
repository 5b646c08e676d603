use std::sync::Arc;

use tokio::sync::Mutex;

use crate::config::StoreConfig;
use crate::error::Result;

use super::distributed::{DistributedStore, RemovalReport, StoreStats, StoreStatus};

/// Cloneable handle to a store shared between tasks.
///
/// Every call holds one exclusive lock for its whole duration, so a reader
/// never observes a removal halfway through its migration.
#[derive(Debug)]
pub struct SharedStore<V> {
    inner: Arc<Mutex<DistributedStore<V>>>,
}

impl<V> Clone for SharedStore<V> {
    fn clone(&self) -> Self {
        SharedStore {
            inner: self.inner.clone(),
        }
    }
}

impl<V: Clone> SharedStore<V> {
    pub fn new(config: &StoreConfig) -> Result<Self> {
        Ok(Self::from_store(DistributedStore::new(config)?))
    }

    pub fn from_store(store: DistributedStore<V>) -> Self {
        SharedStore {
            inner: Arc::new(Mutex::new(store)),
        }
    }

    pub async fn add_node(&self, node_id: &str) -> Result<u32> {
        self.inner.lock().await.add_node(node_id)
    }

    pub async fn remove_node(&self, node_id: &str) -> RemovalReport {
        self.inner.lock().await.remove_node(node_id)
    }

    pub async fn fail_node(&self, node_id: &str) -> Result<()> {
        self.inner.lock().await.fail_node(node_id)
    }

    pub async fn revive_node(&self, node_id: &str) -> Result<()> {
        self.inner.lock().await.revive_node(node_id)
    }

    pub async fn set(&self, key: &str, value: V) -> Result<()> {
        self.inner.lock().await.set(key, value)
    }

    pub async fn get(&self, key: &str) -> Result<Option<V>> {
        self.inner.lock().await.get(key)
    }

    pub async fn delete(&self, key: &str) -> Result<Option<V>> {
        self.inner.lock().await.delete(key)
    }

    pub async fn status(&self) -> StoreStatus {
        self.inner.lock().await.status()
    }

    pub async fn stats(&self) -> StoreStats {
        self.inner.lock().await.stats()
    }

    /// Runs `f` with exclusive access to the underlying store.
    pub async fn with_store<T>(&self, f: impl FnOnce(&mut DistributedStore<V>) -> T) -> T {
        let mut store = self.inner.lock().await;
        f(&mut store)
    }
}
