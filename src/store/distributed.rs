use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use log::{debug, info, warn};

use crate::clock::{Clock, SystemClock};
use crate::config::StoreConfig;
use crate::error::{Error, Result};
use crate::ring::HashRing;

use super::cache::Cache;
use super::node::StorageNode;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StoreStats {
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub node_reads: u64,
    pub node_writes: u64,
}

/// Outcome of removing a node. Keys in `lost` had no active node left to
/// receive them and were dropped.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RemovalReport {
    pub node: String,
    pub migrated: Vec<(String, String)>,
    pub lost: Vec<String>,
}

impl RemovalReport {
    pub fn has_loss(&self) -> bool {
        !self.lost.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeStatus {
    pub id: String,
    pub hash: u32,
    pub active: bool,
    pub keys: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreStatus {
    pub nodes: Vec<NodeStatus>,
    pub cache_len: usize,
}

impl fmt::Display for StoreStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== SYSTEM STATUS ===")?;
        for node in &self.nodes {
            let mark = if node.active { '+' } else { 'x' };
            write!(
                f,
                "{} {} #{:08x}: {} keys",
                mark,
                node.id,
                node.hash,
                node.keys.len()
            )?;
            if !node.keys.is_empty() {
                write!(f, " [{}]", node.keys.join(", "))?;
            }
            writeln!(f)?;
        }
        write!(f, "Cache size: {}", self.cache_len)
    }
}

/// Keys placed on storage nodes by consistent hashing, with a read/write-through
/// cache in front.
#[derive(Debug)]
pub struct DistributedStore<V> {
    nodes: HashMap<String, StorageNode<V>>,
    ring: HashRing,
    cache: Cache<V>,
    stats: StoreStats,
}

impl<V: Clone> DistributedStore<V> {
    pub fn new(config: &StoreConfig) -> Result<Self> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: &StoreConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        config.validate()?;
        Ok(DistributedStore {
            nodes: HashMap::new(),
            ring: HashRing::new(),
            cache: Cache::from_config(config, clock)?,
            stats: StoreStats::default(),
        })
    }

    pub fn add_node(&mut self, node_id: &str) -> Result<u32> {
        if self.nodes.contains_key(node_id) {
            return Err(Error::DuplicateNode(node_id.to_owned()));
        }
        let hash = self.ring.add_node(node_id)?;
        self.nodes
            .insert(node_id.to_owned(), StorageNode::new(node_id));
        info!("Node {} added at #{:08x}", node_id, hash);

        Ok(hash)
    }

    /// Removes a node and moves each of its keys to the owner the key resolves
    /// to once the node is gone. Unknown ids are ignored.
    pub fn remove_node(&mut self, node_id: &str) -> RemovalReport {
        let mut report = RemovalReport {
            node: node_id.to_owned(),
            ..RemovalReport::default()
        };

        let mut node = match self.nodes.remove(node_id) {
            Some(node) => node,
            None => {
                debug!("Ignoring removal of unknown node {}", node_id);
                return report;
            }
        };
        self.ring.remove_node(node_id);

        let keys = node.keys();
        info!("Redistributing {} keys from {}", keys.len(), node_id);
        for key in keys {
            let value = match node.delete(&key) {
                Some(value) => value,
                None => continue,
            };
            match self.resolve_active_mut(&key) {
                Some(target) => {
                    target.set(&key, value);
                    report.migrated.push((key, target.id().to_owned()));
                }
                None => {
                    warn!(
                        "Key {} dropped while removing {}: no active node can receive it",
                        key, node_id
                    );
                    report.lost.push(key);
                }
            }
        }

        self.cache.clear();
        info!(
            "Node {} removed ({} keys migrated, {} lost)",
            node_id,
            report.migrated.len(),
            report.lost.len()
        );

        report
    }

    pub fn fail_node(&mut self, node_id: &str) -> Result<()> {
        let node = self
            .nodes
            .get_mut(node_id)
            .ok_or_else(|| Error::NodeNotFound(node_id.to_owned()))?;
        node.set_active(false);
        info!("Node {} marked failed", node_id);
        Ok(())
    }

    pub fn revive_node(&mut self, node_id: &str) -> Result<()> {
        let node = self
            .nodes
            .get_mut(node_id)
            .ok_or_else(|| Error::NodeNotFound(node_id.to_owned()))?;
        node.set_active(true);
        info!("Node {} revived", node_id);
        Ok(())
    }

    /// Ring-resolved owner of `key`, ignoring node health.
    pub fn owner_of(&self, key: &str) -> Option<&str> {
        self.ring.resolve(key)
    }

    /// Id of the node that serves `key`: the ring owner if it is active,
    /// otherwise the next active node clockwise.
    pub fn resolve_active(&self, key: &str) -> Option<&str> {
        let start = self.ring.resolve_index(key)?;
        self.ring
            .walk_from(start)
            .find(|entry| self.nodes.get(&entry.node_id).is_some_and(|n| n.is_active()))
            .map(|entry| entry.node_id.as_str())
    }

    fn resolve_active_mut(&mut self, key: &str) -> Option<&mut StorageNode<V>> {
        let id = self.resolve_active(key)?.to_owned();
        if self.ring.resolve(key) != Some(id.as_str()) {
            info!("Rerouting {} to failover node {}", key, id);
        }
        self.nodes.get_mut(&id)
    }

    pub fn set(&mut self, key: &str, value: V) -> Result<()> {
        let node = match self.resolve_active_mut(key) {
            Some(node) => node,
            None => {
                warn!("Cannot set {}: no active nodes", key);
                return Err(Error::StoreUnavailable);
            }
        };
        node.set(key, value.clone());
        debug!("SET {} -> {}", key, node.id());
        self.stats.node_writes += 1;
        self.cache.set(key, value);

        Ok(())
    }

    pub fn get(&mut self, key: &str) -> Result<Option<V>> {
        if let Some(value) = self.cache.get(key) {
            debug!("GET {} -> cache hit", key);
            self.stats.cache_hits += 1;
            return Ok(Some(value));
        }
        self.stats.cache_misses += 1;

        let node = match self.resolve_active_mut(key) {
            Some(node) => node,
            None => {
                warn!("Cannot get {}: no active nodes", key);
                return Err(Error::StoreUnavailable);
            }
        };
        let value = node.get(key);
        debug!("GET {} -> {} ({})", key, node.id(), if value.is_some() { "found" } else { "missing" });
        self.stats.node_reads += 1;

        if let Some(value) = &value {
            self.cache.set(key, value.clone());
        }
        Ok(value)
    }

    /// Deletes `key` from the node serving it and from its ring owner, which
    /// may be failed and would otherwise hand the value back once revived.
    pub fn delete(&mut self, key: &str) -> Result<Option<V>> {
        let serving = match self.resolve_active(key) {
            Some(id) => id.to_owned(),
            None => {
                warn!("Cannot delete {}: no active nodes", key);
                return Err(Error::StoreUnavailable);
            }
        };
        let owner = self.ring.resolve(key).map(str::to_owned);

        let mut removed = self.nodes.get_mut(&serving).and_then(|n| n.delete(key));
        if let Some(owner) = owner.filter(|o| *o != serving) {
            let stale = self.nodes.get_mut(&owner).and_then(|n| n.delete(key));
            removed = removed.or(stale);
        }
        debug!("DELETE {} -> {}", key, serving);
        self.stats.node_writes += 1;
        self.cache.remove(key);

        Ok(removed)
    }

    pub fn node(&self, node_id: &str) -> Option<&StorageNode<V>> {
        self.nodes.get(node_id)
    }

    pub fn ring(&self) -> &HashRing {
        &self.ring
    }

    pub fn cache(&self) -> &Cache<V> {
        &self.cache
    }

    pub fn stats(&self) -> StoreStats {
        self.stats
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn status(&self) -> StoreStatus {
        let nodes = self
            .ring
            .entries()
            .iter()
            .filter_map(|entry| {
                let node = self.nodes.get(&entry.node_id)?;
                let mut keys = node.keys();
                keys.sort();
                Some(NodeStatus {
                    id: entry.node_id.clone(),
                    hash: entry.hash,
                    active: node.is_active(),
                    keys,
                })
            })
            .collect();

        StoreStatus {
            nodes,
            cache_len: self.cache.len(),
        }
    }
}
