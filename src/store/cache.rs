use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::clock::{Clock, SystemClock};
use crate::config::StoreConfig;
use crate::error::Result;

#[derive(Debug)]
struct CacheEntry<V> {
    value: V,
    inserted_at: Instant,
    // Towards the most recently used end.
    prev: Option<String>,
    // Towards the least recently used end.
    next: Option<String>,
}

/// Bounded LRU cache whose entries also expire a fixed time after insertion.
///
/// Recency is tracked with a doubly linked list threaded through the entry map
/// by key, so lookups, promotion and eviction are all O(1). Reads promote an
/// entry but never extend its lifetime: the TTL always counts from the last
/// `set` of that key.
pub struct Cache<V> {
    entries: HashMap<String, CacheEntry<V>>,
    head: Option<String>,
    tail: Option<String>,
    capacity: usize,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl<V: Clone> Cache<V> {
    pub fn new(config: &StoreConfig) -> Result<Self> {
        Self::from_config(config, Arc::new(SystemClock))
    }

    pub fn from_config(config: &StoreConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        config.validate()?;
        Ok(Self::with_clock(config.cache_capacity, config.cache_ttl, clock))
    }

    fn with_clock(capacity: usize, ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Cache {
            entries: HashMap::with_capacity(capacity),
            head: None,
            tail: None,
            capacity,
            ttl,
            clock,
        }
    }

    /// An entry read exactly `ttl` after insertion is already expired.
    pub fn get(&mut self, key: &str) -> Option<V> {
        let inserted_at = self.entries.get(key)?.inserted_at;
        if self.clock.now().duration_since(inserted_at) >= self.ttl {
            self.remove(key);
            return None;
        }

        self.detach(key);
        self.push_front(key);
        self.entries.get(key).map(|e| e.value.clone())
    }

    pub fn set(&mut self, key: &str, value: V) {
        if self.remove(key).is_none() && self.entries.len() >= self.capacity {
            if let Some(lru) = self.tail.clone() {
                self.remove(&lru);
            }
        }

        self.entries.insert(
            key.to_owned(),
            CacheEntry {
                value,
                inserted_at: self.clock.now(),
                prev: None,
                next: None,
            },
        );
        self.push_front(key);
    }

    pub fn remove(&mut self, key: &str) -> Option<V> {
        if !self.entries.contains_key(key) {
            return None;
        }
        self.detach(key);
        self.entries.remove(key).map(|e| e.value)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.head = None;
        self.tail = None;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Keys from most to least recently used, expired or not.
    pub fn keys(&self) -> Vec<String> {
        let mut keys = Vec::with_capacity(self.entries.len());
        let mut cursor = self.head.clone();
        while let Some(key) = cursor {
            cursor = self.entries.get(&key).and_then(|e| e.next.clone());
            keys.push(key);
        }
        keys
    }

    fn detach(&mut self, key: &str) {
        let (prev, next) = match self.entries.get_mut(key) {
            Some(entry) => (entry.prev.take(), entry.next.take()),
            None => return,
        };

        match &prev {
            Some(p) => {
                if let Some(entry) = self.entries.get_mut(p) {
                    entry.next = next.clone();
                }
            }
            None => self.head = next.clone(),
        }
        match &next {
            Some(n) => {
                if let Some(entry) = self.entries.get_mut(n) {
                    entry.prev = prev;
                }
            }
            None => self.tail = prev,
        }
    }

    fn push_front(&mut self, key: &str) {
        let old_head = self.head.replace(key.to_owned());
        if let Some(h) = &old_head {
            if let Some(entry) = self.entries.get_mut(h) {
                entry.prev = Some(key.to_owned());
            }
        }
        if let Some(entry) = self.entries.get_mut(key) {
            entry.next = old_head;
        }
        if self.tail.is_none() {
            self.tail = Some(key.to_owned());
        }
    }
}

impl<V> std::fmt::Debug for Cache<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cache")
            .field("len", &self.entries.len())
            .field("capacity", &self.capacity)
            .field("ttl", &self.ttl)
            .finish()
    }
}
