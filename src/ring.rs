use crate::error::{Error, Result};
use crate::hash;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RingEntry {
    pub hash: u32,
    pub node_id: String,
}

/// Node positions on the 32-bit ring, kept sorted ascending by hash.
#[derive(Debug, Default, Clone)]
pub struct HashRing {
    entries: Vec<RingEntry>,
}

impl HashRing {
    pub fn new() -> Self {
        HashRing {
            entries: Vec::new(),
        }
    }

    pub fn add_node(&mut self, node_id: &str) -> Result<u32> {
        if self.contains(node_id) {
            return Err(Error::DuplicateNode(node_id.to_owned()));
        }

        let node_hash = hash::hash_key(node_id);
        let pos = self.entries.partition_point(|e| e.hash < node_hash);
        if let Some(existing) = self.entries.get(pos).filter(|e| e.hash == node_hash) {
            return Err(Error::HashCollision {
                node: node_id.to_owned(),
                existing: existing.node_id.clone(),
                hash: node_hash,
            });
        }

        self.entries.insert(
            pos,
            RingEntry {
                hash: node_hash,
                node_id: node_id.to_owned(),
            },
        );

        Ok(node_hash)
    }

    pub fn remove_node(&mut self, node_id: &str) -> Option<RingEntry> {
        let pos = self.position_of(node_id)?;
        Some(self.entries.remove(pos))
    }

    /// Index of the entry responsible for `key`: the first entry whose hash is
    /// `>=` the key hash, wrapping to the smallest one.
    pub fn resolve_index(&self, key: &str) -> Option<usize> {
        if self.entries.is_empty() {
            return None;
        }
        let key_hash = hash::hash_key(key);
        let pos = self.entries.partition_point(|e| e.hash < key_hash);

        Some(if pos == self.entries.len() { 0 } else { pos })
    }

    pub fn resolve(&self, key: &str) -> Option<&str> {
        self.resolve_index(key)
            .map(|i| self.entries[i].node_id.as_str())
    }

    /// Entries in ring order starting at `start`, wrapping once around.
    pub fn walk_from(&self, start: usize) -> impl Iterator<Item = &RingEntry> {
        let len = self.entries.len();
        (0..len).map(move |offset| &self.entries[(start + offset) % len])
    }

    pub fn position_of(&self, node_id: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.node_id == node_id)
    }

    pub fn contains(&self, node_id: &str) -> bool {
        self.position_of(node_id).is_some()
    }

    pub fn entries(&self) -> &[RingEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
