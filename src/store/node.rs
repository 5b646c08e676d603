use std::collections::HashMap;

#[derive(Debug)]
pub struct StorageNode<V> {
    id: String,
    data: HashMap<String, V>,
    active: bool,
}

impl<V: Clone> StorageNode<V> {
    pub fn new(id: impl Into<String>) -> Self {
        StorageNode {
            id: id.into(),
            data: HashMap::new(),
            active: true,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub(crate) fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    pub fn get(&self, key: &str) -> Option<V> {
        self.data.get(key).cloned()
    }

    pub fn set(&mut self, key: &str, value: V) -> Option<V> {
        self.data.insert(key.to_owned(), value)
    }

    pub fn delete(&mut self, key: &str) -> Option<V> {
        self.data.remove(key)
    }

    pub fn keys(&self) -> Vec<String> {
        self.data.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_delete() {
        let mut node = StorageNode::new("Node-A");
        assert!(node.is_active());
        assert_eq!(node.set("user:1", "Alice".to_string()), None);
        assert_eq!(node.set("user:1", "Alicia".to_string()), Some("Alice".to_string()));
        assert_eq!(node.get("user:1"), Some("Alicia".to_string()));
        assert_eq!(node.delete("user:1"), Some("Alicia".to_string()));
        assert_eq!(node.get("user:1"), None);
        assert!(node.is_empty());
    }

    #[test]
    fn test_get_returns_owned_copy() {
        let mut node = StorageNode::new("Node-A");
        node.set("k", vec![1u8, 2, 3]);
        let mut copy = node.get("k").unwrap();
        copy.push(4);
        assert_eq!(node.get("k"), Some(vec![1, 2, 3]));
    }

    #[test]
    fn test_keys() {
        let mut node = StorageNode::new("Node-A");
        node.set("a", 1);
        node.set("b", 2);
        let mut keys = node.keys();
        keys.sort();
        assert_eq!(keys, vec!["a".to_string(), "b".to_string()]);
        assert_eq!(node.len(), 2);
    }
}
