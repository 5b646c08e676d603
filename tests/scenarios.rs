use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use ringkv::clock::ManualClock;
use ringkv::hash::hash_key;
use ringkv::{DistributedStore, Error, Result, StoreConfig};

fn store_with(nodes: &[&str]) -> Result<DistributedStore<String>> {
    let mut store = DistributedStore::new(&StoreConfig::default())?;
    for id in nodes {
        store.add_node(id)?;
    }
    Ok(store)
}

fn expected_owner(store: &DistributedStore<String>, key: &str) -> String {
    let key_hash = hash_key(key);
    let entries = store.ring().entries();
    entries
        .iter()
        .find(|e| e.hash >= key_hash)
        .unwrap_or(&entries[0])
        .node_id
        .clone()
}

#[test]
fn test_user_read_is_served_from_cache_on_second_call() -> Result<()> {
    let mut store = store_with(&["A", "B", "C"])?;
    store.set("user:1", "Alice".into())?;

    let owner = expected_owner(&store, "user:1");
    assert_eq!(store.owner_of("user:1"), Some(owner.as_str()));
    assert_eq!(
        store.node(&owner).and_then(|n| n.get("user:1")),
        Some("Alice".into())
    );

    assert_eq!(store.get("user:1")?, Some("Alice".into()));
    let reads = store.stats().node_reads;
    assert_eq!(store.get("user:1")?, Some("Alice".into()));
    assert_eq!(store.stats().node_reads, reads);
    Ok(())
}

#[test]
fn test_adding_a_node_moves_no_existing_keys() -> Result<()> {
    let mut store = store_with(&["Node-A", "Node-B", "Node-C", "Node-D", "Node-E"])?;
    let keys: Vec<String> = (101..=106).map(|i| format!("user:{}", i)).collect();
    for key in &keys {
        store.set(key, format!("value of {}", key))?;
    }

    let holders = |store: &DistributedStore<String>| -> HashMap<String, String> {
        store
            .status()
            .nodes
            .into_iter()
            .flat_map(|n| {
                let id = n.id;
                n.keys.into_iter().map(move |k| (k, id.clone()))
            })
            .collect()
    };
    let before = holders(&store);
    assert_eq!(before.len(), keys.len());

    store.add_node("Node-F")?;

    let after = holders(&store);
    let moved: Vec<&String> = keys.iter().filter(|k| before.get(*k) != after.get(*k)).collect();
    assert!(moved.is_empty(), "keys moved on add: {:?}", moved);
    assert!(store.node("Node-F").map(|n| n.is_empty()).unwrap_or(false));
    Ok(())
}

#[test]
fn test_removing_a_node_redistributes_its_keys() -> Result<()> {
    let mut store = store_with(&["A", "B", "C"])?;

    // Pick the node that owns at least two of the first keys we try.
    let mut by_owner: HashMap<String, Vec<String>> = HashMap::new();
    for i in 0.. {
        let key = format!("key:{}", i);
        let owner = store.owner_of(&key).map(str::to_owned).unwrap_or_default();
        let owned = by_owner.entry(owner).or_default();
        owned.push(key);
        if owned.len() == 2 {
            break;
        }
    }
    let (victim, victim_keys) = by_owner
        .into_iter()
        .find(|(_, keys)| keys.len() == 2)
        .expect("some node owns two keys");

    for key in &victim_keys {
        store.set(key, format!("v-{}", key))?;
    }
    assert_eq!(store.node(&victim).map(|n| n.len()), Some(2));

    let report = store.remove_node(&victim);
    assert_eq!(report.migrated.len(), 2);
    assert!(!report.has_loss());
    assert!(store.node(&victim).is_none());
    assert!(!store.ring().contains(&victim));
    assert!(store.cache().is_empty());

    for key in &victim_keys {
        let owner = store.owner_of(key).map(str::to_owned);
        assert_ne!(owner.as_deref(), Some(victim.as_str()));
        assert_eq!(
            store.node(owner.as_deref().unwrap_or_default()).and_then(|n| n.get(key)),
            Some(format!("v-{}", key))
        );
        assert_eq!(store.get(key)?, Some(format!("v-{}", key)));
    }
    Ok(())
}

#[test]
fn test_reads_and_writes_fail_over_past_a_dead_node() -> Result<()> {
    let mut store = store_with(&["A", "B"])?;
    let key = (0..)
        .map(|i| format!("k{}", i))
        .find(|k| store.owner_of(k) == Some("A"))
        .unwrap_or_default();

    store.fail_node("A")?;
    store.set(&key, "v".into())?;
    assert_eq!(store.node("B").and_then(|n| n.get(&key)), Some("v".into()));
    assert_eq!(store.get(&key)?, Some("v".into()));

    assert_eq!(store.ring().len(), 2);
    assert!(store.ring().contains("A"));
    Ok(())
}

#[test]
fn test_value_written_before_failure_is_readable_via_failover_after_removal() -> Result<()> {
    let mut store = store_with(&["A", "B", "C"])?;
    let keys: Vec<String> = (0..30).map(|i| format!("item:{}", i)).collect();
    for key in &keys {
        store.set(key, key.to_uppercase())?;
    }

    store.fail_node("B")?;
    let report = store.remove_node("C");
    assert!(!report.has_loss());
    for (_, target) in &report.migrated {
        assert_ne!(target, "B");
    }

    for key in keys.iter().filter(|k| report.migrated.iter().any(|(m, _)| m == *k)) {
        assert_eq!(store.get(key)?, Some(key.to_uppercase()));
    }
    Ok(())
}

#[test]
fn test_cache_entry_expires_after_ttl() -> Result<()> {
    let clock = Arc::new(ManualClock::new());
    let config = StoreConfig::new(3, Duration::from_millis(5000))?;
    let mut store: DistributedStore<String> = DistributedStore::with_clock(&config, clock.clone())?;
    store.add_node("A")?;
    store.set("k", "v".into())?;

    clock.advance(Duration::from_millis(4999));
    assert_eq!(store.get("k")?, Some("v".into()));
    assert_eq!(store.stats().node_reads, 0);

    clock.advance(Duration::from_millis(1));
    assert_eq!(store.get("k")?, Some("v".into()));
    assert_eq!(store.stats().node_reads, 1);
    Ok(())
}

#[test]
fn test_cache_capacity_evicts_first_written_key() -> Result<()> {
    let mut store = store_with(&["A", "B", "C"])?;
    for key in ["a", "b", "c", "d"] {
        store.set(key, key.into())?;
    }
    let mut cached = store.cache().keys();
    cached.sort();
    assert_eq!(cached, vec!["b", "c", "d"]);
    Ok(())
}

#[test]
fn test_placement_is_deterministic() -> Result<()> {
    let mut store = store_with(&["A", "B", "C", "D"])?;
    store.fail_node("C")?;
    for i in 0..100 {
        let key = format!("k{}", i);
        let first = store.resolve_active(&key).map(str::to_owned);
        assert!(first.is_some());
        assert_eq!(store.resolve_active(&key).map(str::to_owned), first);
    }
    Ok(())
}

#[test]
fn test_all_nodes_down_is_reported_not_retried() -> Result<()> {
    let mut store = store_with(&["A"])?;
    store.set("k", "v".into())?;
    store.fail_node("A")?;
    assert!(matches!(store.set("j", "w".into()), Err(Error::StoreUnavailable)));
    // Still served from cache, which never consults nodes.
    assert_eq!(store.get("k")?, Some("v".into()));
    assert!(matches!(store.get("j"), Err(Error::StoreUnavailable)));
    Ok(())
}
