use log::info;
use ringkv::{error::Result, DistributedStore, StoreConfig};

const NODES: [&str; 5] = ["Node-A", "Node-B", "Node-C", "Node-D", "Node-E"];

const USERS: [(&str, &str); 6] = [
    ("user:101", "Alice"),
    ("user:102", "Bob"),
    ("user:103", "Charlie"),
    ("user:104", "Diana"),
    ("user:105", "Eve"),
    ("user:106", "Frank"),
];

fn read(store: &mut DistributedStore<String>, key: &str) -> Result<()> {
    let hits = store.stats().cache_hits;
    match store.get(key)? {
        Some(value) => {
            let source = if store.stats().cache_hits > hits {
                "cache".to_owned()
            } else {
                store.resolve_active(key).unwrap_or("?").to_owned()
            };
            println!("GET {} = {} ({})", key, value, source);
        }
        None => println!("GET {} -> not found", key),
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();

    let config = StoreConfig::from_env()?;
    info!(
        "Starting simulation with cache capacity {} and ttl {:?}",
        config.cache_capacity, config.cache_ttl
    );
    let mut store: DistributedStore<String> = DistributedStore::new(&config)?;

    println!("--- 1. Initializing nodes ---");
    for id in NODES {
        let hash = store.add_node(id)?;
        println!("Node {} added (hash #{:08x})", id, hash);
    }

    println!("\n--- 2. Adding data ---");
    for (key, name) in USERS {
        store.set(key, name.to_owned())?;
        println!("SET {} -> {}", key, store.resolve_active(key).unwrap_or("?"));
    }
    println!("\n{}", store.status());

    println!("\n--- 3. Reads ---");
    read(&mut store, "user:101")?;
    read(&mut store, "user:102")?;
    read(&mut store, "user:101")?;

    println!("\n--- 4. Adding a node ---");
    let before: Vec<_> = USERS
        .iter()
        .map(|(key, _)| store.owner_of(key).map(str::to_owned))
        .collect();
    store.add_node("Node-F")?;
    let moved = USERS
        .iter()
        .zip(before)
        .filter(|((key, _), owner)| store.owner_of(key).map(str::to_owned) != *owner)
        .count();
    println!("{} of {} keys now resolve to a different node; none were moved", moved, USERS.len());
    println!("\n{}", store.status());

    println!("\n--- 5. Removing a node ---");
    let report = store.remove_node("Node-C");
    for (key, target) in &report.migrated {
        println!("Moved {} -> {}", key, target);
    }
    for key in &report.lost {
        println!("Lost {}", key);
    }
    println!("\n{}", store.status());

    println!("\n--- 6. Node failure ---");
    store.fail_node("Node-A")?;
    read(&mut store, "user:101")?;
    println!("\n{}", store.status());

    Ok(())
}
