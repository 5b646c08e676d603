use std::io::Write;

use ringkv::error::{Error, Result};
use ringkv::{DistributedStore, StoreConfig};

fn execute(store: &mut DistributedStore<String>, words: &[&str]) -> Result<bool> {
    let operation = words[0].to_uppercase();

    match &operation[..] {
        "SET" => {
            if words.len() < 3 {
                println!("You must provide key and value for SET query.");
                return Ok(true);
            }
            let key = words[1];
            let value = words[2..].join(" ");
            store.set(key, value.clone())?;
            println!(
                "Stored ({}, {}) on {}",
                key,
                value,
                store.resolve_active(key).unwrap_or("?")
            );
        }
        "GET" => {
            if words.len() < 2 {
                println!("You must provide a key for GET query.");
                return Ok(true);
            }
            match store.get(words[1])? {
                Some(value) => println!("Value is: {}", value),
                None => println!("Key not present"),
            }
        }
        "DELETE" => {
            if words.len() < 2 {
                println!("You must provide a key for DELETE query.");
                return Ok(true);
            }
            match store.delete(words[1])? {
                Some(prev) => println!("Deleting: ({}, {})", words[1], prev),
                None => println!("Key not present"),
            }
        }
        "ADD" | "REMOVE" | "FAIL" | "REVIVE" if words.len() < 2 => {
            println!("You must provide a node id for {}.", operation);
        }
        "ADD" => {
            let hash = store.add_node(words[1])?;
            println!("Node {} joined at #{:08x}", words[1], hash);
        }
        "REMOVE" => {
            let report = store.remove_node(words[1]);
            println!(
                "Node {} removed: {} keys migrated",
                words[1],
                report.migrated.len()
            );
            if report.has_loss() {
                println!("Warning: keys lost: {}", report.lost.join(", "));
            }
        }
        "FAIL" => {
            store.fail_node(words[1])?;
            println!("Node {} marked failed", words[1]);
        }
        "REVIVE" => {
            store.revive_node(words[1])?;
            println!("Node {} revived", words[1]);
        }
        "STATUS" => println!("{}", store.status()),
        "EXIT" => return Ok(false),
        _ => println!("invalid entry"),
    }

    Ok(true)
}

fn main() -> Result<()> {
    env_logger::init();

    let config = StoreConfig::from_env()?;
    let mut store: DistributedStore<String> = DistributedStore::new(&config)?;

    println!("Enter a query (SET, GET, DELETE) or topology command (ADD, REMOVE, FAIL, REVIVE, STATUS).\n  Type exit to quit.");

    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let mut input = String::new();
        if std::io::stdin().read_line(&mut input)? == 0 {
            return Ok(());
        }

        let words = input.split_whitespace().collect::<Vec<&str>>();
        if words.is_empty() {
            continue;
        }

        match execute(&mut store, &words) {
            Ok(true) => {}
            Ok(false) => return Ok(()),
            Err(err @ (Error::Io(_) | Error::Config(_) | Error::Parse(_))) => return Err(err),
            Err(err) => println!("Error: {}", err),
        }
    }
}
