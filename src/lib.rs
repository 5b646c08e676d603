pub mod clock;
pub mod config;
pub mod error;
pub mod hash;
pub mod ring;
pub mod store;

pub use config::StoreConfig;
pub use error::{Error, Result};
pub use ring::{HashRing, RingEntry};
pub use store::{DistributedStore, SharedStore};
