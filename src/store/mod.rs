pub mod cache;
pub mod distributed;
pub mod node;
pub mod shared;

pub use cache::Cache;
pub use distributed::{DistributedStore, NodeStatus, RemovalReport, StoreStats, StoreStatus};
pub use node::StorageNode;
pub use shared::SharedStore;
