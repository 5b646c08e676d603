use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("node {0} is already registered")]
    DuplicateNode(String),

    #[error("node {node} hashes to #{hash:08x}, already taken by {existing}")]
    HashCollision {
        node: String,
        existing: String,
        hash: u32,
    },

    #[error("node {0} not found")]
    NodeNotFound(String),

    #[error("no active nodes available")]
    StoreUnavailable,

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
