//! Error kinds surfaced by shards and the shard manager (spec section 7:
//! admission, routing, and infrastructure errors).

use lscc_pool::PoolError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ShardError {
    #[error("pool rejected transaction: {0}")]
    Pool(#[from] PoolError),

    #[error("no such shard: {0}")]
    UnknownShard(u32),

    #[error("no route available for cross-shard message")]
    NoRoute,

    #[error("queued for retry")]
    QueuedForRetry,

    #[error("shard is not active: {0}")]
    NotActive(u32),

    #[error("storage write failed: {0}")]
    StorageWriteFailed(String),

    #[error("block does not follow shard's chain tip")]
    InvalidBlockLink,
}

pub type ShardResult<T> = Result<T, ShardError>;
