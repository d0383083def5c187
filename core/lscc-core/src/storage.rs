//! `Storage` collaborator (section 6): durable key/value contract consumed
//! by shards to persist blocks and snapshots.
//!
//! Atomicity is per single operation; no multi-op transactions are
//! required by the core. A concrete in-memory implementation lives in
//! `lscc-state`, consistent with the Non-goal that persistent storage
//! implementation details are out of scope here.

use thiserror::Error;

/// Errors a `Storage` backend can report.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StorageError {
    #[error("key not found: {0}")]
    NotFound(String),

    #[error("storage write failed: {0}")]
    WriteFailed(String),

    #[error("storage encoding error: {0}")]
    Encoding(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Durable key/value contract. Blocks are addressed by `(shard, height)`;
/// everything else goes through the flat `kv` namespace using the keyspace
/// layout from section 6 (`block:{shard}:{height}`, `shard:{id}:state`,
/// `validator:{addr}`, `conflict:{id}`).
pub trait Storage: Send + Sync {
    /// Persist the canonical-encoded block bytes for `(shard_id, height)`.
    fn save_block(&self, shard_id: u32, height: u64, block_bytes: &[u8]) -> StorageResult<()>;

    /// Fetch the canonical-encoded block bytes for `(shard_id, height)`.
    fn get_block(&self, shard_id: u32, height: u64) -> StorageResult<Vec<u8>>;

    /// Write an arbitrary key/value pair.
    fn save_kv(&self, key: &str, value: &[u8]) -> StorageResult<()>;

    /// Read an arbitrary key/value pair.
    fn get_kv(&self, key: &str) -> StorageResult<Vec<u8>>;
}

/// Canonical key for a block record, matching section 6's keyspace layout.
pub fn block_key(shard_id: u32, height: u64) -> String {
    format!("block:{}:{}", shard_id, height)
}

/// Canonical key for a shard's persisted state snapshot.
pub fn shard_state_key(shard_id: u32) -> String {
    format!("shard:{}:state", shard_id)
}

/// Canonical key for a validator record.
pub fn validator_key(address: &str) -> String {
    format!("validator:{}", address)
}

/// Canonical key for a conflict record.
pub fn conflict_key(conflict_id: &str) -> String {
    format!("conflict:{}", conflict_id)
}
