//! In-memory `Storage` adapter (SPEC_FULL.md ambient stack addition).
//!
//! A real durable backend (sled/rocksdb, as the teacher's crate already
//! depended on) is a collaborator to be substituted by the outer node
//! assembly -- persistent storage implementation details are explicitly
//! out of scope for the core. This adapter is what the core's own tests
//! and a development node run against.

use lscc_core::storage::{block_key, Storage, StorageError, StorageResult};
use parking_lot::RwLock;
use std::collections::BTreeMap;

/// `BTreeMap`-backed `Storage`, guarded by a single reader/writer lock.
#[derive(Default)]
pub struct InMemoryStorage {
    kv: RwLock<BTreeMap<String, Vec<u8>>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for InMemoryStorage {
    fn save_block(&self, shard_id: u32, height: u64, block_bytes: &[u8]) -> StorageResult<()> {
        self.kv
            .write()
            .insert(block_key(shard_id, height), block_bytes.to_vec());
        Ok(())
    }

    fn get_block(&self, shard_id: u32, height: u64) -> StorageResult<Vec<u8>> {
        self.kv
            .read()
            .get(&block_key(shard_id, height))
            .cloned()
            .ok_or_else(|| StorageError::NotFound(block_key(shard_id, height)))
    }

    fn save_kv(&self, key: &str, value: &[u8]) -> StorageResult<()> {
        self.kv.write().insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn get_kv(&self, key: &str) -> StorageResult<Vec<u8>> {
        self.kv
            .read()
            .get(key)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(key.to_string()))
    }
}
