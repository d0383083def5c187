//! A single shard: lifecycle state machine, block chain, validator
//! roster, cross-shard inbox, and the pool it owns (spec section 4.2).

use crate::errors::{ShardError, ShardResult};
use crate::health::{is_healthy, ShardHealthInputs};
use lscc_core::clock::Clock;
use lscc_core::storage::{block_key, Storage};
use lscc_pool::{PoolConfig, PoolStats, TransactionPool};
use lscc_state::{Block, Transaction, TxType, Validator};
use parking_lot::RwLock;
use std::collections::VecDeque;
use std::sync::Arc;

/// Most recent inbox arrivals kept when trimming (spec section 4.2,
/// "Cleanup worker").
const INBOX_RETENTION: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShardStatus {
    Initializing,
    Active,
    Syncing,
    Inactive,
}

struct ShardInner {
    status: ShardStatus,
    chain: Vec<Block>,
    validators: Vec<Validator>,
    cross_shard_inbox: VecDeque<Transaction>,
    last_block_time_secs: u64,
}

/// One shard: owns a pool, a contiguous block chain, and a validator
/// roster. All mutable state lives behind a single lock, matching the
/// pool's own "single dedicated type, small API" design.
pub struct Shard {
    id: u32,
    layer: u32,
    n_shards: u32,
    min_validators: usize,
    staleness_limit_secs: u64,
    pool: TransactionPool,
    storage: Arc<dyn Storage>,
    clock: Arc<dyn Clock>,
    inner: RwLock<ShardInner>,
}

impl Shard {
    pub fn new(
        id: u32,
        layer: u32,
        n_shards: u32,
        pool_config: PoolConfig,
        min_validators: usize,
        staleness_limit_secs: u64,
        storage: Arc<dyn Storage>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let now = clock.now_secs();
        Self {
            id,
            layer,
            n_shards,
            min_validators,
            staleness_limit_secs,
            pool: TransactionPool::new(id, n_shards, pool_config),
            storage,
            clock,
            inner: RwLock::new(ShardInner {
                status: ShardStatus::Initializing,
                chain: Vec::new(),
                validators: Vec::new(),
                cross_shard_inbox: VecDeque::new(),
                last_block_time_secs: now,
            }),
        }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn layer(&self) -> u32 {
        self.layer
    }

    pub fn pool(&self) -> &TransactionPool {
        &self.pool
    }

    pub fn activate(&self) {
        self.inner.write().status = ShardStatus::Active;
    }

    pub fn status(&self) -> ShardStatus {
        self.inner.read().status
    }

    pub fn set_status(&self, status: ShardStatus) {
        self.inner.write().status = status;
    }

    pub fn height(&self) -> u64 {
        self.inner.read().chain.last().map(|b| b.index + 1).unwrap_or(0)
    }

    pub fn last_block_hash(&self) -> Option<String> {
        self.inner.read().chain.last().map(|b| b.hash.clone())
    }

    pub fn last_block(&self) -> Option<Block> {
        self.inner.read().chain.last().cloned()
    }

    pub fn pool_stats(&self) -> PoolStats {
        self.pool.stats()
    }

    pub fn add_validator(&self, validator: Validator) {
        self.inner.write().validators.push(validator);
    }

    pub fn validators(&self) -> Vec<Validator> {
        self.inner.read().validators.clone()
    }

    pub fn set_validators(&self, validators: Vec<Validator>) {
        self.inner.write().validators = validators;
    }

    pub fn validator_count(&self) -> usize {
        self.inner.read().validators.len()
    }

    /// Admit a submitted transaction, assuming routing has already
    /// confirmed this shard is the correct destination (spec section
    /// 4.1, `Submit`).
    pub fn add_transaction(&self, tx: Transaction) -> ShardResult<()> {
        self.pool.add(tx).map_err(ShardError::from)
    }

    /// Deliver a cross-shard arrival into this shard's inbox (spec
    /// section 4.3, "On delivery to a shard's inbox, dispatch by type:
    /// `transaction`: call `Shard.Add`"). The arrival is reassigned to
    /// this shard before being handed to the pool, since by definition
    /// it has now reached its home.
    pub fn receive_cross_shard_transaction(&self, mut tx: Transaction) -> ShardResult<()> {
        tx.shard_id = Some(self.id);
        tx.tx_type = TxType::CrossShard;
        {
            let mut inner = self.inner.write();
            inner.cross_shard_inbox.push_back(tx.clone());
            if inner.cross_shard_inbox.len() > INBOX_RETENTION {
                inner.cross_shard_inbox.pop_front();
            }
        }
        self.pool.add(tx).map_err(ShardError::from)
    }

    /// Processor worker tick: promote every arrival sitting in the
    /// pool's cross-shard map into pending (spec section 4.2).
    pub fn run_processor_tick(&self) -> usize {
        self.pool.promote_all_cross_shard()
    }

    /// Cleanup worker tick: age out confirmed entries and trim the
    /// inbox (spec section 4.2).
    pub fn run_cleanup_tick(&self) -> usize {
        let now = self.clock.now_secs();
        let evicted = self.pool.evict_aged_confirmed(now);
        let mut inner = self.inner.write();
        while inner.cross_shard_inbox.len() > INBOX_RETENTION {
            inner.cross_shard_inbox.pop_front();
        }
        evicted
    }

    /// Assemble a candidate block body from the pool (spec section 4.2,
    /// `SelectForBlock`), without appending it to the chain -- that
    /// happens only once consensus commits it.
    pub fn select_block_candidate(&self, max_k: usize) -> Vec<Transaction> {
        self.pool.select_for_block(max_k)
    }

    /// Append a committed block to this shard's chain, confirm its
    /// transactions in the pool, and persist it (spec section 4.2,
    /// `ConfirmInBlock`).
    pub fn commit_block(&self, block: Block) -> ShardResult<()> {
        {
            let inner = self.inner.read();
            if let Some(tip) = inner.chain.last() {
                if !block.follows(tip) {
                    return Err(ShardError::InvalidBlockLink);
                }
            }
        }

        let now = self.clock.now_secs();
        self.pool.confirm_in_block(&block, now);

        let bytes = lscc_core::canonical_encode(&block);
        self.storage
            .save_block(self.id, block.index, &bytes)
            .map_err(|e| ShardError::StorageWriteFailed(e.to_string()))?;

        let mut inner = self.inner.write();
        inner.chain.push(block);
        inner.last_block_time_secs = now;
        Ok(())
    }

    /// Apply a block received from a peer shard during sync; same
    /// invariants as a locally produced block (spec section 4.2, "Sync
    /// between shards").
    pub fn apply_synced_block(&self, block: Block) -> ShardResult<()> {
        if !block.merkle_root_matches() {
            return Err(ShardError::InvalidBlockLink);
        }
        self.commit_block(block)
    }

    /// Enter `syncing`, returning the height range `(self.height,
    /// target_height]` the caller should fetch (spec section 4.2,
    /// `Sync(target)`).
    pub fn begin_sync(&self, target_height: u64) -> Option<(u64, u64)> {
        let current = self.height();
        if target_height <= current {
            return None;
        }
        self.inner.write().status = ShardStatus::Syncing;
        Some((current, target_height))
    }

    pub fn finish_sync(&self) {
        self.inner.write().status = ShardStatus::Active;
    }

    pub fn is_healthy(&self) -> bool {
        let now = self.clock.now_secs();
        let (status, secs_since_last_block, validator_count) = {
            let inner = self.inner.read();
            (
                inner.status,
                now.saturating_sub(inner.last_block_time_secs),
                inner.validators.len(),
            )
        };
        is_healthy(&ShardHealthInputs {
            status,
            validator_count,
            min_validators: self.min_validators,
            secs_since_last_block,
            staleness_limit_secs: self.staleness_limit_secs,
            pool_has_capacity: self.pool.stats().has_capacity(),
        })
    }

    pub fn storage_key(&self, height: u64) -> String {
        block_key(self.id, height)
    }

    /// `true` iff `tx_id` has reached `processing` or `confirmed` in this
    /// shard's pool -- the collaborator query the consensus engine's Phase
    /// 3 sync check runs against a transaction's source shard.
    pub fn has_transaction(&self, tx_id: &str) -> bool {
        self.pool.in_processing_or_confirmed(tx_id)
    }
}

impl crate::view::ShardView for Shard {
    fn id(&self) -> u32 {
        self.id
    }

    fn add_transaction(&self, tx: Transaction) -> ShardResult<()> {
        self.receive_cross_shard_transaction(tx)
    }

    fn add_block(&self, block: Block) -> ShardResult<()> {
        self.apply_synced_block(block)
    }

    fn is_healthy(&self) -> bool {
        Shard::is_healthy(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lscc_core::clock::FakeClock;
    use lscc_state::InMemoryStorage;

    fn shard() -> Shard {
        let storage = Arc::new(InMemoryStorage::new());
        let clock = Arc::new(FakeClock::new(1_000));
        let s = Shard::new(0, 0, 1, PoolConfig::default(), 1, 5, storage, clock);
        s.activate();
        s.add_validator(Validator::new("v1".into(), vec![1], 100, 0, 1_000));
        s
    }

    fn tx(sender: &str, nonce: u64) -> Transaction {
        Transaction::new(sender.into(), "recv".into(), 1, 1, nonce, vec![], 1_000, vec![])
    }

    #[test]
    fn commit_block_advances_height_and_confirms_transactions() {
        let shard = shard();
        shard.add_transaction(tx("a", 1)).unwrap();
        let selected = shard.select_block_candidate(10);
        let block = Block::new(0, 1_000, "genesis".into(), shard.id(), "v1".into(), 1000, 0, selected);
        shard.commit_block(block).unwrap();

        assert_eq!(shard.height(), 1);
        assert_eq!(shard.pool_stats().confirmed, 1);
    }

    #[test]
    fn commit_rejects_non_contiguous_block() {
        let shard = shard();
        let first = Block::new(0, 1_000, "genesis".into(), shard.id(), "v1".into(), 1000, 0, vec![]);
        shard.commit_block(first).unwrap();

        let bad = Block::new(5, 1_001, "wrong".into(), shard.id(), "v1".into(), 1000, 0, vec![]);
        assert!(shard.commit_block(bad).is_err());
    }

    #[test]
    fn healthy_requires_active_status_and_enough_validators() {
        let storage = Arc::new(InMemoryStorage::new());
        let clock = Arc::new(FakeClock::new(1_000));
        let shard = Shard::new(0, 0, 1, PoolConfig::default(), 3, 5, storage, clock);
        shard.activate();
        assert!(!shard.is_healthy(), "only zero validators registered so far");

        shard.add_validator(Validator::new("v1".into(), vec![1], 1, 0, 1_000));
        shard.add_validator(Validator::new("v2".into(), vec![2], 1, 0, 1_000));
        shard.add_validator(Validator::new("v3".into(), vec![3], 1, 0, 1_000));
        assert!(shard.is_healthy());
    }

    #[test]
    fn cross_shard_arrival_is_promoted_by_processor_tick() {
        let shard = shard();
        let t = tx("sender", 1);
        shard.receive_cross_shard_transaction(t).unwrap();
        assert_eq!(shard.pool_stats().cross_shard, 1);

        let promoted = shard.run_processor_tick();
        assert_eq!(promoted, 1);
        assert_eq!(shard.pool_stats().pending, 1);
    }

    #[test]
    fn begin_sync_returns_none_when_already_caught_up() {
        let shard = shard();
        assert!(shard.begin_sync(0).is_none());
    }
}
