//! Per-shard transaction pool (spec sections 3 and 4.2).
//!
//! Four keyed maps -- pending, processing, confirmed, cross-shard -- plus a
//! fee-descending priority sequence over exactly the pending entries. The
//! type exposes only the small, total API the design notes (section 9)
//! call for: `add`, `select_for_block`, `confirm_in_block`, `evict`,
//! `stats`. Nothing outside this crate reaches into the sub-maps directly.

use crate::config::PoolConfig;
use crate::errors::{PoolError, PoolResult};
use crate::eviction::should_evict;
use crate::metrics::PoolMetrics;
use crate::priority::{PrioritizedTx, PrioritySequence};
use lscc_core::hash::{shard_of, Blake3Hash};
use lscc_state::{Block, Transaction, TxId, TxType};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

struct PoolInner {
    pending: HashMap<TxId, Transaction>,
    processing: HashMap<TxId, Transaction>,
    confirmed: HashMap<TxId, (Transaction, u64)>, // (tx, confirmed_at)
    cross_shard: HashMap<TxId, Transaction>,
    priority: PrioritySequence,
}

impl PoolInner {
    fn size(&self) -> usize {
        self.pending.len() + self.processing.len() + self.cross_shard.len()
    }
}

/// Snapshot of a pool's sub-map sizes (spec section 4.1: "pool utilization"
/// feeds into `Metrics()` and the rebalancer).
#[derive(Debug, Clone, Copy, Default)]
pub struct PoolStats {
    pub pending: usize,
    pub processing: usize,
    pub confirmed: usize,
    pub cross_shard: usize,
    pub capacity: usize,
}

impl PoolStats {
    pub fn size(&self) -> usize {
        self.pending + self.processing + self.cross_shard
    }

    pub fn utilization(&self) -> f64 {
        if self.capacity == 0 {
            0.0
        } else {
            self.size() as f64 / self.capacity as f64
        }
    }

    pub fn has_capacity(&self) -> bool {
        self.size() < self.capacity
    }
}

/// The per-shard transaction pool.
pub struct TransactionPool {
    shard_id: u32,
    n_shards: u32,
    config: PoolConfig,
    inner: RwLock<PoolInner>,
    metrics: Option<Arc<PoolMetrics>>,
}

impl TransactionPool {
    pub fn new(shard_id: u32, n_shards: u32, config: PoolConfig) -> Self {
        Self {
            shard_id,
            n_shards,
            config,
            inner: RwLock::new(PoolInner {
                pending: HashMap::new(),
                processing: HashMap::new(),
                confirmed: HashMap::new(),
                cross_shard: HashMap::new(),
                priority: PrioritySequence::new(),
            }),
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<PoolMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Admit `tx` into the pool (spec section 4.2, `Add(tx)`).
    ///
    /// 1. Reject if the pool is at capacity.
    /// 2. Reject non-cross-shard transactions whose sender doesn't hash to
    ///    this shard.
    /// 3. Cross-shard transactions go into the cross-shard map only; the
    ///    shard's processor loop promotes them to pending once they've
    ///    arrived at their home shard.
    /// 4. Everything else goes into pending and the priority sequence.
    pub fn add(&self, tx: Transaction) -> PoolResult<()> {
        if tx.sender.is_empty() || tx.receiver.is_empty() {
            return Err(PoolError::MalformedTx("empty sender or receiver".into()));
        }

        let mut inner = self.inner.write();

        if inner.pending.contains_key(&tx.id)
            || inner.processing.contains_key(&tx.id)
            || inner.cross_shard.contains_key(&tx.id)
            || inner.confirmed.contains_key(&tx.id)
        {
            return Err(PoolError::DuplicateTransaction(tx.id));
        }

        if inner.size() >= self.config.max_size {
            self.record("add", false);
            return Err(PoolError::PoolFull {
                capacity: self.config.max_size,
            });
        }

        if tx.tx_type != TxType::CrossShard {
            let sender_shard = shard_of(&Blake3Hash, tx.sender.as_bytes(), self.n_shards);
            if sender_shard != self.shard_id {
                self.record("add", false);
                return Err(PoolError::WrongShard);
            }
        }

        if tx.tx_type == TxType::CrossShard {
            inner.cross_shard.insert(tx.id.clone(), tx);
        } else {
            inner.priority.insert(PrioritizedTx::from(&tx));
            inner.pending.insert(tx.id.clone(), tx);
        }

        self.record("add", true);
        self.sync_metrics(&inner);
        Ok(())
    }

    /// Promote a cross-shard arrival into pending once it belongs to this
    /// shard (spec section 4.2: "it will be promoted to pending by the
    /// processor loop when `tx.shard_id == shard.id`").
    pub fn promote_cross_shard(&self, id: &str) -> PoolResult<()> {
        let mut inner = self.inner.write();
        let tx = inner
            .cross_shard
            .remove(id)
            .ok_or_else(|| PoolError::NotFound(id.to_string()))?;
        inner.priority.insert(PrioritizedTx::from(&tx));
        inner.pending.insert(tx.id.clone(), tx);
        self.sync_metrics(&inner);
        Ok(())
    }

    /// Promote every arrival currently sitting in the cross-shard map
    /// (spec section 4.2: the processor loop moves cross-shard arrivals
    /// into pending once they belong to this shard). Called by the
    /// owning shard's background worker rather than per-transaction,
    /// since by the time an arrival reaches this pool instance it has
    /// already been routed to its home shard.
    pub fn promote_all_cross_shard(&self) -> usize {
        let mut inner = self.inner.write();
        let ids: Vec<TxId> = inner.cross_shard.keys().cloned().collect();
        let mut promoted = 0;
        for id in ids {
            if let Some(tx) = inner.cross_shard.remove(&id) {
                inner.priority.insert(PrioritizedTx::from(&tx));
                inner.pending.insert(tx.id.clone(), tx);
                promoted += 1;
            }
        }
        if promoted > 0 {
            self.sync_metrics(&inner);
        }
        promoted
    }

    /// Select up to `max_k` transactions for block assembly (spec section
    /// 4.2, `SelectForBlock(max_k)`): walk the priority sequence, take
    /// entries still present in pending, atomically move them to
    /// processing, and rebuild the priority sequence by filtering out the
    /// selected ids.
    pub fn select_for_block(&self, max_k: usize) -> Vec<Transaction> {
        let mut inner = self.inner.write();
        let candidate_ids = inner.priority.peek_head(max_k.max(inner.priority.len()));

        let mut selected = Vec::with_capacity(max_k);
        let mut selected_ids = Vec::with_capacity(max_k);
        for id in candidate_ids {
            if selected.len() >= max_k {
                break;
            }
            if let Some(tx) = inner.pending.remove(&id) {
                inner.processing.insert(id.clone(), tx.clone());
                selected_ids.push(id);
                selected.push(tx);
            }
        }

        inner.priority.remove_all(&selected_ids);
        self.sync_metrics(&inner);
        selected
    }

    /// Confirm every transaction in `block` that is present in processing,
    /// moving it to confirmed (spec section 4.2, `ConfirmInBlock(block)`).
    /// Appending the block and persisting it is the shard's job, not the
    /// pool's.
    pub fn confirm_in_block(&self, block: &Block, confirmed_at: u64) {
        let mut inner = self.inner.write();
        for tx in &block.transactions {
            if let Some(moved) = inner.processing.remove(&tx.id) {
                inner.confirmed.insert(tx.id.clone(), (moved, confirmed_at));
            }
        }
        self.sync_metrics(&inner);
    }

    /// Evict confirmed entries older than the retention window (spec
    /// section 4.2: "Cleanup worker").
    pub fn evict_aged_confirmed(&self, now: u64) -> usize {
        let mut inner = self.inner.write();
        let expired: Vec<TxId> = inner
            .confirmed
            .iter()
            .filter(|(_, (_, confirmed_at))| should_evict(*confirmed_at, now, self.config.retention_secs))
            .map(|(id, _)| id.clone())
            .collect();
        for id in &expired {
            inner.confirmed.remove(id);
        }
        if !expired.is_empty() {
            self.record_eviction("retention_window", expired.len());
        }
        expired.len()
    }

    pub fn stats(&self) -> PoolStats {
        let inner = self.inner.read();
        PoolStats {
            pending: inner.pending.len(),
            processing: inner.processing.len(),
            confirmed: inner.confirmed.len(),
            cross_shard: inner.cross_shard.len(),
            capacity: self.config.max_size,
        }
    }

    /// `true` iff `id` has landed in this pool's `processing` or
    /// `confirmed` map -- the cross-shard prerequisite check a consensus
    /// round's sync phase runs against a sibling shard (spec section 4.4).
    pub fn in_processing_or_confirmed(&self, id: &str) -> bool {
        let inner = self.inner.read();
        inner.processing.contains_key(id) || inner.confirmed.contains_key(id)
    }

    /// Invariant check used by tests (spec section 8, invariant 3).
    #[cfg(test)]
    fn priority_matches_pending(&self) -> bool {
        let inner = self.inner.read();
        let mut priority_ids = inner.priority.ids();
        let mut pending_ids: Vec<TxId> = inner.pending.keys().cloned().collect();
        priority_ids.sort();
        pending_ids.sort();
        priority_ids == pending_ids
    }

    fn record(&self, op: &str, success: bool) {
        if let Some(m) = &self.metrics {
            m.record_operation(op, success);
        }
    }

    fn record_eviction(&self, reason: &str, count: usize) {
        if let Some(m) = &self.metrics {
            for _ in 0..count {
                m.record_eviction(reason);
            }
        }
    }

    fn sync_metrics(&self, inner: &PoolInner) {
        if let Some(m) = &self.metrics {
            m.update_size(
                inner.pending.len(),
                inner.processing.len(),
                inner.confirmed.len(),
                inner.cross_shard.len(),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tx(sender: &str, fee: u64, nonce: u64, ts: u64) -> Transaction {
        Transaction::new(sender.into(), "recv".into(), 10, fee, nonce, vec![1], ts, vec![])
    }

    #[test]
    fn pool_full_is_rejected() {
        let pool = TransactionPool::new(
            0,
            1,
            PoolConfig {
                max_size: 1,
                ..PoolConfig::default()
            },
        );
        pool.add(tx("alice", 1, 1, 1)).unwrap();
        let err = pool.add(tx("alice", 1, 2, 2)).unwrap_err();
        assert_eq!(err, PoolError::PoolFull { capacity: 1 });
    }

    #[test]
    fn wrong_shard_regular_tx_is_rejected() {
        // With n_shards=4, find a sender that does NOT hash to shard 0.
        let pool = TransactionPool::new(0, 4, PoolConfig::default());
        let mut sender = None;
        for candidate in ["a", "b", "c", "d", "e", "f"] {
            let s = shard_of(&Blake3Hash, candidate.as_bytes(), 4);
            if s != 0 {
                sender = Some(candidate);
                break;
            }
        }
        let sender = sender.expect("one of the candidates hashes off shard 0");
        let err = pool.add(tx(sender, 1, 1, 1)).unwrap_err();
        assert_eq!(err, PoolError::WrongShard);
    }

    #[test]
    fn select_for_block_moves_pending_to_processing_and_preserves_invariant() {
        let pool = TransactionPool::new(0, 1, PoolConfig::default());
        pool.add(tx("a", 10, 1, 1)).unwrap();
        pool.add(tx("a", 50, 2, 2)).unwrap();
        pool.add(tx("a", 30, 3, 3)).unwrap();
        assert!(pool.priority_matches_pending());

        let selected = pool.select_for_block(2);
        assert_eq!(selected.len(), 2);
        assert_eq!(selected[0].fee, 50);
        assert_eq!(selected[1].fee, 30);

        let stats = pool.stats();
        assert_eq!(stats.pending, 1);
        assert_eq!(stats.processing, 2);
        assert!(pool.priority_matches_pending());
    }

    #[test]
    fn confirm_in_block_moves_processing_to_confirmed() {
        let pool = TransactionPool::new(0, 1, PoolConfig::default());
        pool.add(tx("a", 10, 1, 1)).unwrap();
        let selected = pool.select_for_block(10);
        let block = Block::new(1, 100, "prev".into(), 0, "v1".into(), 1000, 0, selected);
        pool.confirm_in_block(&block, 100);

        let stats = pool.stats();
        assert_eq!(stats.processing, 0);
        assert_eq!(stats.confirmed, 1);
    }

    #[test]
    fn aged_confirmed_entries_are_evicted() {
        let pool = TransactionPool::new(
            0,
            1,
            PoolConfig {
                retention_secs: 10,
                ..PoolConfig::default()
            },
        );
        pool.add(tx("a", 10, 1, 1)).unwrap();
        let selected = pool.select_for_block(10);
        let block = Block::new(1, 100, "prev".into(), 0, "v1".into(), 1000, 0, selected);
        pool.confirm_in_block(&block, 100);

        assert_eq!(pool.evict_aged_confirmed(105), 0);
        assert_eq!(pool.evict_aged_confirmed(111), 1);
        assert_eq!(pool.stats().confirmed, 0);
    }

    #[test]
    fn cross_shard_admission_then_promotion() {
        let pool = TransactionPool::new(2, 4, PoolConfig::default());
        let mut t = tx("a", 10, 1, 1);
        t.tx_type = TxType::CrossShard;
        t.shard_id = Some(2);
        let id = t.id.clone();
        pool.add(t).unwrap();
        assert_eq!(pool.stats().cross_shard, 1);

        pool.promote_cross_shard(&id).unwrap();
        assert_eq!(pool.stats().cross_shard, 0);
        assert_eq!(pool.stats().pending, 1);
    }

    #[test]
    fn promote_all_cross_shard_moves_every_arrival() {
        let pool = TransactionPool::new(2, 4, PoolConfig::default());
        for i in 0..3u64 {
            let mut t = tx(&format!("sender_{i}"), 10, i, i);
            t.tx_type = TxType::CrossShard;
            t.shard_id = Some(2);
            pool.add(t).unwrap();
        }
        assert_eq!(pool.stats().cross_shard, 3);
        assert_eq!(pool.promote_all_cross_shard(), 3);
        assert_eq!(pool.stats().cross_shard, 0);
        assert_eq!(pool.stats().pending, 3);
    }
}
