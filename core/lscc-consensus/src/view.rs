//! Narrow collaborator seam onto shard state (design note, section 9,
//! the same "narrow view" pattern `lscc-shard::ShardView` uses to break
//! its cyclic reference with the shard manager). The engine never owns
//! the concrete shard type, and the same `Consensus` contract works
//! whether the caller wires in real shards or a test double.

use lscc_state::Block;

/// Everything phase 1-3 need to know about one shard, without depending
/// on `lscc-shard` and risking a cycle back into the crate that will
/// eventually own the engine instance.
pub trait ConsensusShardView: Send + Sync {
    fn id(&self) -> u32;

    /// The shard's current chain tip, if any, used to check block index
    /// contiguity and the previous-hash link (spec section 3 invariants).
    fn last_block(&self) -> Option<Block>;

    /// Whether the shard currently satisfies the health predicate (spec
    /// section 4.2): feeds phase 4's `network_healthy` term and the
    /// attestation sibling shards give in phase 1.
    fn is_healthy(&self) -> bool;

    /// `true` iff a transaction with this id is present in the shard's
    /// `processing` or `confirmed` pool maps (spec section 4.4, phase 3:
    /// "referenced source transactions are in `processing` or
    /// `confirmed` in the sibling shard").
    fn has_transaction(&self, tx_id: &str) -> bool;
}
