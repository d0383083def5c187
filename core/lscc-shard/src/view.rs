//! Narrow view onto a shard (design note, section 9): breaks the cyclic
//! reference between `Shard`, `ShardManager`, and the cross-shard
//! communicator. Consumers get exactly the four operations they need and
//! never own the concrete `Shard`.

use lscc_state::{Block, Transaction};

/// Everything a cross-shard communicator (or any other collaborator)
/// needs from a shard, without depending on `Shard` itself.
pub trait ShardView: Send + Sync {
    fn id(&self) -> u32;

    /// Admit a transaction arriving from elsewhere (cross-shard inbox
    /// delivery or direct submission).
    fn add_transaction(&self, tx: Transaction) -> Result<(), crate::errors::ShardError>;

    /// Append a block received from a peer shard during sync or gossip.
    fn add_block(&self, block: Block) -> Result<(), crate::errors::ShardError>;

    /// `true` iff the shard currently satisfies the health predicate
    /// (spec section 4.2).
    fn is_healthy(&self) -> bool;
}
