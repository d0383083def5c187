//! Adapts a concrete `lscc_shard::Shard` to the narrow
//! `lscc_consensus::ConsensusShardView` the engine consults each round,
//! without either crate depending on the other (design note, section 9).

use lscc_consensus::ConsensusShardView;
use lscc_shard::Shard;
use lscc_state::Block;
use std::sync::Arc;

pub struct ShardConsensusAdapter(pub Arc<Shard>);

impl ConsensusShardView for ShardConsensusAdapter {
    fn id(&self) -> u32 {
        self.0.id()
    }

    fn last_block(&self) -> Option<Block> {
        self.0.last_block()
    }

    fn is_healthy(&self) -> bool {
        self.0.is_healthy()
    }

    fn has_transaction(&self, tx_id: &str) -> bool {
        self.0.has_transaction(tx_id)
    }
}
