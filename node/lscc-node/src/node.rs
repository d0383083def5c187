//! Composition root: wires `lscc-core`/`lscc-state`/`lscc-pool`/
//! `lscc-shard`/`lscc-crosschannel`/`lscc-consensus` into one running
//! node (spec section 2).
//!
//! Construction order resolves the cycle the design notes (section 9)
//! call out: shards are built first as bare `Arc<Shard>` values, handed
//! to the communicator as `ShardView` trait objects, and only then is the
//! shard manager assembled around the same shard instances with the
//! communicator installed as its `CrossShardRouter`. Every shard is also
//! registered with the consensus engine through `ShardConsensusAdapter`.

use crate::config::LsccConfig;
use crate::shard_adapter::ShardConsensusAdapter;
use lscc_consensus::{Consensus, LsccEngine};
use lscc_core::clock::{Clock, SystemClock};
use lscc_core::metrics::ComponentMetrics;
use lscc_core::storage::Storage;
use lscc_crosschannel::CrossShardCommunicator;
use lscc_shard::{build_shards, ShardManager, ShardView};
use lscc_state::InMemoryStorage;
use prometheus::Registry;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

pub struct Node {
    pub config: LsccConfig,
    pub storage: Arc<dyn Storage>,
    pub clock: Arc<dyn Clock>,
    pub registry: Arc<Registry>,
    pub shard_manager: Arc<ShardManager>,
    pub communicator: Arc<CrossShardCommunicator>,
    pub engine: Arc<LsccEngine>,
}

impl Node {
    /// Build every collaborator from `config`, defaulting to the
    /// in-memory `Storage` adapter and the real wall clock -- the
    /// adapters the outer node assembly would substitute for a durable
    /// backend or a deterministic clock stay injectable for tests.
    pub fn new(config: LsccConfig) -> Self {
        Self::with_collaborators(config, Arc::new(InMemoryStorage::new()), Arc::new(SystemClock))
    }

    pub fn with_collaborators(config: LsccConfig, storage: Arc<dyn Storage>, clock: Arc<dyn Clock>) -> Self {
        let registry = Arc::new(Registry::new());

        let shard_cfg = config.shard_manager_config();
        let shards = build_shards(&shard_cfg, storage.clone(), clock.clone());

        let shard_views: HashMap<u32, Arc<dyn ShardView>> = shards
            .iter()
            .map(|(id, shard)| (*id, shard.clone() as Arc<dyn ShardView>))
            .collect();

        let communicator_metrics = Arc::new(lscc_crosschannel::CommunicatorMetrics::new(
            &ComponentMetrics::new(registry.clone(), "communicator"),
        ));
        let communicator = Arc::new(CrossShardCommunicator::new(
            shard_views,
            config.communicator_config(),
            clock.clone(),
            Some(communicator_metrics),
        ));

        let shard_manager_metrics = Arc::new(lscc_shard::ShardManagerMetrics::new(&ComponentMetrics::new(
            registry.clone(),
            "shard_manager",
        )));
        let shard_manager = Arc::new(ShardManager::from_shards(
            shard_cfg,
            shards.clone(),
            communicator.clone(),
            Some(shard_manager_metrics),
        ));

        let consensus_metrics = Arc::new(lscc_consensus::ConsensusMetrics::new(&ComponentMetrics::new(
            registry.clone(),
            "consensus",
        )));
        let engine = Arc::new(LsccEngine::new(config.consensus_config(), Some(consensus_metrics)));
        for (_, shard) in shards.iter() {
            engine.register_shard(Arc::new(ShardConsensusAdapter(shard.clone())));
        }

        info!(num_shards = config.num_shards, "node assembled");

        Self {
            config,
            storage,
            clock,
            registry,
            shard_manager,
            communicator,
            engine,
        }
    }

    /// Propose and evaluate the next block for `shard_id` against the
    /// pool's current candidate transactions, committing it on success
    /// (spec section 2's "submitter -> ... -> LSCC engine -> on commit"
    /// data flow).
    pub fn run_block_round(&self, shard_id: u32, validator_id: &str) -> anyhow::Result<bool> {
        let shard = self
            .shard_manager
            .get_shard(shard_id)
            .ok_or_else(|| anyhow::anyhow!("unknown shard {shard_id}"))?;

        let selected = shard.select_block_candidate(self.config.max_transactions_per_block);
        let now = self.clock.now_secs();
        let previous_hash = shard.last_block_hash().unwrap_or_else(|| "genesis".to_string());
        let index = shard.height();

        let block = lscc_state::Block::new(
            index,
            now,
            previous_hash,
            shard_id,
            validator_id.to_string(),
            1_000_000,
            0,
            selected,
        );

        let validators = shard.validators();
        let committed = self.engine.process_block(&block, &validators)?;
        if committed {
            shard.commit_block(block)?;
        }
        Ok(committed)
    }
}
