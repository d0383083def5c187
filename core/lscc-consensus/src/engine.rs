//! The LSCC four-phase consensus engine (spec section 4.4).
//!
//! All phases for a candidate block run in one round: phase 1 evaluates
//! the layer containing the block's own shard; phase 2 folds in the
//! most recently observed approval for every other layer a spanning
//! channel covers (a layer that has never run phase 1 counts as
//! not-yet-approved, never guessed); phase 3 checks cross-shard
//! prerequisites against sibling shards; phase 4 aggregates into the
//! weighted score.

use crate::config::LsccConsensusConfig;
use crate::contract::Consensus;
use crate::errors::ConsensusError;
use crate::metrics::ConsensusMetrics;
use crate::phases::{
    channel_approves, commit_score, global_channel_approval, layer_approves, network_healthy, should_commit,
};
use crate::types::{ChannelResult, CommitDecision, ConsensusMetricsSnapshot, ConsensusState, LayerResult, PhaseOutcomes};
use crate::view::ConsensusShardView;
use lscc_state::{Block, TxType, Validator};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

struct EngineState {
    rounds: u64,
    rounds_failed: u64,
    rounds_committed: u64,
    last_committed_index: HashMap<u32, u64>,
    layer_results: HashMap<u32, bool>,
    channel_evaluations: u64,
    channel_approvals: u64,
    validators: Vec<Validator>,
}

impl Default for EngineState {
    fn default() -> Self {
        Self {
            rounds: 0,
            rounds_failed: 0,
            rounds_committed: 0,
            last_committed_index: HashMap::new(),
            layer_results: HashMap::new(),
            channel_evaluations: 0,
            channel_approvals: 0,
            validators: Vec::new(),
        }
    }
}

/// Implements the `Consensus` contract for the LSCC protocol. Holds no
/// state between rounds beyond counters and per-shard last-committed
/// index (spec section 4.4); shard views are registered once and
/// consulted fresh on every round.
pub struct LsccEngine {
    config: LsccConsensusConfig,
    shards: RwLock<HashMap<u32, Arc<dyn ConsensusShardView>>>,
    state: RwLock<EngineState>,
    metrics: Option<Arc<ConsensusMetrics>>,
}

impl LsccEngine {
    pub fn new(config: LsccConsensusConfig, metrics: Option<Arc<ConsensusMetrics>>) -> Self {
        Self {
            config,
            shards: RwLock::new(HashMap::new()),
            state: RwLock::new(EngineState::default()),
            metrics,
        }
    }

    pub fn config(&self) -> &LsccConsensusConfig {
        &self.config
    }

    /// Register (or replace) the collaborator view for one shard.
    pub fn register_shard(&self, shard: Arc<dyn ConsensusShardView>) {
        self.shards.write().insert(shard.id(), shard);
    }

    pub fn registered_shard_count(&self) -> usize {
        self.shards.read().len()
    }

    fn shards_in_layer(&self, layer_id: u32) -> Vec<Arc<dyn ConsensusShardView>> {
        self.shards
            .read()
            .values()
            .filter(|s| self.config.layer_of(s.id()) == layer_id)
            .cloned()
            .collect()
    }

    /// Structural validation of `block` against its own shard's chain tip
    /// (spec section 3 invariants): index contiguity, previous-hash link,
    /// Merkle root match.
    fn validates_structurally(&self, block: &Block, shard: &dyn ConsensusShardView) -> bool {
        if !block.merkle_root_matches() {
            return false;
        }
        match shard.last_block() {
            Some(tip) => block.follows(&tip),
            None => block.index == 0,
        }
    }

    /// Phase 1 vote for one shard on the candidate block: the block's
    /// own shard runs the full structural check; a sibling shard in the
    /// same layer doesn't own this block's disjoint transaction set, so
    /// it attests via its own health instead of re-validating data it
    /// doesn't hold (SPEC_FULL.md resolution -- see DESIGN.md).
    fn shard_vote(&self, block: &Block, shard: &dyn ConsensusShardView) -> bool {
        if shard.id() == block.shard_id {
            self.validates_structurally(block, shard)
        } else {
            shard.is_healthy()
        }
    }

    /// Phase 1: layer consensus over the block's own layer.
    fn phase1(&self, block: &Block) -> Result<LayerResult, ConsensusError> {
        let layer_id = self.config.layer_of(block.shard_id);
        let members = self.shards_in_layer(layer_id);
        if members.is_empty() || !members.iter().any(|s| s.id() == block.shard_id) {
            return Err(ConsensusError::CollaboratorTimeout(format!(
                "no registered view for proposing shard {}",
                block.shard_id
            )));
        }

        let mut votes = Vec::with_capacity(members.len());
        let mut supporting = Vec::new();
        for shard in &members {
            let vote = self.shard_vote(block, shard.as_ref());
            if vote {
                supporting.push(shard.id());
            }
            votes.push(vote);
        }

        let approved = layer_approves(&votes);
        self.state.write().layer_results.insert(layer_id, approved);

        Ok(LayerResult {
            layer_id,
            approved,
            supporting_shards: supporting,
        })
    }

    /// Phase 2: every channel spanning the block's layer collects the
    /// latest known per-layer results (not just this round's), since
    /// phase 1 for this round only ran the one layer with a live
    /// candidate.
    fn phase2(&self, layer_id: u32) -> (bool, Vec<ChannelResult>) {
        let channel_id = self.config.channel_of(layer_id);
        let layer_results = self.state.read().layer_results.clone();

        let mut results = Vec::new();
        for channel in 0..self.config.channel_count {
            let layers_in_channel: Vec<bool> = (0..self.config.layer_depth)
                .filter(|l| self.config.channel_of(*l) == channel)
                .map(|l| *layer_results.get(&l).unwrap_or(&false))
                .collect();
            let approved = channel_approves(&layers_in_channel);
            results.push(ChannelResult {
                channel_id: channel,
                approved,
            });
        }

        let global = global_channel_approval(&results.iter().map(|r| r.approved).collect::<Vec<_>>());
        let this_channel_approved = results.iter().any(|r| r.channel_id == channel_id && r.approved);

        if let Some(m) = &self.metrics {
            m.record_channel_evaluation(this_channel_approved);
        }
        let mut state = self.state.write();
        state.channel_evaluations += 1;
        if global {
            state.channel_approvals += 1;
        }

        (global, results)
    }

    /// Phase 3: every cross-shard transaction in the block must have its
    /// source-shard prerequisite present in `processing` or `confirmed`
    /// on the sibling shard; any missing prerequisite fails the whole
    /// phase (partial sync is never treated as success, per spec section
    /// 9's open-question resolution).
    fn phase3(&self, block: &Block) -> bool {
        let shards = self.shards.read();
        for tx in &block.transactions {
            if tx.tx_type != TxType::CrossShard {
                continue;
            }
            let source_shard = lscc_core::hash::shard_of(&lscc_core::hash::Blake3Hash, tx.sender.as_bytes(), shards.len().max(1) as u32);
            match shards.get(&source_shard) {
                Some(sibling) if sibling.has_transaction(&tx.id) => continue,
                _ => return false,
            }
        }
        true
    }

    fn phase4(&self, layer_approved: bool, channel_approval: bool, sync_success: bool) -> CommitDecision {
        let shards = self.shards.read();
        let total = shards.len();
        let healthy = shards.values().filter(|s| s.is_healthy()).count();
        let health_ratio = if total == 0 { 0.0 } else { healthy as f64 / total as f64 };
        if let Some(m) = &self.metrics {
            m.set_shard_balance(health_ratio);
        }
        let healthy_network = network_healthy(healthy, total, self.config.health_ratio_min);

        let outcomes = PhaseOutcomes {
            all_layers_approved: layer_approved,
            channel_approval,
            sync_success,
            network_healthy: healthy_network,
        };
        let score = commit_score(outcomes);
        CommitDecision {
            committed: should_commit(score, self.config.commit_threshold),
            score,
            outcomes,
            diagnostic: None,
        }
    }

    /// Run the full four-phase protocol for `block` and return the
    /// commit decision (spec section 4.4).
    pub fn evaluate(&self, block: &Block) -> Result<CommitDecision, ConsensusError> {
        let layer_result = self.phase1(block)?;
        let (channel_approval, _channels) = self.phase2(layer_result.layer_id);
        let sync_success = self.phase3(block);
        let decision = self.phase4(layer_result.approved, channel_approval, sync_success);

        let mut state = self.state.write();
        state.rounds += 1;
        if decision.committed {
            state.rounds_committed += 1;
            let entry = state.last_committed_index.entry(block.shard_id).or_insert(0);
            if block.index >= *entry {
                *entry = block.index;
            }
        }
        drop(state);

        if let Some(m) = &self.metrics {
            m.record_round(if decision.committed { "committed" } else { "no_commit" });
        }
        info!(
            shard_id = block.shard_id,
            index = block.index,
            score = decision.score,
            committed = decision.committed,
            "consensus round evaluated"
        );

        Ok(decision)
    }
}

impl Consensus for LsccEngine {
    fn process_block(&self, block: &Block, _validators: &[Validator]) -> Result<bool, ConsensusError> {
        match self.evaluate(block) {
            Ok(decision) => Ok(decision.committed),
            Err(err) => {
                let mut state = self.state.write();
                state.rounds += 1;
                state.rounds_failed += 1;
                drop(state);
                if let Some(m) = &self.metrics {
                    m.record_round("phase_failed");
                }
                warn!(shard_id = block.shard_id, error = %err, "consensus round failed");
                Err(err)
            }
        }
    }

    fn validate_block(&self, block: &Block, _validators: &[Validator]) -> Result<(), ConsensusError> {
        let shards = self.shards.read();
        let shard = shards
            .get(&block.shard_id)
            .ok_or_else(|| ConsensusError::CollaboratorTimeout(format!("no view for shard {}", block.shard_id)))?;
        if self.validates_structurally(block, shard.as_ref()) {
            Ok(())
        } else {
            Err(ConsensusError::PhaseFailed("block failed structural validation".into()))
        }
    }

    /// Deterministic round-robin by stake (descending), address as the
    /// tie-break, indexed by round -- the same ordering the rebalancer
    /// uses for validator assignment (spec section 4.1), applied here to
    /// proposer selection instead.
    fn select_validator(&self, validators: &[Validator], round: u64) -> Result<Validator, ConsensusError> {
        if validators.is_empty() {
            return Err(ConsensusError::NoValidators);
        }
        let mut ranked: Vec<&Validator> = validators.iter().filter(|v| v.is_active()).collect();
        if ranked.is_empty() {
            return Err(ConsensusError::NoValidators);
        }
        ranked.sort_by(|a, b| b.stake.cmp(&a.stake).then_with(|| a.address.cmp(&b.address)));
        let idx = (round as usize) % ranked.len();
        Ok(ranked[idx].clone())
    }

    fn consensus_state(&self) -> ConsensusState {
        let state = self.state.read();
        ConsensusState {
            rounds: state.rounds,
            rounds_failed: state.rounds_failed,
            last_committed_index: state.last_committed_index.clone(),
        }
    }

    fn update_validators(&self, validators: Vec<Validator>) {
        self.state.write().validators = validators;
    }

    fn name(&self) -> &'static str {
        "lscc"
    }

    fn metrics(&self) -> ConsensusMetricsSnapshot {
        let state = self.state.read();
        let channel_efficiency = if state.channel_evaluations == 0 {
            0.0
        } else {
            state.channel_approvals as f64 / state.channel_evaluations as f64
        };
        let shards = self.shards.read();
        let total = shards.len();
        let healthy = shards.values().filter(|s| s.is_healthy()).count();
        let shard_balance = if total == 0 { 0.0 } else { healthy as f64 / total as f64 };

        ConsensusMetricsSnapshot {
            rounds: state.rounds,
            rounds_failed: state.rounds_failed,
            rounds_committed: state.rounds_committed,
            channel_efficiency,
            shard_balance,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lscc_state::{Block, Transaction, Validator};
    use std::sync::Mutex;

    struct FakeShard {
        id: u32,
        last_block: Mutex<Option<Block>>,
        healthy: bool,
        has_tx: Vec<String>,
    }

    impl ConsensusShardView for FakeShard {
        fn id(&self) -> u32 {
            self.id
        }
        fn last_block(&self) -> Option<Block> {
            self.last_block.lock().unwrap().clone()
        }
        fn is_healthy(&self) -> bool {
            self.healthy
        }
        fn has_transaction(&self, tx_id: &str) -> bool {
            self.has_tx.iter().any(|id| id == tx_id)
        }
    }

    fn fake(id: u32, healthy: bool) -> Arc<FakeShard> {
        Arc::new(FakeShard {
            id,
            last_block: Mutex::new(None),
            healthy,
            has_tx: Vec::new(),
        })
    }

    fn genesis_block(shard_id: u32) -> Block {
        Block::new(0, 1_000, "genesis".into(), shard_id, "v1".into(), 1_000_000, 0, vec![])
    }

    #[test]
    fn single_shard_layer_commits_on_healthy_network() {
        let engine = LsccEngine::new(
            LsccConsensusConfig {
                layer_depth: 1,
                channel_count: 1,
                ..LsccConsensusConfig::default()
            },
            None,
        );
        engine.register_shard(fake(0, true));

        let block = genesis_block(0);
        let decision = engine.evaluate(&block).unwrap();
        assert!(decision.committed, "{decision:?}");
        assert_eq!(engine.consensus_state().last_committed_index.get(&0), Some(&0));
    }

    #[test]
    fn missing_proposer_shard_is_a_collaborator_error() {
        let engine = LsccEngine::new(LsccConsensusConfig::default(), None);
        let block = genesis_block(0);
        let err = engine.evaluate(&block).unwrap_err();
        assert!(matches!(err, ConsensusError::CollaboratorTimeout(_)));
        assert_eq!(engine.consensus_state().rounds, 0);
    }

    #[test]
    fn process_block_records_failed_round_on_collaborator_error() {
        let engine = LsccEngine::new(LsccConsensusConfig::default(), None);
        let block = genesis_block(0);
        let result = engine.process_block(&block, &[]);
        assert!(result.is_err());
        assert_eq!(engine.consensus_state().rounds_failed, 1);
    }

    #[test]
    fn unhealthy_sibling_shard_can_sink_layer_approval() {
        let engine = LsccEngine::new(
            LsccConsensusConfig {
                layer_depth: 1,
                channel_count: 1,
                ..LsccConsensusConfig::default()
            },
            None,
        );
        // Three shards in the same layer: proposer is structurally
        // valid, but two unhealthy siblings vote no -- fails the 2/3
        // threshold (need 2 of 3).
        engine.register_shard(fake(0, true));
        engine.register_shard(fake(1, false));
        engine.register_shard(fake(2, false));

        let block = genesis_block(0);
        let decision = engine.evaluate(&block).unwrap();
        assert!(!decision.outcomes.all_layers_approved);
    }

    #[test]
    fn select_validator_is_deterministic_round_robin_by_stake() {
        let engine = LsccEngine::new(LsccConsensusConfig::default(), None);
        let validators = vec![
            Validator::new("a".into(), vec![], 10, 0, 0),
            Validator::new("b".into(), vec![], 20, 0, 0),
        ];
        let first = engine.select_validator(&validators, 0).unwrap();
        assert_eq!(first.address, "b");
        let second = engine.select_validator(&validators, 1).unwrap();
        assert_eq!(second.address, "a");
    }

    #[test]
    fn phase3_fails_when_cross_shard_prerequisite_is_missing() {
        let engine = LsccEngine::new(
            LsccConsensusConfig {
                layer_depth: 1,
                channel_count: 1,
                ..LsccConsensusConfig::default()
            },
            None,
        );
        engine.register_shard(fake(0, true));
        engine.register_shard(Arc::new(FakeShard {
            id: 1,
            last_block: Mutex::new(None),
            healthy: true,
            has_tx: vec![],
        }));

        let mut cross_tx = Transaction::new("alice".into(), "bob".into(), 10, 1, 1, vec![1], 1_000, vec![]);
        cross_tx.tx_type = TxType::CrossShard;
        let block = Block::new(0, 1_000, "genesis".into(), 0, "v1".into(), 1_000_000, 0, vec![cross_tx]);

        let sync_success = engine.phase3(&block);
        assert!(!sync_success);
    }
}
