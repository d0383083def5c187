//! Shard manager: owns every shard, routes submissions, runs the
//! rebalancer and consensus coordinator (spec section 4.1).

use crate::config::ShardManagerConfig;
use crate::coordinator::{global_status, GlobalStatus};
use crate::errors::{ShardError, ShardResult};
use crate::metrics::ShardManagerMetrics;
use crate::rebalance::{load_balance_score, rebalance, should_rebalance, ShardLoad};
use crate::router::{CrossShardEnvelope, CrossShardRouter, NoopRouter, RouteOutcome};
use crate::shard::Shard;
use lscc_core::clock::Clock;
use lscc_core::hash::{shard_of, Blake3Hash};
use lscc_core::storage::Storage;
use lscc_state::{Transaction, TxType, Validator};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

/// Aggregated metrics exposed by `Metrics()` (spec section 4.1).
#[derive(Debug, Clone, Default)]
pub struct ShardManagerStats {
    pub total_shards: usize,
    pub healthy_shards: usize,
    pub total_validators: usize,
    pub total_pending: usize,
    pub load_balance_score: f64,
    pub cross_shard_ratio: f64,
}

/// Outcome of `Submit` (spec section 4.1, step 2/3).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Accepted { shard_id: u32 },
    QueuedForRetry,
}

pub struct ShardManager {
    config: ShardManagerConfig,
    shards: HashMap<u32, Arc<Shard>>,
    router: Arc<dyn CrossShardRouter>,
    metrics: Option<Arc<ShardManagerMetrics>>,
}

/// Build the shard set a `ShardManagerConfig` describes, without wiring
/// a manager around it. Exposed so a composition root can hand the same
/// `Arc<Shard>` instances to a cross-shard communicator (as `ShardView`)
/// before the router those shards need even exists (design note, section
/// 9 -- the manager and the communicator close the cycle on each other).
pub fn build_shards(
    config: &ShardManagerConfig,
    storage: Arc<dyn Storage>,
    clock: Arc<dyn Clock>,
) -> HashMap<u32, Arc<Shard>> {
    let mut shards = HashMap::with_capacity(config.num_shards as usize);
    for id in 0..config.num_shards {
        let layer = id % config.layer_depth;
        let shard = Arc::new(Shard::new(
            id,
            layer,
            config.num_shards,
            config.pool_config(),
            config.min_validators,
            config.staleness_limit_secs(),
            storage.clone(),
            clock.clone(),
        ));
        shard.activate();
        shards.insert(id, shard);
    }
    shards
}

impl ShardManager {
    /// `Initialize()`: create `num_shards` shards, assign each shard's
    /// layer, spawn no workers yet -- callers that want background
    /// workers call `spawn_workers`.
    pub fn initialize(
        config: ShardManagerConfig,
        storage: Arc<dyn Storage>,
        clock: Arc<dyn Clock>,
        router: Arc<dyn CrossShardRouter>,
        metrics: Option<Arc<ShardManagerMetrics>>,
    ) -> Self {
        let shards = build_shards(&config, storage, clock);
        info!(num_shards = config.num_shards, layer_depth = config.layer_depth, "shard manager initialized");
        Self { config, shards, router, metrics }
    }

    /// Wire a manager around shards built separately, e.g. by
    /// `build_shards`, so the same instances can also be registered with
    /// a real cross-shard communicator before it is handed back here as
    /// the router.
    pub fn from_shards(
        config: ShardManagerConfig,
        shards: HashMap<u32, Arc<Shard>>,
        router: Arc<dyn CrossShardRouter>,
        metrics: Option<Arc<ShardManagerMetrics>>,
    ) -> Self {
        Self { config, shards, router, metrics }
    }

    pub fn with_noop_router(
        config: ShardManagerConfig,
        storage: Arc<dyn Storage>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self::initialize(config, storage, clock, Arc::new(NoopRouter), None)
    }

    pub fn config(&self) -> &ShardManagerConfig {
        &self.config
    }

    pub fn get_shard(&self, id: u32) -> Option<Arc<Shard>> {
        self.shards.get(&id).cloned()
    }

    pub fn list_shards(&self) -> Vec<Arc<Shard>> {
        let mut list: Vec<Arc<Shard>> = self.shards.values().cloned().collect();
        list.sort_by_key(|s| s.id());
        list
    }

    fn route_of(&self, address: &str) -> u32 {
        shard_of(&Blake3Hash, address.as_bytes(), self.config.num_shards)
    }

    /// `Submit(tx) -> ok | err` (spec section 4.1).
    pub fn submit(&self, mut tx: Transaction) -> ShardResult<SubmitOutcome> {
        let from_shard = self.route_of(&tx.sender);
        let to_shard = self.route_of(&tx.receiver);
        tx.shard_id = Some(from_shard);

        if from_shard == to_shard {
            let shard = self.shards.get(&from_shard).ok_or(ShardError::UnknownShard(from_shard))?;
            shard.add_transaction(tx)?;
            self.record_submission("accepted");
            return Ok(SubmitOutcome::Accepted { shard_id: from_shard });
        }

        tx.tx_type = TxType::CrossShard;
        let message_id = format!("cross_{}", tx.id);
        let envelope = CrossShardEnvelope {
            message_id,
            transaction: tx,
            from_shard,
            to_shard,
        };

        match self.router.route(envelope) {
            RouteOutcome::Delivered => {
                self.record_submission("accepted");
                Ok(SubmitOutcome::Accepted { shard_id: from_shard })
            }
            RouteOutcome::QueuedForRetry => {
                self.record_submission("queued_for_retry");
                Ok(SubmitOutcome::QueuedForRetry)
            }
        }
    }

    /// `AddValidator(v, shardId)` (spec section 4.1).
    pub fn add_validator(&self, validator: Validator, shard_id: u32) -> ShardResult<()> {
        let shard = self.shards.get(&shard_id).ok_or(ShardError::UnknownShard(shard_id))?;
        shard.add_validator(validator);
        Ok(())
    }

    fn loads(&self) -> Vec<ShardLoad> {
        self.list_shards()
            .iter()
            .map(|s| {
                let stats = s.pool_stats();
                ShardLoad {
                    shard_id: s.id(),
                    tps: 0.0,
                    pool_utilization: stats.utilization(),
                    validator_count: s.validator_count(),
                    is_healthy: s.is_healthy(),
                }
            })
            .collect()
    }

    /// `Metrics()` (spec section 4.1).
    pub fn metrics(&self) -> ShardManagerStats {
        let loads = self.loads();
        let score = load_balance_score(&loads);
        let healthy = loads.iter().filter(|l| l.is_healthy).count();
        let total_validators: usize = self.list_shards().iter().map(|s| s.validator_count()).sum();
        let total_pending: usize = self.list_shards().iter().map(|s| s.pool_stats().pending).sum();
        let total_cross_shard: usize = self.list_shards().iter().map(|s| s.pool_stats().cross_shard).sum();
        let total_tx = total_pending + total_cross_shard;
        let cross_shard_ratio = if total_tx == 0 {
            0.0
        } else {
            total_cross_shard as f64 / total_tx as f64
        };

        if let Some(m) = &self.metrics {
            m.set_load_balance_score(score);
            m.set_healthy_shards(healthy);
            for s in self.list_shards() {
                m.set_shard_height(s.id(), s.height());
            }
        }

        ShardManagerStats {
            total_shards: self.shards.len(),
            healthy_shards: healthy,
            total_validators,
            total_pending,
            load_balance_score: score,
            cross_shard_ratio,
        }
    }

    pub fn global_status(&self) -> GlobalStatus {
        global_status(&self.list_shards())
    }

    /// One rebalancer tick (spec section 4.1, "Rebalancer algorithm").
    /// Returns `None` if no trigger condition was met.
    pub fn run_rebalance_tick(&self) -> Option<crate::rebalance::RebalanceResult> {
        let loads = self.loads();
        if !should_rebalance(
            &loads,
            self.config.rebalance_threshold,
            self.config.rebalance_threshold,
            self.config.min_validators,
            self.config.max_validators,
        ) {
            return None;
        }

        let all_validators: Vec<Validator> =
            self.list_shards().iter().flat_map(|s| s.validators()).collect();
        let result = rebalance(all_validators.clone(), self.config.num_shards);

        let mut by_shard: HashMap<u32, Vec<Validator>> = HashMap::new();
        for mut v in all_validators {
            if let Some((_, shard_id)) = result.reassignments.iter().find(|(addr, _)| *addr == v.address) {
                v.shard_id = *shard_id;
                by_shard.entry(*shard_id).or_default().push(v);
            }
        }
        // Every shard must be written, including ones `rebalance` assigns
        // zero validators to -- otherwise an untouched shard keeps its
        // stale roster while the same validators are also handed to
        // their new shard, duplicating them (breaks the "Rebalance
        // preservation" law and the one-shard-per-validator invariant).
        for shard_id in 0..self.config.num_shards {
            if let Some(shard) = self.shards.get(&shard_id) {
                shard.set_validators(by_shard.remove(&shard_id).unwrap_or_default());
            }
        }

        if let Some(m) = &self.metrics {
            m.record_rebalance("triggered");
        }
        warn!(total_validators = result.total_validators, "rebalance event triggered");
        Some(result)
    }

    fn record_submission(&self, outcome: &str) {
        if let Some(m) = &self.metrics {
            m.record_submission(outcome);
        }
    }
}
