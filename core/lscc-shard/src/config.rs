//! Shard manager configuration (spec section 6 configuration table).

use lscc_pool::PoolConfig;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShardManagerConfig {
    pub num_shards: u32,
    pub layer_depth: u32,
    pub block_time_secs: u64,
    pub max_transactions_per_block: usize,
    pub pool_max_size: usize,
    pub min_validators: usize,
    pub max_validators: usize,
    pub rebalance_threshold: f64,
    pub rebalance_interval_secs: u64,
    pub cross_shard_queue_size: usize,
    pub max_retries: u32,
    pub health_ratio_min: f64,
}

impl Default for ShardManagerConfig {
    fn default() -> Self {
        Self {
            num_shards: 4,
            layer_depth: 3,
            block_time_secs: 1,
            max_transactions_per_block: 1000,
            pool_max_size: 1000,
            min_validators: 3,
            max_validators: 21,
            rebalance_threshold: 0.7,
            rebalance_interval_secs: 600,
            cross_shard_queue_size: 100,
            max_retries: 3,
            health_ratio_min: 0.5,
        }
    }
}

impl ShardManagerConfig {
    pub fn pool_config(&self) -> PoolConfig {
        PoolConfig {
            max_size: self.pool_max_size,
            ..PoolConfig::default()
        }
    }

    /// A shard is stale if no block has landed within `5 * block_time`
    /// (spec section 4.2, "Health").
    pub fn staleness_limit_secs(&self) -> u64 {
        5 * self.block_time_secs
    }
}
