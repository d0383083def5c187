//! Node configuration (spec section 6, configuration table).
//!
//! Loaded from an optional TOML file via `serde`; CLI flag parsing is out
//! of scope (spec section 1 Non-goals), so there is no `clap` surface
//! here, only `LsccConfig::load`.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

/// Mirrors spec section 6's configuration table exactly, one field per
/// row, with the table's own defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LsccConfig {
    pub num_shards: u32,
    pub layer_depth: u32,
    pub channel_count: u32,
    pub block_time_secs: u64,
    pub max_transactions_per_block: usize,
    pub pool_max_size: usize,
    pub min_validators: usize,
    pub max_validators: usize,
    pub rebalance_threshold: f64,
    pub rebalance_interval_secs: u64,
    pub cross_shard_queue_size: usize,
    pub relay_buffer_size: usize,
    pub max_retries: u32,
    pub commit_threshold: f64,
    pub health_ratio_min: f64,
}

impl Default for LsccConfig {
    fn default() -> Self {
        Self {
            num_shards: 4,
            layer_depth: 3,
            channel_count: 2,
            block_time_secs: 1,
            max_transactions_per_block: 1000,
            pool_max_size: 1000,
            min_validators: 3,
            max_validators: 21,
            rebalance_threshold: 0.7,
            rebalance_interval_secs: 600,
            cross_shard_queue_size: 100,
            relay_buffer_size: 1000,
            max_retries: 3,
            commit_threshold: 0.7,
            health_ratio_min: 0.5,
        }
    }
}

impl LsccConfig {
    /// Load from `path` if given, falling back to the table's defaults
    /// when no path is supplied. A present-but-unreadable or
    /// present-but-malformed file is an error; an absent path is not.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn shard_manager_config(&self) -> lscc_shard::ShardManagerConfig {
        lscc_shard::ShardManagerConfig {
            num_shards: self.num_shards,
            layer_depth: self.layer_depth,
            block_time_secs: self.block_time_secs,
            max_transactions_per_block: self.max_transactions_per_block,
            pool_max_size: self.pool_max_size,
            min_validators: self.min_validators,
            max_validators: self.max_validators,
            rebalance_threshold: self.rebalance_threshold,
            rebalance_interval_secs: self.rebalance_interval_secs,
            cross_shard_queue_size: self.cross_shard_queue_size,
            max_retries: self.max_retries,
            health_ratio_min: self.health_ratio_min,
        }
    }

    pub fn communicator_config(&self) -> lscc_crosschannel::CommunicatorConfig {
        lscc_crosschannel::CommunicatorConfig {
            inbox_capacity: self.cross_shard_queue_size,
            relay_buffer_size: self.relay_buffer_size,
            max_retries: self.max_retries,
        }
    }

    pub fn consensus_config(&self) -> lscc_consensus::LsccConsensusConfig {
        lscc_consensus::LsccConsensusConfig {
            layer_depth: self.layer_depth,
            channel_count: self.channel_count,
            commit_threshold: self.commit_threshold,
            health_ratio_min: self.health_ratio_min,
        }
    }
}
