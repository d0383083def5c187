//! Pool configuration (spec section 6 configuration table:
//! `pool_max_size`).

use crate::eviction::DEFAULT_RETENTION_SECS;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolConfig {
    /// Maximum combined size of pending + processing + cross_shard
    /// (confirmed is counted separately and aged out).
    pub max_size: usize,

    /// Retention window for confirmed entries, in seconds.
    pub retention_secs: u64,

    /// Most recent cross-shard inbox messages kept by cleanup.
    pub cross_shard_inbox_cap: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_size: 1000,
            retention_secs: DEFAULT_RETENTION_SECS,
            cross_shard_inbox_cap: 500,
        }
    }
}
