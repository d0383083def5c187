//! LSCC engine configuration (spec section 4.4, section 6 configuration
//! table).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LsccConsensusConfig {
    /// Number of layers shards are partitioned into by `id mod layer_depth`.
    pub layer_depth: u32,
    /// Number of cross-layer channels overlaying the layers.
    pub channel_count: u32,
    /// Phase 4 weighted score cutoff for commit.
    pub commit_threshold: f64,
    /// Fraction of active, healthy shards required for `network_healthy`.
    pub health_ratio_min: f64,
}

impl Default for LsccConsensusConfig {
    fn default() -> Self {
        Self {
            layer_depth: 3,
            channel_count: 2,
            commit_threshold: 0.7,
            health_ratio_min: 0.5,
        }
    }
}

impl LsccConsensusConfig {
    /// The layer a shard belongs to, matching `lscc-shard`'s own
    /// `id mod layer_depth` assignment (spec section 3).
    pub fn layer_of(&self, shard_id: u32) -> u32 {
        shard_id % self.layer_depth.max(1)
    }

    /// Which channel a layer is overlaid by. Channels are assigned
    /// round-robin over layers (`layer_id mod channel_count`): the
    /// simplest partition that gives every configured channel a
    /// non-empty, disjoint set of layers to span, since spec.md leaves
    /// the exact channel/layer assignment unspecified beyond "a subset of
    /// layers" (SPEC_FULL.md resolution, recorded in DESIGN.md).
    pub fn channel_of(&self, layer_id: u32) -> u32 {
        layer_id % self.channel_count.max(1)
    }
}
