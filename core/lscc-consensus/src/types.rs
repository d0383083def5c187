//! Result types threaded through the four phases (spec section 4.4).

use std::collections::HashMap;

/// Outcome of phase 1 for a single layer.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerResult {
    pub layer_id: u32,
    pub approved: bool,
    pub supporting_shards: Vec<u32>,
}

/// Outcome of phase 2 for a single channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelResult {
    pub channel_id: u32,
    pub approved: bool,
}

/// The four phase booleans phase 4 scores (spec section 4.4).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhaseOutcomes {
    pub all_layers_approved: bool,
    pub channel_approval: bool,
    pub sync_success: bool,
    pub network_healthy: bool,
}

/// Phase 4's weighted-commitment result.
#[derive(Debug, Clone, PartialEq)]
pub struct CommitDecision {
    pub committed: bool,
    pub score: f64,
    pub outcomes: PhaseOutcomes,
    pub diagnostic: Option<String>,
}

/// `GetConsensusState()` (spec section 6): counters plus the
/// last-committed index per shard, the only state the engine carries
/// between rounds (spec section 4.4: "stateless between rounds except
/// for counters and the last-committed index per shard").
#[derive(Debug, Clone, Default)]
pub struct ConsensusState {
    pub rounds: u64,
    pub rounds_failed: u64,
    pub last_committed_index: HashMap<u32, u64>,
}

/// `Metrics()` snapshot (spec section 4.4: "rounds, phase timings,
/// channel efficiency, shard balance").
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsensusMetricsSnapshot {
    pub rounds: u64,
    pub rounds_failed: u64,
    pub rounds_committed: u64,
    /// Fraction of phase-2 channel evaluations that approved, over the
    /// engine's lifetime.
    pub channel_efficiency: f64,
    /// Fraction of registered shards currently healthy.
    pub shard_balance: f64,
}
