//! LSCC engine metrics, injected rather than global (design note,
//! section 9; see `lscc-shard::metrics` for the same pattern).

use lscc_core::metrics::ComponentMetrics;
use prometheus::{CounterVec, Gauge};

pub struct ConsensusMetrics {
    rounds: CounterVec,
    channel_approvals: CounterVec,
    shard_balance: Gauge,
}

impl ConsensusMetrics {
    pub fn new(metrics: &ComponentMetrics) -> Self {
        Self {
            rounds: metrics.counter_vec("rounds_total", "Consensus rounds by outcome", &["outcome"]),
            channel_approvals: metrics.counter_vec(
                "channel_evaluations_total",
                "Phase 2 channel evaluations by outcome",
                &["outcome"],
            ),
            shard_balance: metrics.gauge("shard_balance", "Fraction of registered shards currently healthy"),
        }
    }

    pub fn record_round(&self, outcome: &str) {
        self.rounds.with_label_values(&[outcome]).inc();
    }

    pub fn record_channel_evaluation(&self, approved: bool) {
        let label = if approved { "approved" } else { "rejected" };
        self.channel_approvals.with_label_values(&[label]).inc();
    }

    pub fn set_shard_balance(&self, ratio: f64) {
        self.shard_balance.set(ratio);
    }
}
