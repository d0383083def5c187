//! Shard manager metrics, injected rather than global (design note,
//! section 9).

use lscc_core::metrics::ComponentMetrics;
use prometheus::{CounterVec, Gauge, GaugeVec};

pub struct ShardManagerMetrics {
    submissions: CounterVec,
    load_balance_score: Gauge,
    shard_height: GaugeVec,
    healthy_shards: Gauge,
    rebalance_events: CounterVec,
}

impl ShardManagerMetrics {
    pub fn new(metrics: &ComponentMetrics) -> Self {
        Self {
            submissions: metrics.counter_vec(
                "submissions_total",
                "Transactions submitted to the shard manager",
                &["outcome"],
            ),
            load_balance_score: metrics.gauge("load_balance_score", "Current load-balance score"),
            shard_height: metrics.gauge_vec("shard_height", "Per-shard block height", &["shard"]),
            healthy_shards: metrics.gauge("healthy_shards", "Count of currently healthy shards"),
            rebalance_events: metrics.counter_vec(
                "rebalance_events_total",
                "Rebalance events triggered",
                &["reason"],
            ),
        }
    }

    pub fn record_submission(&self, outcome: &str) {
        self.submissions.with_label_values(&[outcome]).inc();
    }

    pub fn set_load_balance_score(&self, score: f64) {
        self.load_balance_score.set(score);
    }

    pub fn set_shard_height(&self, shard_id: u32, height: u64) {
        self.shard_height
            .with_label_values(&[&shard_id.to_string()])
            .set(height as f64);
    }

    pub fn set_healthy_shards(&self, count: usize) {
        self.healthy_shards.set(count as f64);
    }

    pub fn record_rebalance(&self, reason: &str) {
        self.rebalance_events.with_label_values(&[reason]).inc();
    }
}
