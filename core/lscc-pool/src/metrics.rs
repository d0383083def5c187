//! Pool metrics, injected rather than global (design note, section 9: the
//! teacher's `lazy_static!` registries become per-instance handles so
//! multiple pools -- one per shard -- don't collide on metric names).

use lscc_core::metrics::ComponentMetrics;
use prometheus::{CounterVec, GaugeVec};

pub struct PoolMetrics {
    tx_ops: CounterVec,
    size: GaugeVec,
    evictions: CounterVec,
}

impl PoolMetrics {
    pub fn new(metrics: &ComponentMetrics) -> Self {
        Self {
            tx_ops: metrics.counter_vec(
                "tx_operations_total",
                "Total number of pool operations",
                &["operation", "result"],
            ),
            size: metrics.gauge_vec("size", "Current pool sub-map sizes", &["state"]),
            evictions: metrics.counter_vec("evictions_total", "Total evictions", &["reason"]),
        }
    }

    pub fn record_operation(&self, operation: &str, success: bool) {
        let result = if success { "success" } else { "failure" };
        self.tx_ops.with_label_values(&[operation, result]).inc();
    }

    pub fn update_size(&self, pending: usize, processing: usize, confirmed: usize, cross_shard: usize) {
        self.size.with_label_values(&["pending"]).set(pending as f64);
        self.size.with_label_values(&["processing"]).set(processing as f64);
        self.size.with_label_values(&["confirmed"]).set(confirmed as f64);
        self.size.with_label_values(&["cross_shard"]).set(cross_shard as f64);
    }

    pub fn record_eviction(&self, reason: &str) {
        self.evictions.with_label_values(&[reason]).inc();
    }
}
