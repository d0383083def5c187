//! Cross-channel communicator metrics, injected rather than global
//! (design note, section 9).

use lscc_core::metrics::ComponentMetrics;
use prometheus::{CounterVec, Gauge};

pub struct CommunicatorMetrics {
    messages: CounterVec,
    routes_active: Gauge,
    relay_failures: CounterVec,
    conflicts_resolved: CounterVec,
}

impl CommunicatorMetrics {
    pub fn new(metrics: &ComponentMetrics) -> Self {
        Self {
            messages: metrics.counter_vec("messages_total", "Cross-shard messages by outcome", &["outcome"]),
            routes_active: metrics.gauge("routes_active", "Number of active routes"),
            relay_failures: metrics.counter_vec("relay_failures_total", "Relay dispatch failures", &["relay"]),
            conflicts_resolved: metrics.counter_vec(
                "conflicts_resolved_total",
                "Conflicts resolved by type",
                &["conflict_type"],
            ),
        }
    }

    pub fn record_message(&self, outcome: &str) {
        self.messages.with_label_values(&[outcome]).inc();
    }

    pub fn set_routes_active(&self, count: usize) {
        self.routes_active.set(count as f64);
    }

    pub fn record_relay_failure(&self, relay_id: u32) {
        self.relay_failures.with_label_values(&[&relay_id.to_string()]).inc();
    }

    pub fn record_conflict_resolved(&self, conflict_type: &str) {
        self.conflicts_resolved.with_label_values(&[conflict_type]).inc();
    }
}
