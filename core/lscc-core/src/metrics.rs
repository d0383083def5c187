//! Injected metrics registration.
//!
//! The teacher crates (`qnet-mempool::metrics`, `qnet-consensus::metrics`)
//! register their counters in a process-global `lazy_static!` registry,
//! which collides when more than one instance runs in the same process --
//! exactly the case for this workspace's own test suite, which spins up
//! several `ShardManager`/engine instances concurrently. Design note
//! section 9 calls for package-level singletons to become injected
//! dependencies instead, so every component here takes a shared
//! `ComponentMetrics` handle built on a caller-owned `prometheus::Registry`
//! rather than reaching for a global.

use prometheus::{Counter, CounterVec, Gauge, GaugeVec, HistogramVec, Opts, Registry};
use std::sync::Arc;

/// A namespaced handle onto a shared `prometheus::Registry`.
///
/// Construct one per top-level component (shard manager, communicator,
/// consensus engine) with a distinct `subsystem` so metric names don't
/// collide, then register individual metrics through it.
#[derive(Clone)]
pub struct ComponentMetrics {
    registry: Arc<Registry>,
    subsystem: &'static str,
}

impl ComponentMetrics {
    pub fn new(registry: Arc<Registry>, subsystem: &'static str) -> Self {
        Self { registry, subsystem }
    }

    fn name(&self, metric: &str) -> String {
        format!("lscc_{}_{}", self.subsystem, metric)
    }

    pub fn counter(&self, metric: &str, help: &str) -> Counter {
        let c = Counter::with_opts(Opts::new(self.name(metric), help.to_string())).unwrap();
        self.registry.register(Box::new(c.clone())).ok();
        c
    }

    pub fn counter_vec(&self, metric: &str, help: &str, labels: &[&str]) -> CounterVec {
        let c =
            CounterVec::new(Opts::new(self.name(metric), help.to_string()), labels).unwrap();
        self.registry.register(Box::new(c.clone())).ok();
        c
    }

    pub fn gauge(&self, metric: &str, help: &str) -> Gauge {
        let g = Gauge::with_opts(Opts::new(self.name(metric), help.to_string())).unwrap();
        self.registry.register(Box::new(g.clone())).ok();
        g
    }

    pub fn gauge_vec(&self, metric: &str, help: &str, labels: &[&str]) -> GaugeVec {
        let g = GaugeVec::new(Opts::new(self.name(metric), help.to_string()), labels).unwrap();
        self.registry.register(Box::new(g.clone())).ok();
        g
    }

    pub fn histogram_vec(
        &self,
        metric: &str,
        help: &str,
        labels: &[&str],
        buckets: Vec<f64>,
    ) -> HistogramVec {
        let opts = prometheus::HistogramOpts::new(self.name(metric), help.to_string())
            .buckets(buckets);
        let h = HistogramVec::new(opts, labels).unwrap();
        self.registry.register(Box::new(h.clone())).ok();
        h
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_instances_with_distinct_subsystems_do_not_collide() {
        let registry = Arc::new(Registry::new());
        let a = ComponentMetrics::new(registry.clone(), "shard_a");
        let b = ComponentMetrics::new(registry.clone(), "shard_b");
        let _ca = a.counter("submitted_total", "txs submitted");
        let _cb = b.counter("submitted_total", "txs submitted");
        assert_eq!(registry.gather().len(), 2);
    }
}
