//! Background worker supervisor (spec section 5, "Worker inventory").
//!
//! Every worker is a `tokio::spawn`ed task parked on a
//! `tokio::time::interval` ticker, racing against a shared
//! `tokio::sync::watch` stop signal so `Supervisor::stop` terminates all
//! of them cleanly without requiring each task to poll a flag itself
//! (design note, section 9).

use crate::node::Node;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Runs `tick` on `period` until `stop` fires.
fn spawn_ticker<F>(name: &'static str, period: Duration, mut stop: watch::Receiver<bool>, mut tick: F) -> JoinHandle<()>
where
    F: FnMut() + Send + 'static,
{
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        loop {
            tokio::select! {
                _ = interval.tick() => {
                    tick();
                }
                _ = stop.changed() => {
                    if *stop.borrow() {
                        debug!(worker = name, "stopping");
                        break;
                    }
                }
            }
        }
    })
}

/// Owns every background task for one running `Node` and the stop
/// signal that cancels them (spec section 5, "Every long-running
/// component owns a set of workers started at `Start()` and joined at
/// `Stop()`").
pub struct Supervisor {
    stop_tx: watch::Sender<bool>,
    handles: Vec<JoinHandle<()>>,
}

impl Supervisor {
    /// Start every worker in the spec's inventory: the shard manager's
    /// rebalancer and consensus coordinator, each shard's processor and
    /// cleanup workers, and the communicator's retry and relay dispatch
    /// workers.
    pub fn start(node: Arc<Node>) -> Self {
        let (stop_tx, stop_rx) = watch::channel(false);
        let mut handles = Vec::new();

        {
            let node = node.clone();
            handles.push(spawn_ticker(
                "shard_manager.rebalancer",
                Duration::from_secs(node.config.rebalance_interval_secs.max(1)),
                stop_rx.clone(),
                move || {
                    if let Some(result) = node.shard_manager.run_rebalance_tick() {
                        info!(total_validators = result.total_validators, "rebalance tick ran");
                    }
                },
            ));
        }

        {
            let node = node.clone();
            handles.push(spawn_ticker(
                "shard_manager.consensus_coordinator",
                Duration::from_secs(30),
                stop_rx.clone(),
                move || {
                    let status = node.shard_manager.global_status();
                    debug!(?status, "global consensus status");
                },
            ));
        }

        {
            let node = node.clone();
            handles.push(spawn_ticker(
                "shard_manager.performance_sampler",
                Duration::from_secs(10),
                stop_rx.clone(),
                move || {
                    let stats = node.shard_manager.metrics();
                    debug!(
                        healthy = stats.healthy_shards,
                        total = stats.total_shards,
                        load_balance = stats.load_balance_score,
                        "shard manager performance sample"
                    );
                },
            ));
        }

        for shard in node.shard_manager.list_shards() {
            let shard_id = shard.id();
            let shard_for_processor = shard.clone();
            handles.push(spawn_ticker(
                "shard.processor",
                Duration::from_secs(1),
                stop_rx.clone(),
                move || {
                    let promoted = shard_for_processor.run_processor_tick();
                    if promoted > 0 {
                        debug!(shard_id, promoted, "promoted cross-shard arrivals");
                    }
                },
            ));

            let shard_for_cleanup = shard.clone();
            handles.push(spawn_ticker(
                "shard.cleanup",
                Duration::from_secs(300),
                stop_rx.clone(),
                move || {
                    let evicted = shard_for_cleanup.run_cleanup_tick();
                    if evicted > 0 {
                        debug!(shard_id, evicted, "cleanup tick evicted aged entries");
                    }
                },
            ));
        }

        {
            let communicator = node.communicator.clone();
            let num_shards = node.config.num_shards;
            handles.push(spawn_ticker(
                "communicator.message_processor",
                Duration::from_millis(100),
                stop_rx.clone(),
                move || {
                    for shard_id in 0..num_shards {
                        communicator.dispatch_inbox(shard_id);
                    }
                },
            ));
        }

        {
            let communicator = node.communicator.clone();
            handles.push(spawn_ticker(
                "communicator.retry_queue",
                Duration::from_secs(1),
                stop_rx.clone(),
                move || communicator.run_retry_tick(),
            ));
        }

        {
            let communicator = node.communicator.clone();
            handles.push(spawn_ticker(
                "communicator.relay_dispatch",
                Duration::from_secs(1),
                stop_rx.clone(),
                move || communicator.run_relay_tick(),
            ));
        }

        {
            let communicator = node.communicator.clone();
            handles.push(spawn_ticker(
                "communicator.routing_table_updater",
                Duration::from_secs(30),
                stop_rx.clone(),
                move || communicator.routing_table().refresh_all(),
            ));
        }

        {
            let communicator = node.communicator.clone();
            let clock = node.clock.clone();
            handles.push(spawn_ticker(
                "communicator.conflict_resolver",
                Duration::from_secs(2),
                stop_rx.clone(),
                move || communicator.conflict_resolver().lock().resolve_all(clock.now_secs()),
            ));
        }

        {
            let communicator = node.communicator.clone();
            let clock = node.clock.clone();
            handles.push(spawn_ticker(
                "communicator.sync_worker",
                Duration::from_secs(5),
                stop_rx.clone(),
                move || {
                    let now = clock.now_secs();
                    communicator.sync_manager().lock().run_tick(now, |_request| true);
                },
            ));
        }

        {
            let communicator = node.communicator.clone();
            handles.push(spawn_ticker(
                "communicator.metrics_collector",
                Duration::from_secs(5),
                stop_rx.clone(),
                move || {
                    let routes = communicator.routing_table().len();
                    debug!(routes, "communicator route count sampled");
                },
            ));
        }

        Self { stop_tx, handles }
    }

    /// Broadcast the stop signal and join every worker (spec section 5,
    /// "Workers terminate cleanly on a broadcast stop signal").
    pub async fn stop(self) {
        let _ = self.stop_tx.send(true);
        for handle in self.handles {
            if let Err(err) = handle.await {
                warn!(error = %err, "worker task panicked during shutdown");
            }
        }
    }
}
