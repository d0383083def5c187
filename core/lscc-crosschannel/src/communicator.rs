//! Cross-shard communicator: routing table, per-shard inboxes, relay
//! dispatch, conflict resolution, and sync, tied together (spec section
//! 4.3).

use crate::conflict::ConflictResolver;
use crate::errors::RoutingError;
use crate::message::{CrossShardMessage, DeliveryStatus, MessageBody};
use crate::metrics::CommunicatorMetrics;
use crate::relay::RelayNode;
use crate::route::RoutingTable;
use crate::sync::SyncManager;
use lscc_core::clock::Clock;
use lscc_shard::{CrossShardEnvelope, CrossShardRouter, RouteOutcome, ShardView};
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tracing::{debug, warn};

pub struct CommunicatorConfig {
    pub inbox_capacity: usize,
    pub relay_buffer_size: usize,
    pub max_retries: u32,
}

impl Default for CommunicatorConfig {
    fn default() -> Self {
        Self {
            inbox_capacity: 100,
            relay_buffer_size: 1000,
            max_retries: 3,
        }
    }
}

pub struct CrossShardCommunicator {
    shards: HashMap<u32, Arc<dyn ShardView>>,
    inboxes: HashMap<u32, Mutex<VecDeque<CrossShardMessage>>>,
    routing_table: RoutingTable,
    relay_nodes: Vec<RelayNode>,
    retry_queue: Mutex<VecDeque<CrossShardMessage>>,
    conflict_resolver: Mutex<ConflictResolver>,
    sync_manager: Mutex<SyncManager>,
    config: CommunicatorConfig,
    clock: Arc<dyn Clock>,
    metrics: Option<Arc<CommunicatorMetrics>>,
}

impl CrossShardCommunicator {
    pub fn new(
        shards: HashMap<u32, Arc<dyn ShardView>>,
        config: CommunicatorConfig,
        clock: Arc<dyn Clock>,
        metrics: Option<Arc<CommunicatorMetrics>>,
    ) -> Self {
        let inboxes = shards.keys().map(|id| (*id, Mutex::new(VecDeque::new()))).collect();
        // One relay node per shard (spec section 4.3, "Per-shard inbox").
        let relay_nodes = shards
            .keys()
            .map(|id| RelayNode::new(*id, config.relay_buffer_size))
            .collect();
        Self {
            shards,
            inboxes,
            routing_table: RoutingTable::new(config.inbox_capacity as u32),
            relay_nodes,
            retry_queue: Mutex::new(VecDeque::new()),
            conflict_resolver: Mutex::new(ConflictResolver::new()),
            sync_manager: Mutex::new(SyncManager::new(config.max_retries)),
            config,
            clock,
            metrics,
        }
    }

    pub fn add_relay(&mut self, id: u32) {
        if self.relay_nodes.iter().any(|r| r.id == id) {
            return;
        }
        self.relay_nodes.push(RelayNode::new(id, self.config.relay_buffer_size));
    }

    pub fn relay_nodes(&self) -> &[RelayNode] {
        &self.relay_nodes
    }

    pub fn routing_table(&self) -> &RoutingTable {
        &self.routing_table
    }

    pub fn conflict_resolver(&self) -> &Mutex<ConflictResolver> {
        &self.conflict_resolver
    }

    pub fn sync_manager(&self) -> &Mutex<SyncManager> {
        &self.sync_manager
    }

    pub fn retry_queue_len(&self) -> usize {
        self.retry_queue.lock().len()
    }

    pub fn inbox_len(&self, shard_id: u32) -> usize {
        self.inboxes.get(&shard_id).map(|q| q.lock().len()).unwrap_or(0)
    }

    /// `Send(msg)` (spec section 4.3): choose a route, then either write
    /// directly into the target's inbox or append to a relay's outbox.
    pub fn send(&self, message: CrossShardMessage) -> Result<DeliveryStatus, RoutingError> {
        if !self.shards.contains_key(&message.to_shard) {
            return Err(RoutingError::NoRoute);
        }

        let now = self.clock.now_secs();
        let route = self.routing_table.find_route(message.from_shard, message.to_shard, now);

        if route.relays.is_empty() {
            self.direct_send(message)
        } else {
            let relay_id = route.relays[0];
            self.relay_send(relay_id, message)
        }
    }

    fn direct_send(&self, message: CrossShardMessage) -> Result<DeliveryStatus, RoutingError> {
        let inbox = self
            .inboxes
            .get(&message.to_shard)
            .ok_or(RoutingError::NoRoute)?;
        let mut queue = inbox.lock();
        if queue.len() >= self.config.inbox_capacity {
            drop(queue);
            self.retry_queue.lock().push_back(message);
            self.record("queued_for_retry");
            return Err(RoutingError::QueueFull);
        }
        queue.push_back(message);
        self.record("queued");
        Ok(DeliveryStatus::Queued)
    }

    fn relay_send(&self, relay_id: u32, message: CrossShardMessage) -> Result<DeliveryStatus, RoutingError> {
        let relay = self
            .relay_nodes
            .iter()
            .find(|r| r.id == relay_id)
            .ok_or(RoutingError::NoRoute)?;
        if relay.enqueue(message) {
            self.record("queued");
            Ok(DeliveryStatus::Queued)
        } else {
            self.record("relay_busy");
            Err(RoutingError::RelayBusy)
        }
    }

    /// Drain the retry queue, re-attempting direct delivery for each
    /// (spec section 8, seed scenario 5).
    pub fn run_retry_tick(&self) {
        let pending: Vec<CrossShardMessage> = {
            let mut queue = self.retry_queue.lock();
            queue.drain(..).collect()
        };
        for message in pending {
            if let Err(RoutingError::QueueFull) = self.direct_send(message) {
                // stays in the retry queue via direct_send's own push
            }
        }
    }

    /// Relay dispatch tick: drain each relay's outbox, attempting direct
    /// delivery to the destination inbox (spec section 4.3, "Relay
    /// dispatch").
    pub fn run_relay_tick(&self) {
        for relay in &self.relay_nodes {
            relay.dispatch_tick(|message| {
                let inbox = match self.inboxes.get(&message.to_shard) {
                    Some(inbox) => inbox,
                    None => return false,
                };
                let mut queue = inbox.lock();
                if queue.len() >= self.config.inbox_capacity {
                    return false;
                }
                queue.push_back(message.clone());
                true
            });
        }
    }

    /// Dispatch queued inbox entries for `shard_id` to the owning
    /// shard's `ShardView`, by message type (spec section 4.3, "Message
    /// handling").
    pub fn dispatch_inbox(&self, shard_id: u32) -> usize {
        let Some(inbox) = self.inboxes.get(&shard_id) else { return 0 };
        let Some(shard) = self.shards.get(&shard_id) else { return 0 };

        let batch: Vec<CrossShardMessage> = {
            let mut queue = inbox.lock();
            queue.drain(..).collect()
        };

        let mut dispatched = 0;
        for message in batch {
            let now = self.clock.now_secs();
            match message.body {
                MessageBody::Transaction(tx) => {
                    if shard.add_transaction(tx).is_ok() {
                        dispatched += 1;
                        self.record("delivered");
                    } else {
                        warn!(shard_id, "failed to admit cross-shard transaction");
                    }
                }
                MessageBody::Block(block) => {
                    if shard.add_block(block).is_ok() {
                        dispatched += 1;
                        self.record("delivered");
                    }
                }
                MessageBody::Sync { from_height, to_height } => {
                    let mut sync_manager = self.sync_manager.lock();
                    sync_manager.submit(crate::sync::SyncRequest::new(
                        message.id.clone(),
                        shard_id,
                        from_height,
                        to_height,
                        now,
                    ));
                    dispatched += 1;
                }
                MessageBody::Validation(_) => {
                    debug!(shard_id, "validation request enqueued");
                    dispatched += 1;
                }
            }
        }
        dispatched
    }

    fn record(&self, outcome: &str) {
        if let Some(m) = &self.metrics {
            m.record_message(outcome);
        }
    }
}

impl CrossShardRouter for CrossShardCommunicator {
    fn route(&self, envelope: CrossShardEnvelope) -> RouteOutcome {
        let message = CrossShardMessage::new(
            envelope.message_id,
            envelope.from_shard,
            envelope.to_shard,
            MessageBody::Transaction(envelope.transaction),
            self.clock.now_secs(),
        );
        match self.send(message) {
            Ok(_) => RouteOutcome::Delivered,
            Err(_) => RouteOutcome::QueuedForRetry,
        }
    }
}
