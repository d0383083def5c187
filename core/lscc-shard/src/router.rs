//! Seam between the shard manager and the cross-shard communicator
//! (design note, section 9): breaking the cyclic dependency the other
//! direction. `lscc-crosschannel` implements `CrossShardRouter` for its
//! `CrossShardCommunicator`; `lscc-shard` only depends on this trait, not
//! on the concrete communicator type.

use lscc_state::Transaction;

/// A cross-shard transaction handed to the router by `ShardManager::submit`
/// (spec section 4.1, step 3).
#[derive(Debug, Clone)]
pub struct CrossShardEnvelope {
    pub message_id: String,
    pub transaction: Transaction,
    pub from_shard: u32,
    pub to_shard: u32,
}

/// Outcome of attempting to route a cross-shard envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteOutcome {
    Delivered,
    QueuedForRetry,
}

pub trait CrossShardRouter: Send + Sync {
    fn route(&self, envelope: CrossShardEnvelope) -> RouteOutcome;
}

/// Router used before a real communicator is wired in (and in
/// single-shard tests): always reports a full queue, so callers get
/// `queued_for_retry` rather than a false delivery.
#[derive(Debug, Default)]
pub struct NoopRouter;

impl CrossShardRouter for NoopRouter {
    fn route(&self, _envelope: CrossShardEnvelope) -> RouteOutcome {
        RouteOutcome::QueuedForRetry
    }
}
