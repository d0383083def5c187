//! Cross-shard message envelope and dispatch (spec section 4.3,
//! "Message handling").

use lscc_state::{Block, Transaction};

/// Delivery status a message moves through on its way to a shard's inbox
/// (spec section 8, seed scenario 5: `queued -> retry_queued ->
/// processing -> delivered`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryStatus {
    Queued,
    RetryQueued,
    Processing,
    Delivered,
    Failed,
}

/// The payload carried by a cross-shard message.
#[derive(Debug, Clone)]
pub enum MessageBody {
    Transaction(Transaction),
    Block(Block),
    Sync { from_height: u64, to_height: u64 },
    Validation(Transaction),
}

/// A single cross-shard message, identified and deduplicated by `id`
/// (spec section 8, invariant 7: fixed route, enqueue order == delivery
/// order -- dedup-by-id enforces "at most once" on top of that).
#[derive(Debug, Clone)]
pub struct CrossShardMessage {
    pub id: String,
    pub from_shard: u32,
    pub to_shard: u32,
    pub body: MessageBody,
    pub enqueued_at: u64,
}

impl CrossShardMessage {
    pub fn new(id: String, from_shard: u32, to_shard: u32, body: MessageBody, enqueued_at: u64) -> Self {
        Self {
            id,
            from_shard,
            to_shard,
            body,
            enqueued_at,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self.body {
            MessageBody::Transaction(_) => "transaction",
            MessageBody::Block(_) => "block",
            MessageBody::Sync { .. } => "sync",
            MessageBody::Validation(_) => "validation",
        }
    }
}
