//! Routing and validation error kinds (spec section 7).

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RoutingError {
    #[error("no route available")]
    NoRoute,

    #[error("destination inbox queue is full")]
    QueueFull,

    #[error("relay outbox is full")]
    RelayBusy,
}

pub type RoutingResult<T> = Result<T, RoutingError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("invalid signature")]
    InvalidSignature,

    #[error("invalid amount")]
    InvalidAmount,

    #[error("unknown shard: {0}")]
    UnknownShard(u32),
}

pub type ValidationResult<T> = Result<T, ValidationError>;
