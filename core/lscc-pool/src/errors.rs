//! Admission errors for the transaction pool (spec section 7: "Admission
//! errors" -- reported to the caller, not logged as errors).

use lscc_state::TxId;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PoolError {
    #[error("pool is full: capacity {capacity}")]
    PoolFull { capacity: usize },

    #[error("transaction routed to the wrong shard")]
    WrongShard,

    #[error("malformed transaction: {0}")]
    MalformedTx(String),

    #[error("transaction already present: {0}")]
    DuplicateTransaction(TxId),

    #[error("transaction not found: {0}")]
    NotFound(TxId),
}

pub type PoolResult<T> = Result<T, PoolError>;
