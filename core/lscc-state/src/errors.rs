//! Error types for the data model crate.

use lscc_core::StorageError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StateError {
    #[error("invalid block: {0}")]
    InvalidBlock(String),

    #[error("invalid transaction: {0}")]
    InvalidTransaction(String),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("encoding error: {0}")]
    Encoding(#[from] bincode::Error),
}

pub type StateResult<T> = Result<T, StateError>;
