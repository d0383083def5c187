//! Crate-spanning error taxonomy (section 7).
//!
//! Each component crate defines its own `thiserror` enum for the error
//! kinds it originates (`PoolError`, `RoutingError`, `ValidationError`,
//! `ConsensusError`); `LsccError` is the type the node binary deals in,
//! with `#[from]` conversions from every component error so a single
//! `?`-chain can cross crate boundaries.

use crate::storage::StorageError;
use thiserror::Error;

/// Coarse error classification used for metrics labels and logging,
/// mirroring the five kinds enumerated in section 7.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Admission,
    Routing,
    Validation,
    Consensus,
    Infrastructure,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Admission => "admission",
            ErrorKind::Routing => "routing",
            ErrorKind::Validation => "validation",
            ErrorKind::Consensus => "consensus",
            ErrorKind::Infrastructure => "infrastructure",
        }
    }
}

/// Top-level error type threaded through the node composition root.
#[derive(Debug, Error)]
pub enum LsccError {
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("{kind:?}: {message}")]
    Other { kind: ErrorKind, message: String },
}

pub type LsccResult<T> = Result<T, LsccError>;
