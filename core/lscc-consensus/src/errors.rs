//! Consensus error kinds (spec section 7).

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConsensusError {
    /// A phase could not be evaluated (e.g. the candidate's shard has no
    /// registered collaborator view).
    #[error("consensus phase failed: {0}")]
    PhaseFailed(String),

    /// A collaborator (shard view, sibling shard) did not respond within
    /// its bound, or is missing from the registry entirely.
    #[error("collaborator timeout: {0}")]
    CollaboratorTimeout(String),

    /// No validators were available to select from.
    #[error("no validators available for selection")]
    NoValidators,
}

pub type ConsensusResult<T> = Result<T, ConsensusError>;
