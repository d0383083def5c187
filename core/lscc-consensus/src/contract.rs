//! The common consensus contract (spec section 6): the seam that lets
//! LSCC be swapped for PBFT/PoS/PoW in tests and other deployments
//! without changing callers. Only LSCC is implemented in this
//! workspace; the other algorithms are out of scope (spec section 1)
//! and exist here only as this trait.

use crate::errors::ConsensusError;
use crate::types::{ConsensusMetricsSnapshot, ConsensusState};
use lscc_state::{Block, Validator};

pub trait Consensus: Send + Sync {
    /// Evaluate `block` and decide commit/no-commit. Returns the commit
    /// decision, or an error if a collaborator could not be reached.
    fn process_block(&self, block: &Block, validators: &[Validator]) -> Result<bool, ConsensusError>;

    /// Structural validation only (index contiguity, hash link, Merkle
    /// root), without running the full four-phase protocol.
    fn validate_block(&self, block: &Block, validators: &[Validator]) -> Result<(), ConsensusError>;

    /// Select the validator proposing the next block for a given round.
    fn select_validator(&self, validators: &[Validator], round: u64) -> Result<Validator, ConsensusError>;

    fn consensus_state(&self) -> ConsensusState;

    /// Replace the engine's last-known validator set (used by
    /// `select_validator` and reported through metrics).
    fn update_validators(&self, validators: Vec<Validator>);

    fn name(&self) -> &'static str;

    fn metrics(&self) -> ConsensusMetricsSnapshot;
}
