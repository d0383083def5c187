//! The LSCC four-phase consensus engine for the LSCC node (spec section
//! 4.4): layer consensus, cross-channel consensus, shard synchronisation,
//! and weighted final commitment, behind the swappable `Consensus`
//! contract (spec section 6) so alternative engines can stand in for
//! tests without touching callers.

pub mod config;
pub mod contract;
pub mod engine;
pub mod errors;
pub mod metrics;
pub mod phases;
pub mod types;
pub mod view;

pub use config::LsccConsensusConfig;
pub use contract::Consensus;
pub use engine::LsccEngine;
pub use errors::{ConsensusError, ConsensusResult};
pub use metrics::ConsensusMetrics;
pub use types::{ChannelResult, CommitDecision, ConsensusMetricsSnapshot, ConsensusState, LayerResult, PhaseOutcomes};
pub use view::ConsensusShardView;
