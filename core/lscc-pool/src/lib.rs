//! Per-shard transaction pool for LSCC nodes (spec sections 3, 4.2, 7).
//!
//! Four sub-maps -- pending, processing, confirmed, cross-shard -- plus a
//! fee-descending priority sequence over pending, behind the narrow API
//! the design notes call for: `add`, `select_for_block`,
//! `confirm_in_block`, `evict_aged_confirmed`, `stats`.

pub mod config;
pub mod errors;
pub mod eviction;
pub mod metrics;
pub mod pool;
pub mod priority;

pub use config::PoolConfig;
pub use errors::{PoolError, PoolResult};
pub use metrics::PoolMetrics;
pub use pool::{PoolStats, TransactionPool};
pub use priority::{PrioritizedTx, PrioritySequence};
