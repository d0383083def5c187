//! Thin composition root for the LSCC consensus node (spec section 2):
//! wires `lscc-core`/`lscc-state`/`lscc-pool`/`lscc-shard`/
//! `lscc-crosschannel`/`lscc-consensus` into one running node, owns
//! configuration loading (spec section 6) and the background worker
//! supervisor (spec section 5). Exposes no HTTP surface itself -- an
//! explicit Non-goal.

pub mod config;
pub mod node;
pub mod shard_adapter;
pub mod workers;

pub use config::{ConfigError, LsccConfig};
pub use node::Node;
pub use workers::Supervisor;
