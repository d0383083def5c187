//! Cross-shard communication: routing, relay dispatch, validation, sync,
//! and conflict resolution between shards (spec section 4.3).
//!
//! `lscc-shard` defines the narrow `CrossShardRouter` seam it depends on;
//! this crate implements it for `CrossShardCommunicator` so the two
//! crates never form a cycle (design note, section 9).

pub mod communicator;
pub mod conflict;
pub mod errors;
pub mod message;
pub mod metrics;
pub mod relay;
pub mod route;
pub mod sync;
pub mod validation;

pub use communicator::{CommunicatorConfig, CrossShardCommunicator};
pub use conflict::{Conflict, ConflictResolver, ConflictType, ConflictingEntry, Resolution};
pub use errors::{RoutingError, RoutingResult, ValidationError, ValidationResult};
pub use message::{CrossShardMessage, DeliveryStatus, MessageBody};
pub use metrics::CommunicatorMetrics;
pub use relay::RelayNode;
pub use route::{PriorityBand, Route, RoutingTable};
pub use sync::{SyncManager, SyncRequest, SyncState};
pub use validation::{validate, ValidationRequest};
