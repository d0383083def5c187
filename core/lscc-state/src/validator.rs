//! Validator data type (spec section 3).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidatorStatus {
    Active,
    Inactive,
}

/// A validator belongs to exactly one shard (section 3 invariant);
/// reassignment happens only through the rebalancer in `lscc-shard`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Validator {
    pub address: String,
    pub public_key: Vec<u8>,
    pub stake: u64,
    pub shard_id: u32,
    pub status: ValidatorStatus,
    pub last_active: u64,
}

impl Validator {
    pub fn new(address: String, public_key: Vec<u8>, stake: u64, shard_id: u32, now: u64) -> Self {
        Self {
            address,
            public_key,
            stake,
            shard_id,
            status: ValidatorStatus::Active,
            last_active: now,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self.status, ValidatorStatus::Active)
    }
}
