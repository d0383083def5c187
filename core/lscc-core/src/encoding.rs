//! Canonical encoding used for content hashes (transaction/block ids) and
//! for the storage keyspace's values.

use serde::Serialize;

/// Encode `value` with `bincode`, the workspace's canonical wire/storage
/// format (matching the teacher crates' use of `bincode` throughout).
pub fn canonical_encode<T: Serialize>(value: &T) -> Vec<u8> {
    bincode::serialize(value).expect("canonical encoding never fails for workspace types")
}
