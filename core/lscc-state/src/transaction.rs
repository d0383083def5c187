//! Transaction data type (spec section 3).

use lscc_core::canonical_encode;
use serde::{Deserialize, Serialize};

/// Hex-encoded transaction id, derived from a content hash.
pub type TxId = String;

/// `regular` transactions are routed entirely within one shard; `cross_shard`
/// ones have a sender and receiver that hash to different shards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TxType {
    Regular,
    CrossShard,
}

/// A submitted transaction.
///
/// `shard_id` starts unset (`None`) and is assigned exactly once at
/// admission, per the invariant `shard_id = H(sender) mod n_shards`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TxId,
    pub sender: String,
    pub receiver: String,
    pub amount: u64,
    pub fee: u64,
    pub nonce: u64,
    pub signature: Vec<u8>,
    pub timestamp: u64,
    pub shard_id: Option<u32>,
    pub tx_type: TxType,
    pub payload: Vec<u8>,
}

/// Fields that go into a transaction's content hash. Kept separate from
/// `Transaction` so the id can be computed before the id field itself
/// exists.
#[derive(Serialize)]
struct TxContent<'a> {
    sender: &'a str,
    receiver: &'a str,
    amount: u64,
    fee: u64,
    nonce: u64,
    payload: &'a [u8],
    timestamp: u64,
}

impl Transaction {
    /// Build a new, unrouted transaction with a freshly derived id.
    pub fn new(
        sender: String,
        receiver: String,
        amount: u64,
        fee: u64,
        nonce: u64,
        signature: Vec<u8>,
        timestamp: u64,
        payload: Vec<u8>,
    ) -> Self {
        let id = Self::derive_id(&sender, &receiver, amount, fee, nonce, &payload, timestamp);
        Self {
            id,
            sender,
            receiver,
            amount,
            fee,
            nonce,
            signature,
            timestamp,
            shard_id: None,
            tx_type: TxType::Regular,
            payload,
        }
    }

    /// Deterministic content hash used as the transaction id (section 3,
    /// resolved concretely by SPEC_FULL.md): BLAKE3 over the
    /// canonical-encoded content fields, hex-encoded.
    fn derive_id(
        sender: &str,
        receiver: &str,
        amount: u64,
        fee: u64,
        nonce: u64,
        payload: &[u8],
        timestamp: u64,
    ) -> TxId {
        let content = TxContent {
            sender,
            receiver,
            amount,
            fee,
            nonce,
            payload,
            timestamp,
        };
        let bytes = canonical_encode(&content);
        hex::encode(blake3::hash(&bytes).as_bytes())
    }

    /// `true` once the routing invariant has assigned a home shard.
    pub fn is_routed(&self) -> bool {
        self.shard_id.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_is_deterministic_over_content() {
        let a = Transaction::new(
            "alice".into(),
            "bob".into(),
            100,
            5,
            1,
            vec![1, 2, 3],
            1000,
            vec![],
        );
        let b = Transaction::new(
            "alice".into(),
            "bob".into(),
            100,
            5,
            1,
            vec![9, 9, 9], // signature doesn't affect the content hash
            1000,
            vec![],
        );
        assert_eq!(a.id, b.id);
    }

    #[test]
    fn id_changes_with_content() {
        let a = Transaction::new("alice".into(), "bob".into(), 100, 5, 1, vec![], 1000, vec![]);
        let b = Transaction::new("alice".into(), "bob".into(), 101, 5, 1, vec![], 1000, vec![]);
        assert_ne!(a.id, b.id);
    }
}
