//! Block data type (spec section 3) and Merkle root computation.

use crate::transaction::Transaction;
use lscc_core::canonical_encode;
use serde::{Deserialize, Serialize};

pub type BlockHash = String;

/// A committed (or candidate) block within one shard's chain.
///
/// Invariants enforced by callers: `index == previous.index + 1` within
/// the shard; `shard_id` matches the owning shard; `hash` is deterministic
/// over the header fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub index: u64,
    pub timestamp: u64,
    pub previous_hash: BlockHash,
    pub merkle_root: BlockHash,
    pub hash: BlockHash,
    pub shard_id: u32,
    pub validator_id: String,
    pub nonce: Option<u64>,
    pub difficulty: Option<u64>,
    pub gas_limit: u64,
    pub gas_used: u64,
    pub transactions: Vec<Transaction>,
}

#[derive(Serialize)]
struct BlockHeader<'a> {
    index: u64,
    timestamp: u64,
    previous_hash: &'a str,
    merkle_root: &'a str,
    shard_id: u32,
    validator_id: &'a str,
}

impl Block {
    /// Assemble a block, computing its Merkle root and hash from the given
    /// header fields and transaction set.
    pub fn new(
        index: u64,
        timestamp: u64,
        previous_hash: BlockHash,
        shard_id: u32,
        validator_id: String,
        gas_limit: u64,
        gas_used: u64,
        transactions: Vec<Transaction>,
    ) -> Self {
        let merkle_root = merkle_root(&transactions);
        let hash = compute_hash(index, timestamp, &previous_hash, &merkle_root, shard_id, &validator_id);
        Self {
            index,
            timestamp,
            previous_hash,
            merkle_root,
            hash,
            shard_id,
            validator_id,
            nonce: None,
            difficulty: None,
            gas_limit,
            gas_used,
            transactions,
        }
    }

    /// `true` iff `self` could directly follow `previous` in the same
    /// shard's chain (index contiguity and hash link, section 8 invariant 2).
    pub fn follows(&self, previous: &Block) -> bool {
        self.index == previous.index + 1
            && self.previous_hash == previous.hash
            && self.shard_id == previous.shard_id
    }

    /// Recompute the Merkle root over this block's current transaction set
    /// and compare it against the stored `merkle_root`.
    pub fn merkle_root_matches(&self) -> bool {
        merkle_root(&self.transactions) == self.merkle_root
    }
}

fn compute_hash(
    index: u64,
    timestamp: u64,
    previous_hash: &str,
    merkle_root: &str,
    shard_id: u32,
    validator_id: &str,
) -> BlockHash {
    let header = BlockHeader {
        index,
        timestamp,
        previous_hash,
        merkle_root,
        shard_id,
        validator_id,
    };
    let bytes = canonical_encode(&header);
    hex::encode(blake3::hash(&bytes).as_bytes())
}

/// Binary Merkle tree over BLAKE3 leaf hashes of each transaction's id
/// bytes. An odd trailing node is duplicated upward (SPEC_FULL.md
/// resolution of an otherwise unspecified detail).
pub fn merkle_root(transactions: &[Transaction]) -> BlockHash {
    if transactions.is_empty() {
        return hex::encode(blake3::hash(b"").as_bytes());
    }

    let mut level: Vec<[u8; 32]> = transactions
        .iter()
        .map(|tx| *blake3::hash(tx.id.as_bytes()).as_bytes())
        .collect();

    while level.len() > 1 {
        let mut next = Vec::with_capacity((level.len() + 1) / 2);
        for pair in level.chunks(2) {
            let mut hasher = blake3::Hasher::new();
            hasher.update(&pair[0]);
            hasher.update(pair.get(1).unwrap_or(&pair[0]));
            next.push(*hasher.finalize().as_bytes());
        }
        level = next;
    }

    hex::encode(level[0])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::Transaction;

    fn tx(id_seed: &str) -> Transaction {
        Transaction::new(id_seed.into(), "dst".into(), 1, 1, 1, vec![], 0, vec![])
    }

    #[test]
    fn hash_is_deterministic() {
        let txs = vec![tx("a"), tx("b")];
        let b1 = Block::new(1, 1000, "prev".into(), 0, "v1".into(), 1000, 0, txs.clone());
        let b2 = Block::new(1, 1000, "prev".into(), 0, "v1".into(), 1000, 0, txs);
        assert_eq!(b1.hash, b2.hash);
    }

    #[test]
    fn follows_checks_index_and_link() {
        let genesis = Block::new(0, 0, "0".into(), 0, "v1".into(), 1000, 0, vec![]);
        let next = Block::new(1, 1, genesis.hash.clone(), 0, "v1".into(), 1000, 0, vec![tx("a")]);
        assert!(next.follows(&genesis));

        let wrong_index = Block::new(2, 1, genesis.hash.clone(), 0, "v1".into(), 1000, 0, vec![]);
        assert!(!wrong_index.follows(&genesis));
    }

    #[test]
    fn merkle_root_changes_with_transaction_set() {
        let r1 = merkle_root(&[tx("a"), tx("b")]);
        let r2 = merkle_root(&[tx("a"), tx("c")]);
        assert_ne!(r1, r2);
    }

    #[test]
    fn odd_leaf_count_does_not_panic() {
        let _ = merkle_root(&[tx("a"), tx("b"), tx("c")]);
    }
}
