//! Fee-descending priority ordering for pending transactions (spec section
//! 4.2: "Priority ordering").
//!
//! Insertion sort into a sequence ordered by `fee` descending. Ties break
//! on earlier timestamp first, then lexicographic id -- exactly the rule
//! the seed scenario in section 8 (`fee-priority assembly`) exercises.

use lscc_state::{Transaction, TxId};
use std::cmp::Ordering;

/// One entry in the priority sequence: just enough of a pending
/// transaction's identity to order and re-identify it without holding a
/// second clone of the whole transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrioritizedTx {
    pub id: TxId,
    pub fee: u64,
    pub timestamp: u64,
}

impl From<&Transaction> for PrioritizedTx {
    fn from(tx: &Transaction) -> Self {
        Self {
            id: tx.id.clone(),
            fee: tx.fee,
            timestamp: tx.timestamp,
        }
    }
}

/// Ordering used by the priority sequence: higher fee first; tie-break on
/// earlier timestamp, then lexicographically smaller id.
impl Ord for PrioritizedTx {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .fee
            .cmp(&self.fee)
            .then_with(|| self.timestamp.cmp(&other.timestamp))
            .then_with(|| self.id.cmp(&other.id))
    }
}

impl PartialOrd for PrioritizedTx {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// The fee-descending priority sequence. Backed by a plain `Vec` kept
/// sorted by insertion, matching the spec's explicit "insertion sort" /
/// "rebuild by filtering" wording rather than a binary heap, so the head
/// of the sequence is always `sequence[0]`.
#[derive(Debug, Default)]
pub struct PrioritySequence {
    entries: Vec<PrioritizedTx>,
}

impl PrioritySequence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Insertion-sort `entry` into its ordered position.
    pub fn insert(&mut self, entry: PrioritizedTx) {
        let pos = self.entries.partition_point(|e| e <= &entry);
        self.entries.insert(pos, entry);
    }

    /// Remove a specific id, if present.
    pub fn remove(&mut self, id: &str) {
        self.entries.retain(|e| e.id != id);
    }

    /// Take up to `k` ids from the head of the sequence, without mutating
    /// the sequence -- block assembly decides which actually got selected
    /// before the pool rebuilds the sequence (section 4.2).
    pub fn peek_head(&self, k: usize) -> Vec<TxId> {
        self.entries.iter().take(k).map(|e| e.id.clone()).collect()
    }

    /// Rebuild the sequence, dropping every id in `selected` (O(n), as
    /// specified).
    pub fn remove_all(&mut self, selected: &[TxId]) {
        self.entries.retain(|e| !selected.contains(&e.id));
    }

    pub fn ids(&self) -> Vec<TxId> {
        self.entries.iter().map(|e| e.id.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: &str, fee: u64, timestamp: u64) -> PrioritizedTx {
        PrioritizedTx {
            id: id.to_string(),
            fee,
            timestamp,
        }
    }

    #[test]
    fn fee_priority_assembly_matches_seed_scenario() {
        // Insert fees {10, 50, 30, 50} in this order, as section 8 scenario 3.
        let mut seq = PrioritySequence::new();
        seq.insert(entry("a", 10, 1));
        seq.insert(entry("b", 50, 2));
        seq.insert(entry("c", 30, 3));
        seq.insert(entry("d", 50, 4));

        let head = seq.peek_head(3);
        assert_eq!(head, vec!["b".to_string(), "d".to_string(), "c".to_string()]);

        seq.remove_all(&head);
        assert_eq!(seq.ids(), vec!["a".to_string()]);
    }

    #[test]
    fn ties_break_by_lexicographic_id_after_timestamp() {
        let mut seq = PrioritySequence::new();
        seq.insert(entry("zzz", 10, 100));
        seq.insert(entry("aaa", 10, 100));
        assert_eq!(seq.ids(), vec!["aaa".to_string(), "zzz".to_string()]);
    }
}
