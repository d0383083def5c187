//! Conflict resolver (spec section 4.3, "Conflict resolver").

use lscc_state::{Transaction, TxId};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConflictType {
    DoubleSpend,
    Ordering,
    State,
}

#[derive(Debug, Clone)]
pub struct ConflictingEntry {
    pub tx: Transaction,
    /// Only meaningful for `State` conflicts: the proposer's stake.
    pub proposer_stake: u64,
}

#[derive(Debug, Clone)]
pub struct Resolution {
    pub winning_id: TxId,
    pub winning_fee: Option<u64>,
    pub winning_stake: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct Conflict {
    pub id: String,
    pub conflict_type: ConflictType,
    pub entries: Vec<ConflictingEntry>,
    pub resolved_at: Option<u64>,
    pub resolution: Option<Resolution>,
}

impl Conflict {
    pub fn new(id: String, conflict_type: ConflictType, entries: Vec<ConflictingEntry>) -> Self {
        Self {
            id,
            conflict_type,
            entries,
            resolved_at: None,
            resolution: None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.resolved_at.is_some()
    }
}

/// Resolve `conflict` in place if it has a matching rule and isn't
/// already resolved (spec section 8, invariant 6: idempotent --
/// re-running on an already-resolved conflict is a no-op).
pub fn resolve(conflict: &mut Conflict, now: u64) {
    if conflict.is_resolved() {
        return;
    }
    if conflict.entries.is_empty() {
        return;
    }

    let winner = match conflict.conflict_type {
        // prefer_higher_fee: max fee, tie -> earlier timestamp, tie -> lex id.
        ConflictType::DoubleSpend => conflict
            .entries
            .iter()
            .max_by(|a, b| {
                a.tx.fee
                    .cmp(&b.tx.fee)
                    .then_with(|| b.tx.timestamp.cmp(&a.tx.timestamp))
                    .then_with(|| b.tx.id.cmp(&a.tx.id))
            })
            .cloned(),
        // prefer_earlier_timestamp: min timestamp, tie -> lex id.
        ConflictType::Ordering => conflict
            .entries
            .iter()
            .min_by(|a, b| a.tx.timestamp.cmp(&b.tx.timestamp).then_with(|| a.tx.id.cmp(&b.tx.id)))
            .cloned(),
        // prefer_higher_stake: proposer's stake descending, tie -> lex id.
        ConflictType::State => conflict
            .entries
            .iter()
            .max_by(|a, b| {
                a.proposer_stake
                    .cmp(&b.proposer_stake)
                    .then_with(|| b.tx.id.cmp(&a.tx.id))
            })
            .cloned(),
    };

    let Some(winner) = winner else { return };

    conflict.resolved_at = Some(now);
    conflict.resolution = Some(Resolution {
        winning_id: winner.tx.id.clone(),
        winning_fee: matches!(conflict.conflict_type, ConflictType::DoubleSpend).then_some(winner.tx.fee),
        winning_stake: matches!(conflict.conflict_type, ConflictType::State).then_some(winner.proposer_stake),
    });
}

/// Conflict registry, indexed by id (spec section 4.3: "Rules indexed by
/// conflict type; evaluated by declared priority").
#[derive(Default)]
pub struct ConflictResolver {
    conflicts: HashMap<String, Conflict>,
}

impl ConflictResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, conflict: Conflict) {
        self.conflicts.insert(conflict.id.clone(), conflict);
    }

    pub fn get(&self, id: &str) -> Option<&Conflict> {
        self.conflicts.get(id)
    }

    /// Resolve every unresolved conflict (a retry cycle).
    pub fn resolve_all(&mut self, now: u64) {
        for conflict in self.conflicts.values_mut() {
            resolve(conflict, now);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: &str, fee: u64, timestamp: u64) -> ConflictingEntry {
        ConflictingEntry {
            tx: Transaction::new("alice".into(), "bob".into(), 10, fee, 1, vec![], timestamp, vec![]),
            proposer_stake: 0,
        }
    }

    #[test]
    fn double_spend_conflict_picks_higher_fee() {
        let mut a = entry("a", 5, 100);
        a.tx.id = "a".into();
        let mut b = entry("b", 12, 100);
        b.tx.id = "b".into();

        let mut conflict = Conflict::new("c1".into(), ConflictType::DoubleSpend, vec![a, b]);
        resolve(&mut conflict, 1_000);

        assert_eq!(conflict.resolved_at, Some(1_000));
        let resolution = conflict.resolution.unwrap();
        assert_eq!(resolution.winning_id, "b");
        assert_eq!(resolution.winning_fee, Some(12));
    }

    #[test]
    fn resolution_is_idempotent() {
        let mut a = entry("a", 5, 100);
        a.tx.id = "a".into();
        let mut b = entry("b", 12, 100);
        b.tx.id = "b".into();
        let mut conflict = Conflict::new("c1".into(), ConflictType::DoubleSpend, vec![a, b]);

        resolve(&mut conflict, 1_000);
        let first = conflict.resolved_at;
        resolve(&mut conflict, 2_000);
        assert_eq!(conflict.resolved_at, first);
    }

    #[test]
    fn ordering_conflict_picks_earlier_timestamp() {
        let mut a = entry("a", 1, 200);
        a.tx.id = "a".into();
        let mut b = entry("b", 1, 100);
        b.tx.id = "b".into();
        let mut conflict = Conflict::new("c2".into(), ConflictType::Ordering, vec![a, b]);
        resolve(&mut conflict, 1_000);
        assert_eq!(conflict.resolution.unwrap().winning_id, "b");
    }
}
