//! Consensus coordinator (spec section 4.5): a purely observational
//! worker inside the shard manager that publishes a global status. It
//! never gates consensus rounds.

use crate::shard::{Shard, ShardStatus};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlobalStatus {
    Active,
    Syncing,
    Partial,
}

/// `active` if every shard is active; `syncing` if any shard is
/// `syncing` or fewer than half the shards are active; `partial`
/// otherwise.
pub fn global_status(shards: &[Arc<Shard>]) -> GlobalStatus {
    if shards.is_empty() {
        return GlobalStatus::Active;
    }

    let active = shards.iter().filter(|s| s.status() == ShardStatus::Active).count();
    let any_syncing = shards.iter().any(|s| s.status() == ShardStatus::Syncing);

    if active == shards.len() {
        GlobalStatus::Active
    } else if any_syncing || active * 2 < shards.len() {
        GlobalStatus::Syncing
    } else {
        GlobalStatus::Partial
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ShardManagerConfig;
    use lscc_core::clock::FakeClock;
    use lscc_pool::PoolConfig;
    use lscc_state::InMemoryStorage;
    use std::sync::Arc;

    fn shard(status: ShardStatus) -> Arc<Shard> {
        let cfg = ShardManagerConfig::default();
        let s = Arc::new(Shard::new(
            0,
            0,
            1,
            PoolConfig::default(),
            cfg.min_validators,
            cfg.staleness_limit_secs(),
            Arc::new(InMemoryStorage::new()),
            Arc::new(FakeClock::new(0)),
        ));
        s.set_status(status);
        s
    }

    #[test]
    fn all_active_is_global_active() {
        let shards = vec![shard(ShardStatus::Active), shard(ShardStatus::Active)];
        assert_eq!(global_status(&shards), GlobalStatus::Active);
    }

    #[test]
    fn any_syncing_is_global_syncing() {
        let shards = vec![shard(ShardStatus::Active), shard(ShardStatus::Syncing)];
        assert_eq!(global_status(&shards), GlobalStatus::Syncing);
    }

    #[test]
    fn majority_active_with_no_syncing_shard_is_global_partial() {
        let shards = vec![
            shard(ShardStatus::Active),
            shard(ShardStatus::Active),
            shard(ShardStatus::Inactive),
        ];
        assert_eq!(global_status(&shards), GlobalStatus::Partial);
    }

    #[test]
    fn minority_active_is_global_syncing() {
        let shards = vec![
            shard(ShardStatus::Active),
            shard(ShardStatus::Inactive),
            shard(ShardStatus::Inactive),
        ];
        assert_eq!(global_status(&shards), GlobalStatus::Syncing);
    }
}
