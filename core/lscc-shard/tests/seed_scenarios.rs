//! Seed scenarios 1 and 2 from the core specification's testable
//! properties section, exercised against `ShardManager` directly (the
//! full four-phase consensus engine lives in `lscc-consensus`; here a
//! "round" is block assembly + commit, which is all these two scenarios
//! depend on).

use lscc_core::clock::FakeClock;
use lscc_shard::{ShardManager, ShardManagerConfig, SubmitOutcome};
use lscc_state::{Block, InMemoryStorage, Transaction};
use std::sync::Arc;

fn tx(sender: &str, receiver: &str, nonce: u64) -> Transaction {
    Transaction::new(sender.into(), receiver.into(), 1, nonce, nonce, vec![], 1_000, vec![])
}

#[test]
fn single_shard_happy_path() {
    let config = ShardManagerConfig {
        num_shards: 1,
        ..ShardManagerConfig::default()
    };
    let mgr = ShardManager::with_noop_router(
        config,
        Arc::new(InMemoryStorage::new()),
        Arc::new(FakeClock::new(1_000)),
    );

    for i in 0..100u64 {
        let outcome = mgr.submit(tx(&format!("sender_{i}"), "receiver", i)).unwrap();
        assert_eq!(outcome, SubmitOutcome::Accepted { shard_id: 0 });
    }

    let shard = mgr.get_shard(0).unwrap();
    assert_eq!(shard.pool_stats().pending, 100);

    let selected = shard.select_block_candidate(1000);
    assert_eq!(selected.len(), 100);

    let block = Block::new(0, 1_000, "genesis".into(), 0, "v1".into(), 1_000_000, 0, selected);
    shard.commit_block(block).unwrap();

    let stats = shard.pool_stats();
    assert_eq!(stats.confirmed, 100);
    assert_eq!(stats.pending, 0);
    assert_eq!(stats.processing, 0);
    assert_eq!(shard.height(), 1);
}

#[test]
fn cross_shard_routing_promotes_on_arrival_at_home_shard() {
    let config = ShardManagerConfig {
        num_shards: 4,
        ..ShardManagerConfig::default()
    };
    let mgr = ShardManager::with_noop_router(
        config,
        Arc::new(InMemoryStorage::new()),
        Arc::new(FakeClock::new(1_000)),
    );

    // Find a (sender, receiver) pair that hashes to different shards.
    let candidates = ["a", "b", "c", "d", "e", "f", "g", "h"];
    let mut sender = None;
    let mut receiver = None;
    let mut dest_shard = None;
    for s in candidates {
        let shard_s = lscc_core::hash::shard_of(&lscc_core::hash::Blake3Hash, s.as_bytes(), 4);
        for r in candidates {
            let shard_r = lscc_core::hash::shard_of(&lscc_core::hash::Blake3Hash, r.as_bytes(), 4);
            if shard_s != shard_r {
                sender = Some(s);
                receiver = Some(r);
                dest_shard = Some(shard_r);
                break;
            }
        }
        if sender.is_some() {
            break;
        }
    }
    let (sender, receiver, dest_shard) = (sender.unwrap(), receiver.unwrap(), dest_shard.unwrap());

    // The noop router always reports queued_for_retry; simulate delivery
    // to the destination shard's inbox directly, as the communicator
    // would once it drains its retry queue.
    let outgoing = tx(sender, receiver, 1);
    let dest = mgr.get_shard(dest_shard).unwrap();
    dest.receive_cross_shard_transaction(outgoing).unwrap();
    assert_eq!(dest.pool_stats().cross_shard, 1);

    dest.run_processor_tick();
    assert_eq!(dest.pool_stats().pending, 1);
    assert_eq!(dest.pool_stats().cross_shard, 0);
}
