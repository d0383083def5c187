use criterion::{black_box, criterion_group, criterion_main, Criterion};
use lscc_core::clock::FakeClock;
use lscc_core::hash::{shard_of, Blake3Hash};
use lscc_shard::{ShardManager, ShardManagerConfig};
use lscc_state::{InMemoryStorage, Transaction};
use std::sync::Arc;

fn benchmark_shard_routing(c: &mut Criterion) {
    c.bench_function("shard_routing_lookup", |b| {
        b.iter(|| {
            for i in 0..1000 {
                let address = format!("address_{}", i);
                black_box(shard_of(&Blake3Hash, address.as_bytes(), 64));
            }
        });
    });
}

fn benchmark_submission_throughput(c: &mut Criterion) {
    let config = ShardManagerConfig {
        num_shards: 8,
        pool_max_size: 100_000,
        ..ShardManagerConfig::default()
    };
    let mgr = ShardManager::with_noop_router(config, Arc::new(InMemoryStorage::new()), Arc::new(FakeClock::new(1_000)));

    c.bench_function("submit_10k_transactions", |b| {
        b.iter(|| {
            for i in 0..10_000u64 {
                let tx = Transaction::new(format!("sender_{i}"), "receiver".into(), 1, 1, i, vec![], 1_000, vec![]);
                black_box(mgr.submit(tx).ok());
            }
        });
    });
}

criterion_group!(benches, benchmark_shard_routing, benchmark_submission_throughput);
criterion_main!(benches);
