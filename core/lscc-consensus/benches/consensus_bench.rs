use criterion::{black_box, criterion_group, criterion_main, Criterion};
use lscc_consensus::{Consensus, ConsensusShardView, LsccConsensusConfig, LsccEngine};
use lscc_state::Block;
use std::sync::Arc;

struct AlwaysHealthy(u32);

impl ConsensusShardView for AlwaysHealthy {
    fn id(&self) -> u32 {
        self.0
    }
    fn last_block(&self) -> Option<Block> {
        None
    }
    fn is_healthy(&self) -> bool {
        true
    }
    fn has_transaction(&self, _tx_id: &str) -> bool {
        true
    }
}

fn benchmark_four_phase_round(c: &mut Criterion) {
    let engine = LsccEngine::new(LsccConsensusConfig::default(), None);
    for id in 0..4u32 {
        engine.register_shard(Arc::new(AlwaysHealthy(id)));
    }

    c.bench_function("lscc_round_single_shard", |b| {
        b.iter(|| {
            let block = Block::new(0, 1_000, "genesis".into(), 0, "v1".into(), 1_000_000, 0, vec![]);
            black_box(engine.evaluate(&block).ok());
        });
    });
}

criterion_group!(benches, benchmark_four_phase_round);
criterion_main!(benches);
