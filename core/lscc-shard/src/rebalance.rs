//! Load-balance score and the validator rebalancer (spec section 4.1,
//! "Rebalancer algorithm" and "Load-balance score").

use lscc_state::Validator;

/// Per-shard load sample used by the load-balance score and the
/// rebalance trigger.
#[derive(Debug, Clone, Copy)]
pub struct ShardLoad {
    pub shard_id: u32,
    pub tps: f64,
    pub pool_utilization: f64,
    pub validator_count: usize,
    pub is_healthy: bool,
}

impl ShardLoad {
    fn load(&self) -> f64 {
        self.tps + 100.0 * self.pool_utilization
    }
}

/// `score = max(0, 1 - stdev/mean)`; 1 when `mean == 0` or there's only
/// one shard.
pub fn load_balance_score(loads: &[ShardLoad]) -> f64 {
    if loads.len() <= 1 {
        return 1.0;
    }
    let values: Vec<f64> = loads.iter().map(ShardLoad::load).collect();
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    if mean == 0.0 {
        return 1.0;
    }
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
    let stdev = variance.sqrt();
    (1.0 - stdev / mean).max(0.0)
}

/// `true` iff the rebalancer should trigger on this tick (spec section
/// 4.1: score below `min_load_ratio`, an overloaded pool, a roster out
/// of bounds, or an unhealthy shard).
pub fn should_rebalance(
    loads: &[ShardLoad],
    min_load_ratio: f64,
    max_tx_pool_ratio: f64,
    min_validators: usize,
    max_validators: usize,
) -> bool {
    if load_balance_score(loads) < min_load_ratio {
        return true;
    }
    loads.iter().any(|l| {
        l.pool_utilization > max_tx_pool_ratio
            || l.validator_count < min_validators
            || l.validator_count > max_validators
            || !l.is_healthy
    })
}

/// Result of one rebalance event.
#[derive(Debug, Clone, Default)]
pub struct RebalanceResult {
    pub reassignments: Vec<(String, u32)>,
    pub total_validators: usize,
}

/// Repartition the full validator set evenly across `n_shards`, sorted
/// by stake descending, ties broken by address (spec section 4.1):
/// `n_total / n_shards` each, remainder spread across the first
/// `n_total mod n_shards` shards, lowest shard ids first.
pub fn rebalance(mut validators: Vec<Validator>, n_shards: u32) -> RebalanceResult {
    validators.sort_by(|a, b| b.stake.cmp(&a.stake).then_with(|| a.address.cmp(&b.address)));

    let total = validators.len();
    let n_shards = n_shards.max(1) as usize;
    let base = total / n_shards;
    let remainder = total % n_shards;

    let mut reassignments = Vec::with_capacity(total);
    let mut idx = 0;
    for shard_id in 0..n_shards {
        let quota = base + if shard_id < remainder { 1 } else { 0 };
        for _ in 0..quota {
            if idx >= validators.len() {
                break;
            }
            validators[idx].shard_id = shard_id as u32;
            reassignments.push((validators[idx].address.clone(), shard_id as u32));
            idx += 1;
        }
    }

    RebalanceResult {
        reassignments,
        total_validators: total,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load(shard_id: u32, tps: f64, util: f64) -> ShardLoad {
        ShardLoad {
            shard_id,
            tps,
            pool_utilization: util,
            validator_count: 5,
            is_healthy: true,
        }
    }

    #[test]
    fn single_shard_score_is_one() {
        assert_eq!(load_balance_score(&[load(0, 10.0, 0.1)]), 1.0);
    }

    #[test]
    fn uniform_load_scores_one() {
        let loads = vec![load(0, 10.0, 0.1), load(1, 10.0, 0.1), load(2, 10.0, 0.1)];
        assert!((load_balance_score(&loads) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn skewed_load_scores_below_one() {
        let loads = vec![load(0, 1000.0, 0.9), load(1, 1.0, 0.01)];
        assert!(load_balance_score(&loads) < 1.0);
    }

    #[test]
    fn rebalance_preserves_total_validator_count() {
        let validators: Vec<Validator> = (0..10)
            .map(|i| Validator::new(format!("v{i}"), vec![], i as u64, 0, 0))
            .collect();
        let result = rebalance(validators, 3);
        assert_eq!(result.total_validators, 10);
        assert_eq!(result.reassignments.len(), 10);

        let mut counts = [0u32; 3];
        for (_, shard_id) in &result.reassignments {
            counts[*shard_id as usize] += 1;
        }
        // 10 validators over 3 shards: 4, 3, 3.
        assert_eq!(counts, [4, 3, 3]);
    }

    #[test]
    fn should_rebalance_triggers_on_understaffed_shard() {
        let loads = vec![ShardLoad {
            shard_id: 0,
            tps: 1.0,
            pool_utilization: 0.1,
            validator_count: 1,
            is_healthy: true,
        }];
        assert!(should_rebalance(&loads, 0.0, 1.0, 3, 21));
    }
}
