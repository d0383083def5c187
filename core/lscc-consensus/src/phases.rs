//! The four LSCC phases, expressed as pure functions over explicit
//! inputs so each can be unit-tested directly against spec section 4.4
//! without standing up a full shard registry (`engine.rs` wires these
//! together against live `ConsensusShardView`s).

use crate::types::PhaseOutcomes;

/// Phase 1 -- layer consensus: a layer approves iff at least `ceil(2/3 *
/// n)` of its shards approve. No tie-break needed; the threshold is
/// strict (spec section 4.4).
pub fn layer_approves(votes: &[bool]) -> bool {
    if votes.is_empty() {
        return false;
    }
    let approving = votes.iter().filter(|v| **v).count();
    let required = (2 * votes.len() + 2) / 3; // ceil(2/3 * n)
    approving >= required
}

/// Phase 2 -- cross-channel consensus: a channel approves iff strictly
/// more than half of the layers it spans approved.
pub fn channel_approves(layer_approvals: &[bool]) -> bool {
    if layer_approvals.is_empty() {
        return false;
    }
    let approving = layer_approvals.iter().filter(|v| **v).count();
    approving * 2 > layer_approvals.len()
}

/// Global channel approval: every configured channel must approve (spec
/// section 4.4, phase 2).
pub fn global_channel_approval(channel_results: &[bool]) -> bool {
    !channel_results.is_empty() && channel_results.iter().all(|v| *v)
}

/// Phase 4 -- weighted commitment score (spec section 4.4, fixed
/// weights: changing them changes protocol semantics).
pub fn commit_score(outcomes: PhaseOutcomes) -> f64 {
    let mut score = 0.0;
    if outcomes.all_layers_approved {
        score += 0.4;
    }
    if outcomes.channel_approval {
        score += 0.3;
    }
    if outcomes.sync_success {
        score += 0.2;
    }
    if outcomes.network_healthy {
        score += 0.1;
    }
    score
}

/// `true` iff `score` clears the commit threshold. Scores compare with
/// `>=` (spec section 4.4, "Determinism & tie-breaks").
pub fn should_commit(score: f64, threshold: f64) -> bool {
    score >= threshold
}

/// `network_healthy` (spec section 4.4): fraction of healthy shards
/// among all registered, active shards is at least `health_ratio_min`.
pub fn network_healthy(healthy_count: usize, total_count: usize, health_ratio_min: f64) -> bool {
    if total_count == 0 {
        return false;
    }
    (healthy_count as f64 / total_count as f64) >= health_ratio_min
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layer_approval_requires_strict_two_thirds() {
        // 3 shards: need ceil(2) = 2 approvals.
        assert!(layer_approves(&[true, true, false]));
        assert!(!layer_approves(&[true, false, false]));
    }

    #[test]
    fn channel_approval_requires_strict_majority_of_layers() {
        assert!(channel_approves(&[true, true, false]));
        assert!(!channel_approves(&[true, false, false]));
        // Tie (1 of 2) is not a strict majority.
        assert!(!channel_approves(&[true, false]));
    }

    #[test]
    fn global_channel_approval_requires_every_channel() {
        assert!(global_channel_approval(&[true, true]));
        assert!(!global_channel_approval(&[true, false]));
    }

    /// Seed scenario 4 (spec section 8): layers approve (0.4) and sync
    /// succeeds (0.2) but channel approval and network health don't;
    /// score is 0.6, below the 0.7 threshold. Flipping network health
    /// alone brings it to exactly 0.7, which commits.
    #[test]
    fn commit_threshold_boundary_scenario() {
        let partial = PhaseOutcomes {
            all_layers_approved: true,
            channel_approval: false,
            sync_success: true,
            network_healthy: false,
        };
        let score = commit_score(partial);
        assert!((score - 0.6).abs() < 1e-9);
        assert!(!should_commit(score, 0.7));

        let healthy = PhaseOutcomes {
            network_healthy: true,
            ..partial
        };
        let score = commit_score(healthy);
        assert!((score - 0.7).abs() < 1e-9);
        assert!(should_commit(score, 0.7));
    }

    #[test]
    fn network_healthy_respects_ratio_floor() {
        assert!(network_healthy(2, 4, 0.5));
        assert!(!network_healthy(1, 4, 0.5));
        assert!(!network_healthy(0, 0, 0.5));
    }
}
