//! Retention-window eviction of confirmed transactions (spec section 4.2:
//! "Cleanup worker" -- evict confirmed entries older than the retention
//! window, 24 hours by default).

/// Default retention window for confirmed entries, in seconds.
pub const DEFAULT_RETENTION_SECS: u64 = 24 * 60 * 60;

/// `true` if an entry confirmed at `confirmed_at` should be aged out given
/// the current time and retention window.
pub fn should_evict(confirmed_at: u64, now: u64, retention_secs: u64) -> bool {
    now.saturating_sub(confirmed_at) > retention_secs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entries_within_window_are_kept() {
        assert!(!should_evict(1_000, 1_000 + DEFAULT_RETENTION_SECS - 1, DEFAULT_RETENTION_SECS));
    }

    #[test]
    fn entries_past_window_are_evicted() {
        assert!(should_evict(1_000, 1_000 + DEFAULT_RETENTION_SECS + 1, DEFAULT_RETENTION_SECS));
    }
}
