//! Sync manager (spec section 4.3, "Sync manager").

use std::collections::HashMap;

const SYNC_BATCH: usize = 5;
/// Garbage-collect completed/failed requests after this many seconds.
const GC_AGE_SECS: u64 = 60 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    Pending,
    Completed,
    Failed,
}

#[derive(Debug, Clone)]
pub struct SyncRequest {
    pub id: String,
    pub shard_id: u32,
    pub from_height: u64,
    pub to_height: u64,
    pub state: SyncState,
    pub attempts: u32,
    pub created_at: u64,
    pub finished_at: Option<u64>,
}

impl SyncRequest {
    pub fn new(id: String, shard_id: u32, from_height: u64, to_height: u64, now: u64) -> Self {
        Self {
            id,
            shard_id,
            from_height,
            to_height,
            state: SyncState::Pending,
            attempts: 0,
            created_at: now,
            finished_at: None,
        }
    }
}

#[derive(Default)]
pub struct SyncManager {
    requests: HashMap<String, SyncRequest>,
    max_retries: u32,
}

impl SyncManager {
    pub fn new(max_retries: u32) -> Self {
        Self {
            requests: HashMap::new(),
            max_retries,
        }
    }

    pub fn submit(&mut self, request: SyncRequest) {
        self.requests.insert(request.id.clone(), request);
    }

    pub fn get(&self, id: &str) -> Option<&SyncRequest> {
        self.requests.get(id)
    }

    pub fn pending_count(&self) -> usize {
        self.requests.values().filter(|r| r.state == SyncState::Pending).count()
    }

    /// Process up to `SYNC_BATCH` pending requests this tick. `attempt`
    /// performs the actual block fetch/apply and reports success; a
    /// transient failure is retried up to `max_retries`, beyond which
    /// the request is marked `failed`.
    pub fn run_tick<F>(&mut self, now: u64, mut attempt: F)
    where
        F: FnMut(&SyncRequest) -> bool,
    {
        let pending_ids: Vec<String> = self
            .requests
            .values()
            .filter(|r| r.state == SyncState::Pending)
            .take(SYNC_BATCH)
            .map(|r| r.id.clone())
            .collect();

        for id in pending_ids {
            let Some(request) = self.requests.get_mut(&id) else { continue };
            request.attempts += 1;
            let ok = attempt(request);
            if ok {
                request.state = SyncState::Completed;
                request.finished_at = Some(now);
            } else if request.attempts >= self.max_retries {
                request.state = SyncState::Failed;
                request.finished_at = Some(now);
            }
        }
    }

    /// Garbage-collect completed/failed requests older than one hour.
    pub fn garbage_collect(&mut self, now: u64) -> usize {
        let before = self.requests.len();
        self.requests.retain(|_, r| match r.finished_at {
            Some(finished) if r.state != SyncState::Pending => now.saturating_sub(finished) <= GC_AGE_SECS,
            _ => true,
        });
        before - self.requests.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exhausted_retries_mark_request_failed() {
        let mut mgr = SyncManager::new(3);
        mgr.submit(SyncRequest::new("r1".into(), 0, 0, 5, 1_000));

        for tick in 0..3 {
            mgr.run_tick(1_000 + tick, |_| false);
        }
        assert_eq!(mgr.get("r1").unwrap().state, SyncState::Failed);
    }

    #[test]
    fn successful_attempt_completes_request() {
        let mut mgr = SyncManager::new(3);
        mgr.submit(SyncRequest::new("r1".into(), 0, 0, 5, 1_000));
        mgr.run_tick(1_000, |_| true);
        assert_eq!(mgr.get("r1").unwrap().state, SyncState::Completed);
    }

    #[test]
    fn gc_removes_old_completed_requests_after_an_hour() {
        let mut mgr = SyncManager::new(3);
        mgr.submit(SyncRequest::new("r1".into(), 0, 0, 5, 1_000));
        mgr.run_tick(1_000, |_| true);

        assert_eq!(mgr.garbage_collect(1_000 + 3_000), 0);
        assert_eq!(mgr.garbage_collect(1_000 + 3_601), 1);
        assert!(mgr.get("r1").is_none());
    }

    #[test]
    fn batch_size_caps_requests_processed_per_tick() {
        let mut mgr = SyncManager::new(3);
        for i in 0..8 {
            mgr.submit(SyncRequest::new(format!("r{i}"), 0, 0, 1, 1_000));
        }
        let mut processed = 0;
        mgr.run_tick(1_000, |_| {
            processed += 1;
            true
        });
        assert_eq!(processed, 5);
        assert_eq!(mgr.pending_count(), 3);
    }
}
