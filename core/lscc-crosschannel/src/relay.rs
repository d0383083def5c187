//! Relay nodes and their buffered outboxes (spec section 4.3, "Relay
//! dispatch").

use crate::message::CrossShardMessage;
use parking_lot::Mutex;
use std::collections::VecDeque;

/// Messages drained from a relay's outbox per dispatch tick.
const DISPATCH_BATCH: usize = 10;

pub struct RelayNode {
    pub id: u32,
    outbox: Mutex<VecDeque<CrossShardMessage>>,
    capacity: usize,
    processed: Mutex<u64>,
    failed: Mutex<u64>,
}

impl RelayNode {
    pub fn new(id: u32, capacity: usize) -> Self {
        Self {
            id,
            outbox: Mutex::new(VecDeque::new()),
            capacity,
            processed: Mutex::new(0),
            failed: Mutex::new(0),
        }
    }

    /// Append to the buffered outbox. Returns `false` (relay_busy) if
    /// the buffer is already at capacity.
    pub fn enqueue(&self, message: CrossShardMessage) -> bool {
        let mut outbox = self.outbox.lock();
        if outbox.len() >= self.capacity {
            return false;
        }
        outbox.push_back(message);
        true
    }

    pub fn outbox_len(&self) -> usize {
        self.outbox.lock().len()
    }

    pub fn processed_count(&self) -> u64 {
        *self.processed.lock()
    }

    pub fn failed_count(&self) -> u64 {
        *self.failed.lock()
    }

    /// Drain up to `DISPATCH_BATCH` buffered messages, attempting
    /// `deliver` on each; successes increment `processed`, failures stay
    /// buffered (re-enqueued at the front) and increment `failed`.
    pub fn dispatch_tick<F>(&self, mut deliver: F)
    where
        F: FnMut(&CrossShardMessage) -> bool,
    {
        let mut batch = Vec::with_capacity(DISPATCH_BATCH);
        {
            let mut outbox = self.outbox.lock();
            for _ in 0..DISPATCH_BATCH {
                match outbox.pop_front() {
                    Some(m) => batch.push(m),
                    None => break,
                }
            }
        }

        for message in batch {
            if deliver(&message) {
                *self.processed.lock() += 1;
            } else {
                *self.failed.lock() += 1;
                self.outbox.lock().push_front(message);
            }
        }
    }
}
