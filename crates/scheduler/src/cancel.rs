//! Lazy cancellation set (spec §4.3).
//!
//! Cancellation does not search the heap. `cancel()` just records the
//! id here; a worker checks the set when it pops a job and discards a
//! match, draining the entry as it goes. Unknown or already-dispatched
//! ids are harmless no-ops, by design — see spec §3 "Cancellation set".

use std::collections::HashSet;

use crate::job::JobId;

#[derive(Default)]
pub struct CancelSet {
    cancelled: HashSet<JobId>,
}

impl CancelSet {
    pub fn new() -> Self {
        Self { cancelled: HashSet::new() }
    }

    pub fn mark(&mut self, id: JobId) {
        self.cancelled.insert(id);
    }

    /// Check-and-remove: true if `id` was cancelled. Called by a worker
    /// at pop-time so the set only ever holds entries for jobs still in
    /// flight or never dispatched.
    pub fn take(&mut self, id: JobId) -> bool {
        self.cancelled.remove(&id)
    }
}
