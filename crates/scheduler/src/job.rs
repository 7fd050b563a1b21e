//! Job identity, priority, and the ready-ordering total order.

use std::cmp::Ordering;
use std::time::Instant;

/// Unique job identifier, issued by a monotonically increasing counter
/// starting at 1. Never reused within a scheduler instance's lifetime.
pub type JobId = u64;

/// Priority level of a submitted job.
///
/// Ordered so `High > Normal > Low`; the derived `Ord` is used directly
/// by [`Job::cmp`] to prefer higher-priority jobs once `run_at` ties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Priority {
    Low,
    Normal,
    High,
}

/// A boxed unit of work submitted to the scheduler.
///
/// Takes no arguments and returns nothing: the scheduler imposes no
/// format on closures beyond `FnOnce() + Send + 'static`.
pub type Work = Box<dyn FnOnce() + Send + 'static>;

/// A job sitting in the priority queue.
///
/// `Ord` implements the total order from the ready-ordering rule:
/// earliest `run_at` first, then highest priority, then lowest id.
/// `BinaryHeap` is a max-heap, so the comparison is inverted on
/// `run_at` (and on `id`) to make the most eligible job compare
/// greatest.
pub struct Job {
    pub id: JobId,
    pub run_at: Instant,
    pub priority: Priority,
    pub enqueued_at: Instant,
    pub work: Work,
}

impl Job {
    pub fn new(id: JobId, run_at: Instant, priority: Priority, enqueued_at: Instant, work: Work) -> Self {
        Self { id, run_at, priority, enqueued_at, work }
    }
}

impl PartialEq for Job {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Job {}

impl PartialOrd for Job {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Job {
    fn cmp(&self, other: &Self) -> Ordering {
        // Earlier run_at must pop first from a max-heap, so the comparison
        // is reversed: an earlier `self` compares as Greater.
        other
            .run_at
            .cmp(&self.run_at)
            .then_with(|| self.priority.cmp(&other.priority))
            // Lower id first within a tie: reverse so the lower id is Greater.
            .then_with(|| other.id.cmp(&self.id))
    }
}
