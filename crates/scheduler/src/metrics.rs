//! Lock-consistent metrics snapshot (spec §4.6).

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// Atomic counters mutated outside the scheduler mutex, read
/// lock-free. `queued` is not one of these — it is read straight off
/// the heap under the mutex so it stays coherent with submissions.
#[derive(Default)]
pub struct MetricCounters {
    pub running: AtomicUsize,
    pub completed: AtomicU64,
    pub total_wait_ns: AtomicU64,
}

impl MetricCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn job_started(&self) {
        self.running.fetch_add(1, Ordering::AcqRel);
    }

    pub fn job_finished(&self, wait_ns: u64) {
        self.running.fetch_sub(1, Ordering::AcqRel);
        self.completed.fetch_add(1, Ordering::AcqRel);
        self.total_wait_ns.fetch_add(wait_ns, Ordering::AcqRel);
    }

    pub fn snapshot(&self, queued: usize) -> SchedulerMetrics {
        let completed = self.completed.load(Ordering::Acquire);
        let total_wait_ns = self.total_wait_ns.load(Ordering::Acquire);
        let avg_wait_ms = if completed == 0 {
            0.0
        } else {
            (total_wait_ns as f64 / completed as f64) / 1_000_000.0
        };

        SchedulerMetrics {
            queued,
            running: self.running.load(Ordering::Acquire),
            completed,
            avg_wait_ms,
        }
    }
}

/// A consistent tuple of queue depth, running-job count, completed-job
/// count, and average dispatch latency in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SchedulerMetrics {
    pub queued: usize,
    pub running: usize,
    pub completed: u64,
    pub avg_wait_ms: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_completed_jobs_yields_zero_avg_wait() {
        let counters = MetricCounters::new();
        let snap = counters.snapshot(0);
        assert_eq!(snap.avg_wait_ms, 0.0);
    }

    #[test]
    fn avg_wait_is_total_over_completed() {
        let counters = MetricCounters::new();
        counters.job_started();
        counters.job_finished(1_000_000); // 1ms
        counters.job_started();
        counters.job_finished(3_000_000); // 3ms

        let snap = counters.snapshot(0);
        assert_eq!(snap.completed, 2);
        assert_eq!(snap.running, 0);
        assert!((snap.avg_wait_ms - 2.0).abs() < 1e-9);
    }

    #[test]
    fn running_count_tracks_in_flight_jobs() {
        let counters = MetricCounters::new();
        counters.job_started();
        counters.job_started();
        assert_eq!(counters.snapshot(0).running, 2);
        counters.job_finished(0);
        assert_eq!(counters.snapshot(0).running, 1);
    }
}
