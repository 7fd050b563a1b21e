//! The public scheduler facade (spec §6) and the shared state it
//! protects with a single mutex and a single condition variable
//! (spec §5).

use std::num::NonZeroUsize;
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Instant;

use parking_lot::{Condvar, Mutex};

use crate::cancel::CancelSet;
use crate::error::{CancelError, SubmitError};
use crate::job::{Job, JobId, Priority, Work};
use crate::metrics::{MetricCounters, SchedulerMetrics};
use crate::queue::JobQueue;
use crate::shutdown::ShutdownMode;
use crate::worker::worker_loop;

/// Everything guarded by the scheduler's single mutex: the queue, the
/// cancellation set, and the state-machine flags from spec §3.
pub(crate) struct State {
    pub(crate) queue: JobQueue,
    pub(crate) cancelled: CancelSet,
    pub(crate) accepting: bool,
    pub(crate) stop_workers: bool,
    pub(crate) shutdown_mode: Option<ShutdownMode>,
    next_id: JobId,
}

/// Shared between the `Scheduler` handle and every worker thread via
/// `Arc`. Counters are atomic so metric reads never need the mutex.
pub(crate) struct Inner {
    pub(crate) state: Mutex<State>,
    pub(crate) cv: Condvar,
    pub(crate) counters: MetricCounters,
    pub(crate) max_queue_size: usize,
}

/// A fixed-size pool of worker threads dequeuing jobs from a shared,
/// time-ordered priority queue.
///
/// See `spec.md` / `SPEC_FULL.md` for the full contract. Dropping a
/// `Scheduler` that was never explicitly shut down requests an
/// `Immediate` shutdown, so no worker thread ever outlives its
/// scheduler.
pub struct Scheduler {
    inner: Arc<Inner>,
    workers: Mutex<Vec<JoinHandle<()>>>,
}

impl Scheduler {
    /// Spawn `worker_count` worker threads. The scheduler is
    /// immediately in the `Running` state and accepts submissions.
    pub fn new(worker_count: NonZeroUsize, max_queue_size: NonZeroUsize) -> Self {
        let inner = Arc::new(Inner {
            state: Mutex::new(State {
                queue: JobQueue::new(),
                cancelled: CancelSet::new(),
                accepting: true,
                stop_workers: false,
                shutdown_mode: None,
                next_id: 1,
            }),
            cv: Condvar::new(),
            counters: MetricCounters::new(),
            max_queue_size: max_queue_size.get(),
        });

        let workers = (0..worker_count.get())
            .map(|idx| {
                let inner = Arc::clone(&inner);
                std::thread::Builder::new()
                    .name(format!("jobsched-worker-{idx}"))
                    .spawn(move || worker_loop(inner))
                    .expect("failed to spawn scheduler worker thread")
            })
            .collect();

        tracing::info!(
            worker_count = worker_count.get(),
            max_queue_size = max_queue_size.get(),
            "scheduler started"
        );

        Self { inner, workers: Mutex::new(workers) }
    }

    /// Submit a job with an earliest-run time and a priority (spec
    /// §4.2). `run_at` in the past means "as soon as possible".
    pub fn submit(
        &self,
        work: impl FnOnce() + Send + 'static,
        run_at: Instant,
        priority: Priority,
    ) -> Result<JobId, SubmitError> {
        self.submit_boxed(Box::new(work), run_at, priority)
    }

    fn submit_boxed(
        &self,
        work: Work,
        run_at: Instant,
        priority: Priority,
    ) -> Result<JobId, SubmitError> {
        let mut state = self.inner.state.lock();
        if !state.accepting {
            return Err(SubmitError::NotAccepting);
        }
        if state.queue.len() >= self.inner.max_queue_size {
            return Err(SubmitError::QueueFull { max_queue_size: self.inner.max_queue_size });
        }

        let id = state.next_id;
        state.next_id += 1;
        let enqueued_at = Instant::now();
        state.queue.push(Job::new(id, run_at, priority, enqueued_at, work));
        drop(state);

        self.inner.cv.notify_one();
        tracing::debug!(job_id = id, ?priority, "job submitted");
        Ok(id)
    }

    /// Mark a job as cancelled (spec §4.3). Effective only if the job
    /// has not yet begun executing; unknown or already-dispatched ids
    /// are silently ineffective, not errors.
    pub fn cancel(&self, id: JobId) -> Result<(), CancelError> {
        let mut state = self.inner.state.lock();
        if !state.accepting {
            return Err(CancelError::NotAccepting);
        }
        state.cancelled.mark(id);
        Ok(())
    }

    /// Request a shutdown under the given discipline and block until
    /// every worker thread has been joined (spec §4.5). Idempotent:
    /// a second call is a safe no-op (or, for `Immediate` following a
    /// `Graceful` call still draining, escalates by discarding the
    /// remaining queue).
    pub fn shutdown(&self, mode: ShutdownMode) {
        {
            let mut state = self.inner.state.lock();
            state.accepting = false;

            match mode {
                ShutdownMode::Graceful => {
                    // Never downgrade an in-progress Immediate shutdown.
                    if state.shutdown_mode != Some(ShutdownMode::Immediate) {
                        state.shutdown_mode = Some(ShutdownMode::Graceful);
                    }
                    if state.queue.is_empty() {
                        state.stop_workers = true;
                    }
                }
                ShutdownMode::Immediate => {
                    state.shutdown_mode = Some(ShutdownMode::Immediate);
                    let dropped = state.queue.clear();
                    if dropped > 0 {
                        tracing::info!(dropped, "immediate shutdown dropped queued jobs");
                    }
                    state.stop_workers = true;
                }
            }

            self.inner.cv.notify_all();
        }

        self.join_workers();
    }

    fn join_workers(&self) {
        let mut workers = self.workers.lock();
        for handle in workers.drain(..) {
            let _ = handle.join();
        }
    }

    /// A consistent snapshot of queue depth, running-job count,
    /// completed-job count, and average dispatch latency (spec §4.6).
    pub fn metrics(&self) -> SchedulerMetrics {
        let queued = self.inner.state.lock().queue.len();
        self.inner.counters.snapshot(queued)
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        self.shutdown(ShutdownMode::Immediate);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn n(v: usize) -> NonZeroUsize {
        NonZeroUsize::new(v).unwrap()
    }

    #[test]
    fn submit_assigns_strictly_increasing_ids() {
        let s = Scheduler::new(n(1), n(16));
        let id1 = s.submit(|| {}, Instant::now(), Priority::Normal).unwrap();
        let id2 = s.submit(|| {}, Instant::now(), Priority::Normal).unwrap();
        let id3 = s.submit(|| {}, Instant::now(), Priority::Normal).unwrap();
        assert!(id1 < id2 && id2 < id3);
        s.shutdown(ShutdownMode::Immediate);
    }

    #[test]
    fn backpressure_rejects_beyond_capacity() {
        // Single worker blocked on a barrier job so the queue fills up.
        let s = Scheduler::new(n(1), n(2));
        let barrier = Arc::new(std::sync::Barrier::new(2));
        let b = Arc::clone(&barrier);
        s.submit(move || { b.wait(); }, Instant::now(), Priority::Normal).unwrap();
        std::thread::sleep(Duration::from_millis(50));

        s.submit(|| {}, Instant::now(), Priority::Normal).unwrap();
        s.submit(|| {}, Instant::now(), Priority::Normal).unwrap();
        let rejected = s.submit(|| {}, Instant::now(), Priority::Normal);
        assert!(matches!(rejected, Err(SubmitError::QueueFull { .. })));

        barrier.wait();
        s.shutdown(ShutdownMode::Graceful);
    }

    #[test]
    fn cancel_before_dispatch_prevents_execution() {
        let s = Scheduler::new(n(1), n(8));
        let counter = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&counter);
        let run_at = Instant::now() + Duration::from_millis(100);
        let id = s.submit(move || { c.fetch_add(1, Ordering::SeqCst); }, run_at, Priority::Normal).unwrap();

        s.cancel(id).unwrap();
        std::thread::sleep(Duration::from_millis(200));
        assert_eq!(counter.load(Ordering::SeqCst), 0);
        s.shutdown(ShutdownMode::Graceful);
    }

    #[test]
    fn graceful_shutdown_drains_queue() {
        let s = Scheduler::new(n(1), n(8));
        let counter = Arc::new(AtomicUsize::new(0));
        for _ in 0..2 {
            let c = Arc::clone(&counter);
            s.submit(move || { c.fetch_add(1, Ordering::SeqCst); }, Instant::now(), Priority::Normal).unwrap();
        }
        s.shutdown(ShutdownMode::Graceful);
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn immediate_shutdown_drops_future_jobs() {
        let s = Scheduler::new(n(1), n(8));
        let counter = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&counter);
        let run_at = Instant::now() + Duration::from_millis(300);
        s.submit(move || { c.fetch_add(1, Ordering::SeqCst); }, run_at, Priority::Normal).unwrap();

        s.shutdown(ShutdownMode::Immediate);
        std::thread::sleep(Duration::from_millis(400));
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn submit_after_shutdown_is_rejected() {
        let s = Scheduler::new(n(1), n(8));
        s.shutdown(ShutdownMode::Graceful);
        let result = s.submit(|| {}, Instant::now(), Priority::Normal);
        assert!(matches!(result, Err(SubmitError::NotAccepting)));
    }

    #[test]
    fn cancel_after_shutdown_is_refused() {
        let s = Scheduler::new(n(1), n(8));
        let run_at = Instant::now() + Duration::from_secs(10);
        let id = s.submit(|| {}, run_at, Priority::Normal).unwrap();
        s.shutdown(ShutdownMode::Immediate);
        assert!(matches!(s.cancel(id), Err(CancelError::NotAccepting)));
    }

    #[test]
    fn repeated_shutdown_is_idempotent() {
        let s = Scheduler::new(n(2), n(8));
        s.shutdown(ShutdownMode::Graceful);
        // Second call must not hang or panic even though workers are already joined.
        s.shutdown(ShutdownMode::Graceful);
        s.shutdown(ShutdownMode::Immediate);
    }

    #[test]
    fn immediate_escalates_over_in_progress_graceful() {
        // A long-running job holds the single worker; a second job sits
        // queued. A concurrent Graceful shutdown request is blocked
        // joining that worker; Immediate escalates and drops the queued
        // job before the worker ever gets to it.
        let s = Arc::new(Scheduler::new(n(1), n(8)));
        let barrier = Arc::new(std::sync::Barrier::new(2));
        let b = Arc::clone(&barrier);
        s.submit(move || { b.wait(); }, Instant::now(), Priority::Normal).unwrap();
        std::thread::sleep(Duration::from_millis(50));

        let counter = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&counter);
        s.submit(move || { c.fetch_add(1, Ordering::SeqCst); }, Instant::now(), Priority::Normal).unwrap();

        let s_graceful = Arc::clone(&s);
        let graceful_thread = std::thread::spawn(move || {
            s_graceful.shutdown(ShutdownMode::Graceful);
        });

        // Give the Graceful request time to register (accepting = false,
        // shutdown_mode = Graceful, still blocked joining the busy worker).
        std::thread::sleep(Duration::from_millis(50));
        s.shutdown(ShutdownMode::Immediate);

        // Release the in-flight barrier job so the worker can observe
        // stop_workers and exit; both shutdown calls then return.
        barrier.wait();
        graceful_thread.join().unwrap();

        assert_eq!(counter.load(Ordering::SeqCst), 0, "queued job must be dropped by the escalation");
    }

    #[test]
    fn panicking_job_does_not_stop_subsequent_dispatch() {
        let s = Scheduler::new(n(1), n(8));
        s.submit(|| panic!("boom"), Instant::now(), Priority::Normal).unwrap();

        let counter = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&counter);
        s.submit(move || { c.fetch_add(1, Ordering::SeqCst); }, Instant::now(), Priority::Normal).unwrap();

        s.shutdown(ShutdownMode::Graceful);
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn metrics_reflect_completed_jobs() {
        let s = Scheduler::new(n(2), n(16));
        for _ in 0..5 {
            s.submit(|| {}, Instant::now(), Priority::Normal).unwrap();
        }
        s.shutdown(ShutdownMode::Graceful);

        let metrics = s.metrics();
        assert_eq!(metrics.completed, 5);
        assert_eq!(metrics.running, 0);
        assert_eq!(metrics.queued, 0);
    }
}
