//! Worker thread body (spec §4.4).
//!
//! Every worker repeats: acquire the mutex, wait until a job is ready
//! or a stop condition fires, dispatch outside the lock, repeat. The
//! timed wait to the queue head's `run_at` is re-evaluated on every
//! loop iteration, so a submission that inserts a strictly earlier
//! head (which always signals the condvar) wakes a waiting worker
//! correctly — see spec §4.4 "Key subtlety".

use std::panic::AssertUnwindSafe;
use std::time::Instant;

use crate::job::Job;
use crate::scheduler::Inner;
use crate::shutdown::ShutdownMode;

pub(crate) fn worker_loop(inner: std::sync::Arc<Inner>) {
    loop {
        match next_job(&inner) {
            Some(job) => run_job(&inner, job),
            None => return,
        }
    }
}

/// Blocks until a job is ready to dispatch, or returns `None` once the
/// worker should exit. Never leaves a job popped without either
/// returning it or having discarded it as cancelled.
fn next_job(inner: &Inner) -> Option<Job> {
    let mut state = inner.state.lock();
    loop {
        if state.stop_workers {
            return None;
        }

        if state.queue.is_empty() {
            if !state.accepting && state.shutdown_mode == Some(ShutdownMode::Graceful) {
                state.stop_workers = true;
                inner.cv.notify_all();
                return None;
            }
            inner.cv.wait(&mut state);
            continue;
        }

        let run_at = state.queue.peek().expect("queue non-empty").run_at;
        let now = Instant::now();
        if run_at > now {
            inner.cv.wait_until(&mut state, run_at);
            continue;
        }

        let job = state.queue.pop().expect("queue non-empty");
        if state.cancelled.take(job.id) {
            tracing::debug!(job_id = job.id, "discarding cancelled job at dispatch time");
            continue;
        }

        inner.counters.job_started();
        return Some(job);
    }
}

fn run_job(inner: &Inner, job: Job) {
    let Job { id, enqueued_at, work, .. } = job;

    if let Err(payload) = std::panic::catch_unwind(AssertUnwindSafe(work)) {
        tracing::warn!(job_id = id, panic = %panic_message(&payload), "job closure panicked; worker continues");
    }

    let wait_ns = enqueued_at.elapsed().as_nanos() as u64;
    inner.counters.job_finished(wait_ns);
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("(non-string panic payload)")
}
