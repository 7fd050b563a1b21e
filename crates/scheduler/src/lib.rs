//! A thread-safe, priority-and-deadline job scheduler.
//!
//! A fixed-size pool of worker threads dequeues jobs from a shared,
//! time-ordered priority queue. Jobs carry an earliest-start deadline
//! (`run_at`) and a priority (`Low`/`Normal`/`High`); the queue is
//! ordered earliest-`run_at`-first, with priority and then submission
//! order breaking ties (see `Job`'s `Ord` impl). Submission applies
//! bounded-queue backpressure; cancellation is lazy and only effective
//! before a job is popped; shutdown has two disciplines — `Graceful`
//! drains the queue, `Immediate` drops it.
//!
//! # Example
//!
//! ```
//! use jobsched_scheduler::{Priority, Scheduler, ShutdownMode};
//! use std::num::NonZeroUsize;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use std::sync::Arc;
//! use std::time::Instant;
//!
//! let scheduler = Scheduler::new(NonZeroUsize::new(4).unwrap(), NonZeroUsize::new(256).unwrap());
//!
//! let completed = Arc::new(AtomicUsize::new(0));
//! let c = Arc::clone(&completed);
//! scheduler
//!     .submit(move || { c.fetch_add(1, Ordering::SeqCst); }, Instant::now(), Priority::High)
//!     .expect("scheduler is accepting");
//!
//! scheduler.shutdown(ShutdownMode::Graceful);
//! assert_eq!(completed.load(Ordering::SeqCst), 1);
//! ```

mod cancel;
mod error;
mod job;
mod metrics;
mod queue;
mod scheduler;
mod shutdown;
mod worker;

pub use error::{CancelError, SubmitError};
pub use job::{JobId, Priority};
pub use metrics::SchedulerMetrics;
pub use scheduler::Scheduler;
pub use shutdown::ShutdownMode;
