//! Typed rejection kinds for the submission and cancellation surfaces
//! (spec §7). The reference contract permits collapsing submit
//! rejections to one kind; this crate keeps them distinct (see
//! DESIGN.md) since nothing in the testable properties depends on the
//! coarser shape.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SubmitError {
    #[error("scheduler is no longer accepting submissions")]
    NotAccepting,

    #[error("queue is at capacity ({max_queue_size} jobs)")]
    QueueFull { max_queue_size: usize },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CancelError {
    #[error("scheduler is no longer accepting cancellations")]
    NotAccepting,
}
