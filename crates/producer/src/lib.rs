//! CSV record producer (spec §6): turns a vehicle-telemetry CSV feed
//! into submissions against a [`jobsched_scheduler::Scheduler`].
//!
//! This replaces the illustrative source's System-V-message-queue
//! transport with direct, in-process submission — the scheduler itself
//! is the transport. A sentinel blank record ends the feed and
//! requests a graceful shutdown instead of being submitted as a job.

mod error;
mod record;

pub use error::ProducerError;
pub use record::VehicleRecord;

use jobsched_scheduler::{Priority, Scheduler, ShutdownMode};
use std::path::Path;
use std::time::Instant;

/// Counts of what happened while draining a CSV feed into a scheduler.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProducerStats {
    pub submitted: usize,
    pub sentinel_seen: bool,
}

/// Streams `path` as CSV and yields each parsed record in order.
///
/// The CSV file has no header row; columns are `vehicle_id`,
/// `timestamp_unix_s`, `speed_kph`, `engine_on`, `error_code`.
pub fn read_records(
    path: impl AsRef<Path>,
) -> csv::Result<impl Iterator<Item = csv::Result<VehicleRecord>>> {
    let reader = csv::ReaderBuilder::new().has_headers(false).from_path(path)?;
    Ok(reader.into_deserialize())
}

/// Reads `path` as a vehicle-telemetry CSV feed and submits one job
/// per non-sentinel record to `scheduler`.
///
/// `make_job` builds the closure run for a record; the crate imposes
/// no shape on it beyond `FnOnce() + Send + 'static`. Records with an
/// `error_code` submit at [`Priority::High`]; all others submit at
/// [`Priority::Normal`]. Every record is submitted with `run_at` set
/// to "now", since the source CSV format carries no future scheduling
/// hint beyond the telemetry timestamp itself.
///
/// On encountering the sentinel record (or reaching end of file
/// without one), requests a [`ShutdownMode::Graceful`] shutdown on
/// `scheduler` and returns. Does not wait for that shutdown to
/// complete — the caller decides whether and when to join it.
pub fn submit_from_csv<F, J>(
    scheduler: &Scheduler,
    path: impl AsRef<Path>,
    mut make_job: F,
) -> Result<ProducerStats, ProducerError>
where
    F: FnMut(&VehicleRecord) -> J,
    J: FnOnce() + Send + 'static,
{
    let mut stats = ProducerStats::default();

    for record in read_records(path)? {
        let record = record?;

        if record.is_sentinel() {
            stats.sentinel_seen = true;
            tracing::info!("sentinel record reached; requesting graceful shutdown");
            scheduler.shutdown(ShutdownMode::Graceful);
            return Ok(stats);
        }

        let priority = if record.error_code.is_some() { Priority::High } else { Priority::Normal };
        let job = make_job(&record);

        match scheduler.submit(job, Instant::now(), priority) {
            Ok(_) => stats.submitted += 1,
            Err(err) => return Err(ProducerError::Rejected(err)),
        }
    }

    if !stats.sentinel_seen {
        tracing::info!("end of CSV feed reached without a sentinel; requesting graceful shutdown");
        scheduler.shutdown(ShutdownMode::Graceful);
    }

    Ok(stats)
}
