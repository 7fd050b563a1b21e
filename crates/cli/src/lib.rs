use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use jobsched_scheduler::{Priority, Scheduler, SchedulerMetrics, ShutdownMode};
use rand::Rng;
use serde::Serialize;
use std::ffi::OsString;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::time::{Duration, Instant};

#[derive(Debug, Parser)]
#[command(name = "jobsched-cli")]
#[command(about = "Priority-and-deadline job scheduler CLI")]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Drain a vehicle-telemetry CSV feed through a live scheduler.
    Run {
        #[arg(long, value_name = "FILE")]
        csv: PathBuf,
        #[arg(long, default_value_t = 4)]
        workers: usize,
        #[arg(long, default_value_t = 256)]
        queue_cap: usize,
    },
    /// Submit synthetic jobs to demonstrate ready-ordering and the
    /// worker pool's timed-wait behavior.
    Demo {
        #[arg(long, default_value_t = 4)]
        workers: usize,
        #[arg(long, default_value_t = 20)]
        jobs: usize,
    },
    /// Print CLI version.
    Version,
}

#[derive(Debug, Serialize)]
struct MetricsOutput {
    queued: usize,
    running: usize,
    completed: u64,
    avg_wait_ms: f64,
}

impl From<SchedulerMetrics> for MetricsOutput {
    fn from(m: SchedulerMetrics) -> Self {
        Self { queued: m.queued, running: m.running, completed: m.completed, avg_wait_ms: m.avg_wait_ms }
    }
}

pub fn run<I, T>(args: I) -> Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = Cli::parse_from(args);

    match cli.command {
        Commands::Run { csv, workers, queue_cap } => run_csv(&csv, workers, queue_cap),
        Commands::Demo { workers, jobs } => run_demo(workers, jobs),
        Commands::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn non_zero(value: usize, name: &str) -> Result<NonZeroUsize> {
    NonZeroUsize::new(value).with_context(|| format!("--{name} must be greater than zero"))
}

fn run_csv(csv_path: &PathBuf, workers: usize, queue_cap: usize) -> Result<()> {
    if !csv_path.exists() {
        anyhow::bail!("file does not exist: {}", csv_path.display());
    }

    let scheduler =
        Scheduler::new(non_zero(workers, "workers")?, non_zero(queue_cap, "queue-cap")?);

    let stats = jobsched_producer::submit_from_csv(&scheduler, csv_path, |record| {
        let vehicle_id = record.vehicle_id.clone();
        let timestamp = record.timestamp_unix_s;
        move || {
            tracing::info!(vehicle_id = %vehicle_id, timestamp_unix_s = timestamp, "dispatched telemetry record");
        }
    })
    .context("failed to drain CSV feed into scheduler")?;

    tracing::info!(submitted = stats.submitted, sentinel_seen = stats.sentinel_seen, "CSV feed drained");

    // submit_from_csv's own shutdown call has already joined every
    // worker by the time it returns, so the metrics snapshot below
    // reflects a fully quiesced scheduler.
    let metrics = MetricsOutput::from(scheduler.metrics());
    println!("{}", serde_json::to_string_pretty(&metrics)?);

    Ok(())
}

fn run_demo(workers: usize, jobs: usize) -> Result<()> {
    let scheduler = Scheduler::new(non_zero(workers, "workers")?, non_zero(jobs.max(1), "jobs")?);

    let priorities = [Priority::Low, Priority::Normal, Priority::High];
    let mut rng = rand::thread_rng();
    let t0 = Instant::now();

    for i in 0..jobs {
        let delay_ms = rng.gen_range(0..200);
        let priority = priorities[rng.gen_range(0..priorities.len())];
        let run_at = t0 + Duration::from_millis(delay_ms);

        scheduler
            .submit(
                move || {
                    tracing::info!(job = i, ?priority, delay_ms, "demo job ran");
                },
                run_at,
                priority,
            )
            .context("demo submission rejected")?;
    }

    scheduler.shutdown(ShutdownMode::Graceful);

    let metrics = MetricsOutput::from(scheduler.metrics());
    println!("{}", serde_json::to_string_pretty(&metrics)?);

    Ok(())
}
