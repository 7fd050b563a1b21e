use jobsched_scheduler::SubmitError;

#[derive(Debug, thiserror::Error)]
pub enum ProducerError {
    #[error("failed to read CSV record")]
    Csv(#[from] csv::Error),

    #[error("scheduler rejected submission")]
    Rejected(#[from] SubmitError),
}
