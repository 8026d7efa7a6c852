use batchrun_core::ConfigError;
use thiserror::Error;

/// Run-level errors. Individual task failures are never reported here; they
/// are recorded in each [`TaskResult`](crate::TaskResult).
#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("invalid scheduler configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("result collection failed: {0}")]
    Collection(String),
}
