use std::sync::Arc;
use std::time::Instant;

use batchrun_core::ExecutionMode;
use tracing::{error, info};

use crate::error::SchedulerError;
use crate::executor::{Executor, SerialExecutor, WorkerPool};
use crate::report;
use crate::state::RunState;
use crate::summary::RunSummary;
use crate::task::Task;

use super::Scheduler;

impl Scheduler {
    /// Run every task in submission order on the calling task.
    ///
    /// Task failures and timeouts are recorded in the results; the only error
    /// is a configuration error, raised before any task starts.
    pub async fn run_serial(&mut self) -> Result<RunSummary, SchedulerError> {
        self.run(ExecutionMode::Serial).await
    }

    /// Run tasks across the worker pool. Completion order is unspecified but
    /// `results()[i]` always belongs to task `i`.
    pub async fn run_parallel(&mut self) -> Result<RunSummary, SchedulerError> {
        self.run(ExecutionMode::Parallel).await
    }

    /// Run in the given mode. Overwrites the results of any previous run.
    pub async fn run(&mut self, mode: ExecutionMode) -> Result<RunSummary, SchedulerError> {
        self.config.validate()?;

        let executor: Box<dyn Executor> = match mode {
            ExecutionMode::Serial => Box::new(SerialExecutor),
            ExecutionMode::Parallel => Box::new(WorkerPool::new(self.config.worker_count)),
        };

        self.results.clear();
        self.summary = None;
        self.state = RunState::Running;

        let tasks: Arc<[Task]> = Arc::from(self.tasks.clone());
        info!(
            mode = %mode,
            executor = executor.name(),
            tasks = tasks.len(),
            workers = self.config.worker_count,
            timeout_ms = self.config.timeout_ms,
            "run started"
        );

        let started = Instant::now();
        let results = match executor.execute(tasks, &self.guard).await {
            Ok(results) => results,
            Err(e) => {
                error!(error = %e, "run aborted");
                self.state = RunState::Idle;
                return Err(e);
            }
        };

        let summary = RunSummary::from_results(mode, &results, started.elapsed());
        report::run_summary(&summary);

        self.results = results;
        self.summary = Some(summary.clone());
        self.state = RunState::Completed;
        Ok(summary)
    }
}
