use std::time::Duration;

use batchrun_core::SchedulerConfig;
use tracing::{debug, info};

use crate::guard::TimeoutGuard;
use crate::result::TaskResult;
use crate::state::RunState;
use crate::summary::RunSummary;
use crate::task::Task;

/// The batch scheduler. Owns an ordered task list and the results of the most
/// recent run.
///
/// Tasks are identified by their 0-based submission index. Configuration and
/// the task list can only change between runs: every mutating method and
/// both run methods take `&mut self`.
#[derive(Debug)]
pub struct Scheduler {
    pub(super) config: SchedulerConfig,
    /// Submitted tasks, in submission order.
    pub(super) tasks: Vec<Task>,
    /// Results of the last completed run, indexed by task id.
    pub(super) results: Vec<TaskResult>,
    /// Summary of the last completed run.
    pub(super) summary: Option<RunSummary>,
    pub(super) state: RunState,
    /// Deadline policy; its abandonment counter spans the scheduler's lifetime.
    pub(super) guard: TimeoutGuard,
}

impl Scheduler {
    /// Create a scheduler with the given worker-pool size and no timeout.
    ///
    /// A zero pool size is accepted here but rejected when a run starts.
    pub fn new(worker_count: usize) -> Self {
        Self::from_config(SchedulerConfig::with_workers(worker_count))
    }

    pub fn from_config(config: SchedulerConfig) -> Self {
        let guard = TimeoutGuard::new(config.timeout());
        Self {
            config,
            tasks: Vec::new(),
            results: Vec::new(),
            summary: None,
            state: RunState::Idle,
            guard,
        }
    }

    /// Append one task. Its id is the current task count.
    pub fn add_task(&mut self, task: Task) -> usize {
        let task_id = self.tasks.len();
        self.tasks.push(task);
        task_id
    }

    /// Append tasks in order; same as calling [`add_task`](Self::add_task)
    /// for each.
    pub fn add_tasks<I>(&mut self, tasks: I)
    where
        I: IntoIterator<Item = Task>,
    {
        let before = self.tasks.len();
        self.tasks.extend(tasks);
        debug!(added = self.tasks.len() - before, total = self.tasks.len(), "tasks added");
    }

    /// Set the per-task timeout for subsequent runs. Zero disables it.
    pub fn set_timeout(&mut self, timeout: Duration) {
        self.config.set_timeout(Some(timeout));
        // The guard keeps the exact duration; the config only holds millis.
        self.guard = self.guard.with_timeout(Some(timeout));
    }

    /// Remove the per-task timeout for subsequent runs.
    pub fn clear_timeout(&mut self) {
        self.config.set_timeout(None);
        self.guard = self.guard.with_timeout(None);
    }

    /// Change the pool size for subsequent parallel runs.
    pub fn set_worker_count(&mut self, worker_count: usize) {
        self.config.worker_count = worker_count;
    }

    pub fn worker_count(&self) -> usize {
        self.config.worker_count
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.guard.timeout()
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// Results of the most recently completed run, indexed by task id.
    /// Empty before the first run and after [`reset`](Self::reset).
    pub fn results(&self) -> &[TaskResult] {
        &self.results
    }

    /// Summary of the most recently completed run.
    pub fn summary(&self) -> Option<&RunSummary> {
        self.summary.as_ref()
    }

    /// Timed-out tasks abandoned over the scheduler's lifetime. They may
    /// still be running.
    pub fn abandoned_tasks(&self) -> usize {
        self.guard.abandoned()
    }

    /// Clear tasks and results and return to [`RunState::Idle`].
    pub fn reset(&mut self) {
        info!(
            tasks = self.tasks.len(),
            results = self.results.len(),
            "scheduler reset"
        );
        self.tasks.clear();
        self.results.clear();
        self.summary = None;
        self.state = RunState::Idle;
    }
}
