//! Strategies for executing a batch of tasks.
//!
//! - `serial`: one task at a time, in submission order
//! - `pool`: a fixed pool of workers fed from a shared index queue

mod pool;
mod serial;

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::SchedulerError;
use crate::guard::TimeoutGuard;
use crate::result::{Stopwatch, TaskResult};
use crate::task::Task;

pub use pool::WorkerPool;
pub use serial::SerialExecutor;

/// Runs every task of a batch exactly once.
///
/// Implementations must return one result per task, with
/// `results[i].task_id() == i`, and must not stop early when a task fails.
#[async_trait]
pub trait Executor: Send + Sync {
    /// Human-readable name for logging.
    fn name(&self) -> &str;

    async fn execute(
        &self,
        tasks: Arc<[Task]>,
        guard: &TimeoutGuard,
    ) -> Result<Vec<TaskResult>, SchedulerError>;
}

/// Time a single task under `guard` and record its outcome.
pub(crate) async fn execute_task(task_id: usize, task: &Task, guard: &TimeoutGuard) -> TaskResult {
    let watch = Stopwatch::start();
    let outcome = guard.execute(task).await;
    watch.finish(task_id, task.label(task_id), outcome)
}
