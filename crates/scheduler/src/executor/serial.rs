use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::error::SchedulerError;
use crate::guard::TimeoutGuard;
use crate::report;
use crate::result::TaskResult;
use crate::task::Task;

use super::{execute_task, Executor};

/// Executes tasks one after another on the calling task.
///
/// Each result is recorded before the next task starts.
#[derive(Debug, Clone, Copy, Default)]
pub struct SerialExecutor;

#[async_trait]
impl Executor for SerialExecutor {
    fn name(&self) -> &str {
        "serial"
    }

    async fn execute(
        &self,
        tasks: Arc<[Task]>,
        guard: &TimeoutGuard,
    ) -> Result<Vec<TaskResult>, SchedulerError> {
        let mut results = Vec::with_capacity(tasks.len());

        for (task_id, task) in tasks.iter().enumerate() {
            debug!(task_id, "starting task");
            let result = execute_task(task_id, task, guard).await;
            report::task_status(&result);
            results.push(result);
        }

        Ok(results)
    }
}
