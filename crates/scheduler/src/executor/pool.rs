use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinSet;
use tracing::{debug, error, warn};

use crate::error::SchedulerError;
use crate::guard::TimeoutGuard;
use crate::report;
use crate::result::TaskResult;
use crate::task::Task;

use super::{execute_task, Executor};

type Intake = Arc<Mutex<mpsc::Receiver<usize>>>;

/// Fixed-size pool of concurrent workers.
///
/// Task indices are offered once each on a shared intake queue and the intake
/// is then closed. Each worker pulls indices until the intake is closed and
/// drained, publishing one [`TaskResult`] per index on a shared outtake
/// queue. A supervisor waits for every worker to exit before closing the
/// outtake, which tells the collector no more results will arrive. Results
/// are placed by task id, so completion order does not matter.
///
/// Only `min(worker_count, tasks.len())` workers are started.
#[derive(Debug, Clone, Copy)]
pub struct WorkerPool {
    worker_count: usize,
}

impl WorkerPool {
    pub fn new(worker_count: usize) -> Self {
        Self { worker_count }
    }

    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    /// Number of workers that will actually run for `task_count` tasks.
    pub fn effective_workers(&self, task_count: usize) -> usize {
        self.worker_count.min(task_count)
    }
}

#[async_trait]
impl Executor for WorkerPool {
    fn name(&self) -> &str {
        "worker-pool"
    }

    async fn execute(
        &self,
        tasks: Arc<[Task]>,
        guard: &TimeoutGuard,
    ) -> Result<Vec<TaskResult>, SchedulerError> {
        let task_count = tasks.len();
        let workers = self.effective_workers(task_count);
        if workers == 0 {
            return Ok(Vec::new());
        }

        let (intake_tx, intake_rx) = mpsc::channel::<usize>(task_count);
        let intake: Intake = Arc::new(Mutex::new(intake_rx));
        let (outtake_tx, mut outtake_rx) = mpsc::channel::<TaskResult>(task_count);

        let mut pool = JoinSet::new();
        for worker_id in 0..workers {
            pool.spawn(worker_loop(
                worker_id,
                Arc::clone(&tasks),
                Arc::clone(&intake),
                outtake_tx.clone(),
                guard.clone(),
            ));
        }
        debug!(workers, tasks = task_count, "worker pool started");

        // Offer every index exactly once, then close the intake.
        for task_id in 0..task_count {
            intake_tx.send(task_id).await.map_err(|_| {
                SchedulerError::Collection(format!(
                    "intake closed before task {task_id} could be offered"
                ))
            })?;
        }
        drop(intake_tx);

        let supervisor = tokio::spawn(supervise(pool, outtake_tx));

        let mut slots: Vec<Option<TaskResult>> = (0..task_count).map(|_| None).collect();
        while let Some(result) = outtake_rx.recv().await {
            let task_id = result.task_id();
            let slot = slots.get_mut(task_id).ok_or_else(|| {
                SchedulerError::Collection(format!("result for unknown task {task_id}"))
            })?;
            if slot.is_some() {
                return Err(SchedulerError::Collection(format!(
                    "duplicate result for task {task_id}"
                )));
            }
            report::task_status(&result);
            *slot = Some(result);
        }

        supervisor
            .await
            .map_err(|e| SchedulerError::Collection(format!("supervisor failed: {e}")))?;

        slots
            .into_iter()
            .enumerate()
            .map(|(task_id, slot)| {
                slot.ok_or_else(|| {
                    SchedulerError::Collection(format!("no result recorded for task {task_id}"))
                })
            })
            .collect()
    }
}

/// Pull indices until the intake is closed and empty.
async fn worker_loop(
    worker_id: usize,
    tasks: Arc<[Task]>,
    intake: Intake,
    outtake: mpsc::Sender<TaskResult>,
    guard: TimeoutGuard,
) {
    loop {
        let next = intake.lock().await.recv().await;
        let Some(task_id) = next else {
            break;
        };

        let result = execute_task(task_id, &tasks[task_id], &guard).await;
        if outtake.send(result).await.is_err() {
            warn!(worker_id, task_id, "collector went away; worker stopping");
            break;
        }
    }
    debug!(worker_id, "worker exiting");
}

/// Wait for every worker, then close the outtake by dropping the last sender.
async fn supervise(mut pool: JoinSet<()>, outtake: mpsc::Sender<TaskResult>) {
    while let Some(joined) = pool.join_next().await {
        if let Err(e) = joined {
            error!(error = %e, "worker terminated abnormally");
        }
    }
    drop(outtake);
}
