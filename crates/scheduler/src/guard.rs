//! Deadline enforcement for a single task execution.

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use tracing::warn;

use crate::task::{Task, TaskError};

/// Races one task execution against an optional deadline.
///
/// With a timeout, the task is spawned onto the runtime and awaited for at
/// most the configured duration. If the deadline passes first the caller gets
/// [`TaskError::Timeout`] and the spawned task is detached: it keeps running
/// to completion and its outcome is discarded. Nothing is cancelled and no
/// resource held by the task is released early.
///
/// Without a timeout the task runs inline and its own outcome is
/// authoritative.
///
/// Clones share the abandonment counter.
#[derive(Debug, Clone, Default)]
pub struct TimeoutGuard {
    timeout: Option<Duration>,
    abandoned: Arc<AtomicUsize>,
}

impl TimeoutGuard {
    /// A zero duration is treated as no timeout.
    pub fn new(timeout: Option<Duration>) -> Self {
        Self {
            timeout: normalize(timeout),
            abandoned: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Same counter, different deadline.
    pub fn with_timeout(&self, timeout: Option<Duration>) -> Self {
        Self {
            timeout: normalize(timeout),
            abandoned: Arc::clone(&self.abandoned),
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Number of timed-out executions left running in the background.
    pub fn abandoned(&self) -> usize {
        self.abandoned.load(Ordering::Relaxed)
    }

    /// Execute `task` once under this guard's policy.
    pub async fn execute(&self, task: &Task) -> Result<(), TaskError> {
        match self.timeout {
            None => Self::inline(task).await,
            Some(limit) => self.race(task, limit).await,
        }
    }

    async fn inline(task: &Task) -> Result<(), TaskError> {
        // The closure itself may panic before it hands back a future.
        let future = match panic::catch_unwind(AssertUnwindSafe(|| task.invoke())) {
            Ok(future) => future,
            Err(payload) => return Err(TaskError::from_panic(payload)),
        };
        AssertUnwindSafe(future)
            .catch_unwind()
            .await
            .unwrap_or_else(|payload| Err(TaskError::from_panic(payload)))
    }

    async fn race(&self, task: &Task, limit: Duration) -> Result<(), TaskError> {
        // Invoke inside the spawned task so a panicking closure surfaces as a JoinError.
        let task = task.clone();
        let mut handle = tokio::spawn(async move { task.invoke().await });
        let raced = tokio::time::timeout(limit, &mut handle).await;

        match raced {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(join_err)) => Err(TaskError::from_join_error(join_err)),
            Err(_) => {
                // Dropping the handle detaches the task; it is not aborted.
                drop(handle);
                let abandoned = self.abandoned.fetch_add(1, Ordering::Relaxed) + 1;
                warn!(
                    timeout_ms = limit.as_millis() as u64,
                    abandoned,
                    "task exceeded its deadline and was abandoned while still running"
                );
                Err(TaskError::Timeout(limit))
            }
        }
    }
}

fn normalize(timeout: Option<Duration>) -> Option<Duration> {
    timeout.filter(|t| !t.is_zero())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicBool;

    fn sleeper(ms: u64) -> Task {
        Task::new(move || async move {
            tokio::time::sleep(Duration::from_millis(ms)).await;
            Ok(())
        })
    }

    #[test]
    fn zero_timeout_is_unbounded() {
        assert_eq!(TimeoutGuard::new(Some(Duration::ZERO)).timeout(), None);
        assert_eq!(TimeoutGuard::new(None).timeout(), None);
        assert_eq!(
            TimeoutGuard::new(Some(Duration::from_millis(5))).timeout(),
            Some(Duration::from_millis(5))
        );
    }

    #[tokio::test]
    async fn fast_task_beats_deadline() {
        let guard = TimeoutGuard::new(Some(Duration::from_millis(500)));
        assert_eq!(guard.execute(&sleeper(10)).await, Ok(()));
        assert_eq!(guard.abandoned(), 0);
    }

    #[tokio::test]
    async fn slow_task_times_out() {
        let limit = Duration::from_millis(50);
        let guard = TimeoutGuard::new(Some(limit));
        assert_eq!(
            guard.execute(&sleeper(1_000)).await,
            Err(TaskError::Timeout(limit))
        );
        assert_eq!(guard.abandoned(), 1);
    }

    #[tokio::test]
    async fn task_error_passes_through() {
        let guard = TimeoutGuard::new(Some(Duration::from_millis(500)));
        let task = Task::new(|| async { Err(TaskError::failed("said no")) });
        assert_eq!(guard.execute(&task).await, Err(TaskError::failed("said no")));
    }

    #[tokio::test]
    async fn no_timeout_lets_slow_task_finish() {
        let guard = TimeoutGuard::new(None);
        assert_eq!(guard.execute(&sleeper(100)).await, Ok(()));
    }

    #[tokio::test]
    async fn abandoned_task_keeps_running() {
        let finished = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&finished);
        let task = Task::new(move || {
            let flag = Arc::clone(&flag);
            async move {
                tokio::time::sleep(Duration::from_millis(100)).await;
                flag.store(true, Ordering::SeqCst);
                Ok(())
            }
        });

        let guard = TimeoutGuard::new(Some(Duration::from_millis(20)));
        assert!(guard.execute(&task).await.unwrap_err().is_timeout());
        assert!(!finished.load(Ordering::SeqCst));

        tokio::time::sleep(Duration::from_millis(300)).await;
        assert!(finished.load(Ordering::SeqCst), "abandoned task should finish on its own");
    }

    #[tokio::test]
    async fn panics_are_captured_with_and_without_timeout() {
        let task = Task::new(|| async {
            if true {
                panic!("kaboom");
            }
            Ok(())
        });

        let inline = TimeoutGuard::new(None).execute(&task).await;
        assert_eq!(inline, Err(TaskError::Panicked("kaboom".into())));

        let raced = TimeoutGuard::new(Some(Duration::from_secs(1)))
            .execute(&task)
            .await;
        assert_eq!(raced, Err(TaskError::Panicked("kaboom".into())));
    }

    #[tokio::test]
    async fn closure_panicking_before_its_future_is_captured() {
        let task = Task::new(|| -> std::future::Ready<Result<(), TaskError>> {
            panic!("before the future")
        });

        let inline = TimeoutGuard::new(None).execute(&task).await;
        assert_eq!(inline, Err(TaskError::Panicked("before the future".into())));

        let raced = TimeoutGuard::new(Some(Duration::from_secs(1)))
            .execute(&task)
            .await;
        assert_eq!(raced, Err(TaskError::Panicked("before the future".into())));
    }

    #[tokio::test]
    async fn sub_millisecond_timeout_still_fires() {
        let limit = Duration::from_micros(500);
        let guard = TimeoutGuard::new(Some(limit));
        assert_eq!(guard.execute(&sleeper(200)).await, Err(TaskError::Timeout(limit)));
    }

    #[test]
    fn clones_share_counter() {
        let guard = TimeoutGuard::new(Some(Duration::from_millis(1)));
        let other = guard.with_timeout(None);
        guard.abandoned.fetch_add(2, Ordering::Relaxed);
        assert_eq!(other.abandoned(), 2);
        assert_eq!(other.timeout(), None);
    }
}
