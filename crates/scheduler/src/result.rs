use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::task::{ErrorKind, TaskError};

/// Outcome of executing one task during one run.
///
/// Immutable once recorded. `duration` is measured on a monotonic clock and
/// covers only the task's own execution, never time spent queued.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskResult {
    task_id: usize,
    name: String,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
    duration: Duration,
    error: Option<TaskError>,
    success: bool,
}

impl TaskResult {
    /// Build a result from a start timestamp and measured duration.
    pub fn new(
        task_id: usize,
        name: impl Into<String>,
        start_time: DateTime<Utc>,
        duration: Duration,
        error: Option<TaskError>,
    ) -> Self {
        let end_time = start_time
            + chrono::Duration::from_std(duration).unwrap_or_else(|_| chrono::Duration::zero());
        Self {
            task_id,
            name: name.into(),
            start_time,
            end_time,
            duration,
            success: error.is_none(),
            error,
        }
    }

    /// Submission index of the task.
    pub fn task_id(&self) -> usize {
        self.task_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }

    pub fn end_time(&self) -> DateTime<Utc> {
        self.end_time
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn error(&self) -> Option<&TaskError> {
        self.error.as_ref()
    }

    pub fn error_kind(&self) -> Option<ErrorKind> {
        self.error.as_ref().map(TaskError::kind)
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn is_timeout(&self) -> bool {
        self.error.as_ref().is_some_and(TaskError::is_timeout)
    }
}

/// Captures wall-clock and monotonic start points for one execution.
pub(crate) struct Stopwatch {
    started_at: DateTime<Utc>,
    started: Instant,
}

impl Stopwatch {
    pub(crate) fn start() -> Self {
        Self {
            started_at: Utc::now(),
            started: Instant::now(),
        }
    }

    pub(crate) fn finish(
        self,
        task_id: usize,
        name: String,
        outcome: Result<(), TaskError>,
    ) -> TaskResult {
        TaskResult::new(
            task_id,
            name,
            self.started_at,
            self.started.elapsed(),
            outcome.err(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_follows_error() {
        let now = Utc::now();
        let ok = TaskResult::new(0, "a", now, Duration::from_millis(5), None);
        assert!(ok.is_success());
        assert_eq!(ok.error_kind(), None);

        let failed = TaskResult::new(1, "b", now, Duration::ZERO, Some(TaskError::failed("x")));
        assert!(!failed.is_success());
        assert!(!failed.is_timeout());
        assert_eq!(failed.error_kind(), Some(ErrorKind::Failure));

        let timed_out = TaskResult::new(
            2,
            "c",
            now,
            Duration::from_secs(1),
            Some(TaskError::Timeout(Duration::from_secs(1))),
        );
        assert!(timed_out.is_timeout());
    }

    #[test]
    fn end_time_is_start_plus_duration() {
        let now = Utc::now();
        let result = TaskResult::new(0, "a", now, Duration::from_millis(250), None);
        assert_eq!(result.start_time(), now);
        assert_eq!(
            (result.end_time() - result.start_time()).num_milliseconds(),
            250
        );
    }

    #[test]
    fn stopwatch_records_elapsed() {
        let watch = Stopwatch::start();
        std::thread::sleep(Duration::from_millis(10));
        let result = watch.finish(3, "sleep".into(), Ok(()));
        assert_eq!(result.task_id(), 3);
        assert_eq!(result.name(), "sleep");
        assert!(result.duration() >= Duration::from_millis(10));
        assert!(result.end_time() >= result.start_time());
    }

    #[test]
    fn serializes_error_kind() {
        let result = TaskResult::new(
            0,
            "a",
            Utc::now(),
            Duration::ZERO,
            Some(TaskError::failed("bad input")),
        );
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["task_id"], 0);
        assert_eq!(json["success"], false);
        assert_eq!(json["error"]["kind"], "failed");
        assert_eq!(json["error"]["detail"], "bad input");
    }
}
