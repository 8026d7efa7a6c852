use std::fmt;
use std::time::Duration;

use batchrun_core::ExecutionMode;
use serde::Serialize;

use crate::result::TaskResult;

/// Aggregate statistics for one run, derived from its results.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub mode: ExecutionMode,
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Failures caused by the deadline, a subset of `failed`.
    pub timed_out: usize,
    /// Sum of task durations, not the span of the run.
    pub total_duration: Duration,
    pub average_duration: Duration,
    /// Percentage in `0.0..=100.0`. 0.0 for an empty run.
    pub success_rate: f64,
    /// Elapsed time of the whole run.
    pub wall_clock: Duration,
}

impl RunSummary {
    pub fn from_results(mode: ExecutionMode, results: &[TaskResult], wall_clock: Duration) -> Self {
        let total = results.len();
        let succeeded = results.iter().filter(|r| r.is_success()).count();
        let timed_out = results.iter().filter(|r| r.is_timeout()).count();
        let total_duration: Duration = results.iter().map(TaskResult::duration).sum();

        let (average_duration, success_rate) = if total == 0 {
            (Duration::ZERO, 0.0)
        } else {
            let avg_nanos = total_duration.as_nanos() / total as u128;
            (
                Duration::from_nanos(avg_nanos as u64),
                succeeded as f64 / total as f64 * 100.0,
            )
        };

        Self {
            mode,
            total,
            succeeded,
            failed: total - succeeded,
            timed_out,
            total_duration,
            average_duration,
            success_rate,
            wall_clock,
        }
    }

    pub fn all_succeeded(&self) -> bool {
        self.failed == 0
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Run summary ({}) ===", self.mode)?;
        writeln!(f, "Tasks:         {}", self.total)?;
        writeln!(f, "Succeeded:     {}", self.succeeded)?;
        writeln!(f, "Failed:        {} ({} timed out)", self.failed, self.timed_out)?;
        writeln!(f, "Total time:    {:?}", self.total_duration)?;
        writeln!(f, "Average time:  {:?}", self.average_duration)?;
        writeln!(f, "Success rate:  {:.1}%", self.success_rate)?;
        write!(f, "Wall clock:    {:?}", self.wall_clock)
    }
}
