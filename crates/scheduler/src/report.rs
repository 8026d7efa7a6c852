//! Per-task status lines and run summaries, emitted as tracing events.

use tracing::{info, warn};

use crate::result::TaskResult;
use crate::summary::RunSummary;

pub(crate) fn task_status(result: &TaskResult) {
    let duration_ms = result.duration().as_secs_f64() * 1000.0;
    match result.error() {
        None => info!(
            task_id = result.task_id(),
            name = result.name(),
            status = "ok",
            duration_ms,
            "task finished"
        ),
        Some(err) => {
            let status = if err.is_timeout() { "timeout" } else { "failed" };
            warn!(
                task_id = result.task_id(),
                name = result.name(),
                status,
                duration_ms,
                error = %err,
                "task finished"
            )
        }
    }
}

pub(crate) fn run_summary(summary: &RunSummary) {
    info!(
        mode = %summary.mode,
        total = summary.total,
        succeeded = summary.succeeded,
        failed = summary.failed,
        timed_out = summary.timed_out,
        total_ms = summary.total_duration.as_millis() as u64,
        average_ms = summary.average_duration.as_millis() as u64,
        success_rate = summary.success_rate,
        wall_clock_ms = summary.wall_clock.as_millis() as u64,
        "run complete"
    );
}
