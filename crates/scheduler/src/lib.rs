//! Batch task scheduler with serial and worker-pool execution.
//!
//! A [`Scheduler`] owns an ordered list of [`Task`]s. A run executes every
//! task exactly once, either one at a time ([`Scheduler::run_serial`]) or
//! across a fixed pool of workers ([`Scheduler::run_parallel`]), optionally
//! bounding each task with a [`TimeoutGuard`]. Every run produces one
//! [`TaskResult`] per task, stored at the task's submission index, and a
//! [`RunSummary`].
//!
//! Timed-out tasks are abandoned, not cancelled: they keep running detached
//! and whatever they hold stays allocated until they finish on their own.
//! Repeated timeouts against tasks that never finish will leak.

pub mod error;
pub mod executor;
pub mod guard;
mod report;
pub mod result;
pub mod runner;
pub mod state;
pub mod summary;
pub mod task;

pub use batchrun_core::{ExecutionMode, SchedulerConfig};
pub use error::SchedulerError;
pub use executor::{Executor, SerialExecutor, WorkerPool};
pub use guard::TimeoutGuard;
pub use result::TaskResult;
pub use runner::Scheduler;
pub use state::RunState;
pub use summary::RunSummary;
pub use task::{ErrorKind, Task, TaskError};
