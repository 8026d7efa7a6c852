use std::any::Any;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;
use futures::FutureExt;
use serde::Serialize;
use thiserror::Error;
use tokio::task::JoinError;

/// Why a task did not succeed.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum TaskError {
    /// The task reported its own failure. Stored verbatim.
    #[error("{0}")]
    Failed(String),

    /// The task did not finish before the configured deadline.
    #[error("task timed out after {0:?}")]
    Timeout(Duration),

    /// The task panicked.
    #[error("task panicked: {0}")]
    Panicked(String),
}

/// Coarse classification of a [`TaskError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorKind {
    Failure,
    Timeout,
    Panic,
}

impl TaskError {
    /// A task-reported failure.
    pub fn failed(message: impl Into<String>) -> Self {
        TaskError::Failed(message.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            TaskError::Failed(_) => ErrorKind::Failure,
            TaskError::Timeout(_) => ErrorKind::Timeout,
            TaskError::Panicked(_) => ErrorKind::Panic,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, TaskError::Timeout(_))
    }

    pub(crate) fn from_join_error(err: JoinError) -> Self {
        if err.is_panic() {
            TaskError::Panicked(panic_message(err.into_panic().as_ref()))
        } else {
            TaskError::failed("task was cancelled by the runtime")
        }
    }

    pub(crate) fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        TaskError::Panicked(panic_message(payload.as_ref()))
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

type TaskFn = dyn Fn() -> BoxFuture<'static, Result<(), TaskError>> + Send + Sync;

/// A deferred, fallible, zero-argument unit of work.
///
/// Cloning a `Task` is cheap and yields a handle to the same work. The
/// scheduler never looks inside a task; any state the closure captures
/// belongs to the caller. A task may be invoked again by a later run.
#[derive(Clone)]
pub struct Task {
    name: Option<Arc<str>>,
    func: Arc<TaskFn>,
}

impl Task {
    /// Wrap async work.
    pub fn new<F, Fut>(f: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), TaskError>> + Send + 'static,
    {
        Self {
            name: None,
            func: Arc::new(move || f().boxed()),
        }
    }

    /// Wrap synchronous work. It runs on tokio's blocking pool so long
    /// computations and sleeps never stall the async workers.
    pub fn blocking<F>(f: F) -> Self
    where
        F: Fn() -> Result<(), TaskError> + Send + Sync + 'static,
    {
        let f = Arc::new(f);
        Self::new(move || {
            let f = Arc::clone(&f);
            async move {
                tokio::task::spawn_blocking(move || (*f)())
                    .await
                    .unwrap_or_else(|e| Err(TaskError::from_join_error(e)))
            }
        })
    }

    /// Attach a label used in status lines and results.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(Arc::from(name.into()));
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Label for the task at `task_id`, falling back to `task-{id}`.
    pub(crate) fn label(&self, task_id: usize) -> String {
        match &self.name {
            Some(name) => name.to_string(),
            None => format!("task-{task_id}"),
        }
    }

    /// Start one execution of the task.
    pub(crate) fn invoke(&self) -> BoxFuture<'static, Result<(), TaskError>> {
        (self.func.as_ref())()
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task").field("name", &self.name).finish_non_exhaustive()
    }
}
