use serde::Serialize;

/// Lifecycle of a single run.
///
/// `Idle` after construction or reset, `Running` while tasks execute,
/// `Completed` once every task has a recorded result. There is no cancelled
/// state: a started run always finishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum RunState {
    #[default]
    Idle,
    Running,
    Completed,
}
