use std::io::{self, Write};

use anyhow::Result;
use batchrun_core::ExecutionMode;
use batchrun_scheduler::{RunSummary, TaskResult};
use crossterm::{
    execute,
    style::{Color, Print, ResetColor, SetForegroundColor},
};

/// Color scheme for terminal output.
struct Colors;

impl Colors {
    const HEADER: Color = Color::Magenta;
    const OK: Color = Color::Green;
    const FAILED: Color = Color::Red;
    const TIMEOUT: Color = Color::Yellow;
    const DIM: Color = Color::DarkGrey;
}

/// Human-readable rendering of runs on stdout.
#[derive(Debug, Default)]
pub struct Terminal;

impl Terminal {
    pub fn new() -> Self {
        Self
    }

    /// Print the banner that opens a run.
    pub fn print_header(&self, mode: ExecutionMode, tasks: usize, workers: usize) -> Result<()> {
        let mut stdout = io::stdout();
        execute!(
            stdout,
            SetForegroundColor(Colors::HEADER),
            Print(format!("=== {mode} run: {tasks} tasks")),
            ResetColor,
        )?;
        if mode == ExecutionMode::Parallel {
            execute!(stdout, Print(format!(", {workers} workers")))?;
        }
        execute!(stdout, Print(" ===\n"))?;
        stdout.flush()?;
        Ok(())
    }

    /// One line per task, in task id order.
    pub fn print_results(&self, results: &[TaskResult]) -> Result<()> {
        let mut stdout = io::stdout();
        for result in results {
            let (color, status) = match result.error() {
                None => (Colors::OK, "ok"),
                Some(e) if e.is_timeout() => (Colors::TIMEOUT, "timeout"),
                Some(_) => (Colors::FAILED, "failed"),
            };
            execute!(
                stdout,
                Print(format!("  #{:<3} ", result.task_id())),
                SetForegroundColor(color),
                Print(format!("{status:<8}")),
                ResetColor,
                Print(format!("{:<12} {:>10.1?}", result.name(), result.duration())),
            )?;
            if let Some(err) = result.error() {
                execute!(
                    stdout,
                    SetForegroundColor(Colors::DIM),
                    Print(format!("  {err}")),
                    ResetColor,
                )?;
            }
            execute!(stdout, Print("\n"))?;
        }
        stdout.flush()?;
        Ok(())
    }

    pub fn print_summary(&self, summary: &RunSummary) -> Result<()> {
        let mut stdout = io::stdout();
        execute!(stdout, Print(format!("\n{summary}\n\n")))?;
        stdout.flush()?;
        Ok(())
    }

    /// Warn about timed-out tasks still running in the background.
    pub fn print_abandoned(&self, abandoned: usize) -> Result<()> {
        let mut stdout = io::stdout();
        execute!(
            stdout,
            SetForegroundColor(Colors::TIMEOUT),
            Print(format!(
                "{abandoned} timed-out task(s) were abandoned and may still be running\n"
            )),
            ResetColor,
        )?;
        stdout.flush()?;
        Ok(())
    }
}
