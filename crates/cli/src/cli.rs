use batchrun_core::ExecutionMode;
use clap::{Parser, ValueEnum};

use crate::demo::Demo;

/// Run a batch of demo tasks serially or across a worker pool.
///
/// Settings are resolved in order: flags, then `BATCHRUN_*` environment
/// variables, then the `[scheduler]` section of the config file.
#[derive(Parser, Debug)]
#[command(name = "batchrun", version, about)]
pub struct CliArgs {
    /// Path to a TOML config file with a `[scheduler]` section
    #[arg(long, env = "BATCHRUN_CONFIG")]
    pub config: Option<String>,

    /// Worker pool size for parallel runs
    #[arg(long)]
    pub workers: Option<usize>,

    /// Per-task timeout in milliseconds (0 disables it)
    #[arg(long)]
    pub timeout_ms: Option<u64>,

    /// Execution mode (defaults to the configured mode)
    #[arg(long, value_enum)]
    pub mode: Option<ModeArg>,

    /// Built-in batch to run
    #[arg(long, value_enum, default_value_t = Demo::Sample)]
    pub demo: Demo,

    /// Print results and summaries as JSON on stdout
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    Serial,
    Parallel,
    /// Serial first, then parallel, on identical batches
    Both,
}

impl ModeArg {
    pub fn modes(self) -> Vec<ExecutionMode> {
        match self {
            ModeArg::Serial => vec![ExecutionMode::Serial],
            ModeArg::Parallel => vec![ExecutionMode::Parallel],
            ModeArg::Both => vec![ExecutionMode::Serial, ExecutionMode::Parallel],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_flags() {
        let args = CliArgs::try_parse_from([
            "batchrun",
            "--workers",
            "5",
            "--timeout-ms",
            "1000",
            "--mode",
            "both",
            "--demo",
            "timeout",
            "--json",
        ])
        .unwrap();
        assert_eq!(args.workers, Some(5));
        assert_eq!(args.timeout_ms, Some(1000));
        assert_eq!(args.mode, Some(ModeArg::Both));
        assert_eq!(args.demo, Demo::Timeout);
        assert!(args.json);
    }

    #[test]
    fn defaults() {
        let args = CliArgs::try_parse_from(["batchrun"]).unwrap();
        assert_eq!(args.workers, None);
        assert_eq!(args.mode, None);
        assert_eq!(args.demo, Demo::Sample);
        assert!(!args.json);
    }

    #[test]
    fn both_runs_serial_then_parallel() {
        assert_eq!(
            ModeArg::Both.modes(),
            vec![ExecutionMode::Serial, ExecutionMode::Parallel]
        );
    }
}
