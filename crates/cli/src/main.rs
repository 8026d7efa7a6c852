mod cli;
mod config;
mod demo;
mod terminal;

use anyhow::{Context, Result};
use batchrun_core::load_dotenv;
use batchrun_scheduler::Scheduler;
use clap::Parser;
use tracing::info;

use crate::cli::CliArgs;
use crate::terminal::Terminal;

#[tokio::main]
async fn main() -> Result<()> {
    load_dotenv();

    // Logs go to stderr so `--json` output stays clean.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let args = CliArgs::parse();
    let mut config = config::resolve(&args)?;

    if args.timeout_ms.is_none() && config.timeout().is_none() {
        config.set_timeout(args.demo.default_timeout());
    }

    let modes = args
        .mode
        .map(|m| m.modes())
        .unwrap_or_else(|| vec![config.mode]);

    info!(
        demo = ?args.demo,
        workers = config.worker_count,
        timeout_ms = config.timeout_ms,
        "batchrun starting"
    );

    let terminal = Terminal::new();
    let mut reports = Vec::new();
    let mut abandoned = 0;

    for mode in modes {
        let mut scheduler = Scheduler::from_config(config.clone());
        scheduler.add_tasks(args.demo.tasks());

        if !args.json {
            terminal.print_header(mode, scheduler.task_count(), scheduler.worker_count())?;
        }

        let summary = scheduler
            .run(mode)
            .await
            .with_context(|| format!("{mode} run failed"))?;
        abandoned += scheduler.abandoned_tasks();

        if args.json {
            reports.push(serde_json::json!({
                "summary": summary,
                "results": scheduler.results(),
            }));
        } else {
            terminal.print_results(scheduler.results())?;
            terminal.print_summary(&summary)?;
        }
    }

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&reports).context("failed to serialize report")?
        );
    } else if abandoned > 0 {
        terminal.print_abandoned(abandoned)?;
    }

    Ok(())
}
