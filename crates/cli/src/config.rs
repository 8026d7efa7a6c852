use anyhow::{Context, Result};
use batchrun_core::SchedulerConfig;
use tracing::debug;

use crate::cli::CliArgs;

/// Resolve the scheduler config: config file (or defaults), then `BATCHRUN_*`
/// environment overrides, then command-line flags. Validation runs once, on
/// the final result.
pub fn resolve(args: &CliArgs) -> Result<SchedulerConfig> {
    let base = match args.config.as_deref() {
        Some(path) => SchedulerConfig::read_file(path)
            .with_context(|| format!("failed to load config: {path}"))?,
        None => {
            debug!("no config file given, using defaults");
            SchedulerConfig::default()
        }
    };
    layer(base, args, |key| std::env::var(key).ok())
}

fn layer<F>(mut config: SchedulerConfig, args: &CliArgs, env: F) -> Result<SchedulerConfig>
where
    F: Fn(&str) -> Option<String>,
{
    config
        .apply_overrides_from(env)
        .context("invalid BATCHRUN_* environment override")?;
    apply_flags(&mut config, args.workers, args.timeout_ms);
    config.validate().context("invalid scheduler configuration")?;
    Ok(config)
}

/// Flags win over everything else.
fn apply_flags(config: &mut SchedulerConfig, workers: Option<usize>, timeout_ms: Option<u64>) {
    if let Some(workers) = workers {
        config.worker_count = workers;
    }
    if let Some(timeout_ms) = timeout_ms {
        config.timeout_ms = timeout_ms;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn args(argv: &[&str]) -> CliArgs {
        CliArgs::try_parse_from(std::iter::once("batchrun").chain(argv.iter().copied())).unwrap()
    }

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn workers_flag_rescues_invalid_file() {
        let file = SchedulerConfig::parse_toml("[scheduler]\nworker_count = 0\n").unwrap();

        assert!(layer(file.clone(), &args(&[]), no_env).is_err());

        let config = layer(file, &args(&["--workers", "4"]), no_env).unwrap();
        assert_eq!(config.worker_count, 4);
    }

    #[test]
    fn workers_flag_rescues_invalid_env() {
        let env = |key: &str| (key == "BATCHRUN_WORKERS").then(|| "0".to_string());

        assert!(layer(SchedulerConfig::default(), &args(&[]), env).is_err());

        let config = layer(SchedulerConfig::default(), &args(&["--workers", "2"]), env).unwrap();
        assert_eq!(config.worker_count, 2);
    }

    #[test]
    fn env_sits_between_file_and_flags() {
        let file = SchedulerConfig::parse_toml("[scheduler]\ntimeout_ms = 100\n").unwrap();
        let env = |key: &str| (key == "BATCHRUN_TIMEOUT_MS").then(|| "200".to_string());

        assert_eq!(layer(file.clone(), &args(&[]), env).unwrap().timeout_ms, 200);
        let config = layer(file, &args(&["--timeout-ms", "300"]), env).unwrap();
        assert_eq!(config.timeout_ms, 300);
    }

    #[test]
    fn flags_override_config() {
        let mut config = SchedulerConfig::default();
        apply_flags(&mut config, Some(7), Some(250));
        assert_eq!(config.worker_count, 7);
        assert_eq!(config.timeout_ms, 250);
    }

    #[test]
    fn absent_flags_keep_config() {
        let mut config = SchedulerConfig {
            worker_count: 4,
            timeout_ms: 900,
            ..SchedulerConfig::default()
        };
        apply_flags(&mut config, None, None);
        assert_eq!(config.worker_count, 4);
        assert_eq!(config.timeout_ms, 900);
    }
}
