use std::env;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

// ── Execution mode ──────────────────────────────────────────────────

/// How a batch is dispatched: one task at a time, or across the worker pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    Serial,
    #[default]
    Parallel,
}

impl ExecutionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExecutionMode::Serial => "serial",
            ExecutionMode::Parallel => "parallel",
        }
    }
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExecutionMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "serial" => Ok(ExecutionMode::Serial),
            "parallel" => Ok(ExecutionMode::Parallel),
            other => Err(ConfigError::InvalidMode(other.to_string())),
        }
    }
}

// ── Scheduler config ────────────────────────────────────────────────

/// Scheduler configuration, typically parsed from the `[scheduler]` section
/// of a TOML file.
///
/// The configuration is captured when a run starts; changing it afterwards
/// only affects subsequent runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Size of the worker pool used by parallel runs. Must be at least 1.
    #[serde(default = "default_worker_count")]
    pub worker_count: usize,

    /// Per-task timeout in milliseconds. 0 = no timeout.
    #[serde(default)]
    pub timeout_ms: u64,

    /// Default execution mode.
    #[serde(default)]
    pub mode: ExecutionMode,
}

fn default_worker_count() -> usize {
    3
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            worker_count: default_worker_count(),
            timeout_ms: 0,
            mode: ExecutionMode::default(),
        }
    }
}

/// On-disk layout: settings live under a `[scheduler]` table.
#[derive(Debug, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    scheduler: SchedulerConfig,
}

impl SchedulerConfig {
    /// Config with the given pool size and no timeout.
    pub fn with_workers(worker_count: usize) -> Self {
        Self {
            worker_count,
            ..Self::default()
        }
    }

    /// Parse config from a TOML string, apply env overrides and validate.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let mut config = Self::parse_toml(toml_str)?;
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Load config from a file path, apply env overrides and validate.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let mut config = Self::read_file(path)?;
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Parse the `[scheduler]` section only. No overrides, no validation.
    pub fn parse_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile = toml::from_str(toml_str)?;
        Ok(file.scheduler)
    }

    /// Read and parse a config file. No overrides, no validation.
    pub fn read_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        tracing::debug!(path = %path.as_ref().display(), "loaded scheduler config file");
        Self::parse_toml(&content)
    }

    /// The timeout as a `Duration`, or `None` when unbounded.
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_ms > 0).then(|| Duration::from_millis(self.timeout_ms))
    }

    /// Record a timeout. `None` or a zero duration disables it.
    ///
    /// Sub-millisecond remainders round up; oversized values saturate.
    pub fn set_timeout(&mut self, timeout: Option<Duration>) {
        self.timeout_ms = timeout
            .map(|t| u64::try_from(t.as_nanos().div_ceil(1_000_000)).unwrap_or(u64::MAX))
            .unwrap_or(0);
    }

    // ── Environment variable overrides ──────────────────────────────

    /// Apply environment variable overrides.
    ///
    /// `BATCHRUN_WORKERS`, `BATCHRUN_TIMEOUT_MS` and `BATCHRUN_MODE` override
    /// the matching fields.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides_from(|key| env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup.
    pub fn apply_overrides_from<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("BATCHRUN_WORKERS") {
            self.worker_count = parse_value("BATCHRUN_WORKERS", &v)?;
        }
        if let Some(v) = lookup("BATCHRUN_TIMEOUT_MS") {
            self.timeout_ms = parse_value("BATCHRUN_TIMEOUT_MS", &v)?;
        }
        if let Some(v) = lookup("BATCHRUN_MODE") {
            self.mode = v.parse()?;
        }
        Ok(())
    }

    // ── Validation ──────────────────────────────────────────────────

    /// Check the config before any task executes.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.worker_count == 0 {
            return Err(ConfigError::InvalidWorkerCount(self.worker_count));
        }
        Ok(())
    }
}

fn parse_value<T: FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}
