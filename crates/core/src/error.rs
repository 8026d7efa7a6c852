use thiserror::Error;

/// Errors raised while loading or validating scheduler configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("worker count must be at least 1, got {0}")]
    InvalidWorkerCount(usize),

    #[error("unknown execution mode: {0} (expected \"serial\" or \"parallel\")")]
    InvalidMode(String),

    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("config I/O error: {0}")]
    Io(#[from] std::io::Error),
}
