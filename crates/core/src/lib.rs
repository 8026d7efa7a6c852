pub mod config;
pub mod error;

pub use config::{load_dotenv, ExecutionMode, SchedulerConfig};
pub use error::ConfigError;
