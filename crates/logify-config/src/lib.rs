//! Configuration, filesystem paths, and logging setup for Logify.

mod config;
mod env;
mod error;
mod logging;
mod paths;

pub use config::{Config, DEFAULT_API_PORT, DEFAULT_DEBUG, DEFAULT_DEVELOP, DEFAULT_LOG_LEVEL};
pub use env::{parse_bool, EnvEntry};
pub use error::{ConfigError, ConfigResult};
pub use logging::{init_logging, init_logging_for_service};
pub use paths::Paths;
