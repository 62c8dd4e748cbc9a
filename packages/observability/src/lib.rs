//! # Observability
//!
//! Centralized logging for the Logify workspace.
//!
//! Crates are **log producers**: they use the standard `tracing` macros and
//! never decide where output goes. A binary calls [`init`] or
//! [`init_with_config`] once at startup, which installs a subscriber that
//! writes structured JSON lines to `~/.logify/logs/logify.jsonl` and,
//! optionally, compact human-readable lines to stderr.
//!
//! ```rust,ignore
//! fn main() {
//!     observability::init_with_config(observability::LogConfig {
//!         service_name: "logify-cli".into(),
//!         default_level: "debug".into(),
//!         also_stderr: true,
//!         ..Default::default()
//!     });
//!
//!     tracing::info!("ready");
//! }
//! ```
//!
//! The level filter comes from `RUST_LOG` when set, otherwise from
//! [`LogConfig::default_level`].

mod file_writer;
mod json_layer;

pub use file_writer::LogFileWriter;
pub use json_layer::{JsonLayer, LogEntry};

use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Configuration for the logging system.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Name of the service, written into every JSON line.
    pub service_name: String,

    /// Default level filter (e.g. "debug", "info"). `RUST_LOG` wins when set.
    pub default_level: String,

    /// Custom log file path. Defaults to `~/.logify/logs/logify.jsonl`.
    pub log_path: Option<PathBuf>,

    /// Write JSON lines to the log file.
    pub json_file: bool,

    /// Also emit compact lines to stderr.
    pub also_stderr: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            service_name: "unknown".into(),
            default_level: "info".into(),
            log_path: None,
            json_file: true,
            also_stderr: false,
        }
    }
}

/// Default central log file location.
pub fn default_log_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".logify").join("logs").join("logify.jsonl"))
}

/// Initialize logging with default settings for `service_name`.
pub fn init(service_name: &str) {
    init_with_config(LogConfig {
        service_name: service_name.into(),
        ..Default::default()
    });
}

/// Initialize logging with a custom configuration.
///
/// Never panics: if the log file cannot be opened the file layer is skipped
/// and stderr output is forced on. A second call is a no-op because the
/// global subscriber is already installed.
pub fn init_with_config(config: LogConfig) {
    let mut also_stderr = config.also_stderr;
    let mut file_error = None;

    let json_layer = if config.json_file {
        match config.log_path.clone().or_else(default_log_path) {
            Some(path) => match LogFileWriter::open(&path) {
                Ok(writer) => Some((JsonLayer::new(config.service_name.clone(), writer), path)),
                Err(e) => {
                    file_error = Some(format!("{}: {}", path.display(), e));
                    also_stderr = true;
                    None
                }
            },
            None => {
                file_error = Some("home directory not found".to_string());
                also_stderr = true;
                None
            }
        }
    } else {
        None
    };

    let log_path = json_layer.as_ref().map(|(_, path)| path.clone());

    let stderr_layer = if also_stderr {
        Some(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .compact()
                .with_writer(std::io::stderr)
                .with_filter(env_filter(&config.default_level)),
        )
    } else {
        None
    };

    let installed = tracing_subscriber::registry()
        .with(
            json_layer
                .map(|(layer, _)| layer.with_filter(env_filter(&config.default_level))),
        )
        .with(stderr_layer)
        .try_init()
        .is_ok();

    if !installed {
        return;
    }

    if let Some(error) = file_error {
        tracing::warn!(error = %error, "log file unavailable, logging to stderr only");
    }
    if let Some(path) = log_path {
        tracing::debug!(
            service = %config.service_name,
            log_path = %path.display(),
            "observability initialized"
        );
    }
}

fn env_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}
