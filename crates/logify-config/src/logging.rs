//! Logging initialization.
//!
//! Thin wrapper over the `observability` package so binaries get the same
//! JSONL file plus stderr setup.

use crate::Paths;

/// Initialize logging for the CLI, writing JSON lines under `paths`.
pub fn init_logging(paths: &Paths, level: &str) {
    init_logging_for_service(paths, "logify-cli", level);
}

/// Initialize logging with a custom service name.
pub fn init_logging_for_service(paths: &Paths, service_name: &str, level: &str) {
    observability::init_with_config(observability::LogConfig {
        service_name: service_name.into(),
        default_level: level.into(),
        log_path: Some(paths.log_file()),
        json_file: true,
        also_stderr: true,
    });
}
