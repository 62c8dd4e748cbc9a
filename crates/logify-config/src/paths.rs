//! File system paths.

use crate::{ConfigError, ConfigResult};
use std::path::PathBuf;

/// Environment variable that relocates the base directory.
const ENV_HOME: &str = "LOGIFY_HOME";

/// Manages file system paths for Logify.
#[derive(Debug, Clone)]
pub struct Paths {
    /// Base directory (~/.logify)
    base_dir: PathBuf,
}

impl Paths {
    /// Resolve the base directory from `LOGIFY_HOME`, falling back to `~/.logify`.
    pub fn new() -> ConfigResult<Self> {
        if let Some(custom) = std::env::var_os(ENV_HOME).filter(|v| !v.is_empty()) {
            return Ok(Self::with_base_dir(PathBuf::from(custom)));
        }

        let home = dirs::home_dir()
            .ok_or_else(|| ConfigError::Path("Could not determine home directory".to_string()))?;

        Ok(Self::with_base_dir(home.join(".logify")))
    }

    /// Create a new Paths instance with a custom base directory.
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// `<base>/config.json`
    pub fn config_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    /// `<base>/data`
    pub fn data_dir(&self) -> PathBuf {
        self.base_dir.join("data")
    }

    /// Durable key-value store backing the session (`<base>/data/app_state.json`).
    pub fn app_state_file(&self) -> PathBuf {
        self.data_dir().join("app_state.json")
    }

    /// `<base>/logs`
    pub fn logs_dir(&self) -> PathBuf {
        self.base_dir.join("logs")
    }

    /// `<base>/logs/logify.jsonl`
    pub fn log_file(&self) -> PathBuf {
        self.logs_dir().join("logify.jsonl")
    }

    /// Ensure all required directories exist.
    pub fn ensure_dirs(&self) -> ConfigResult<()> {
        std::fs::create_dir_all(&self.base_dir)?;
        std::fs::create_dir_all(self.data_dir())?;
        std::fs::create_dir_all(self.logs_dir())?;
        Ok(())
    }
}
