//! Application configuration.

use crate::env::{non_empty, parse_bool, parse_port, EnvEntry};
use crate::{ConfigResult, Paths};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Default API port.
pub const DEFAULT_API_PORT: u16 = 8000;

/// Development mode is on unless switched off.
pub const DEFAULT_DEVELOP: bool = true;

/// Debug output is on unless switched off.
pub const DEFAULT_DEBUG: bool = true;

const ENV_API_PORT: &str = "API_PORT";
const ENV_DEVELOP: &str = "DEVELOP";
const ENV_DEBUG: &str = "DEBUG";
const ENV_LOG_LEVEL: &str = "LOGIFY_LOG_LEVEL";

/// Main configuration.
///
/// Resolution order: built-in defaults, then `config.json` in the base
/// directory (if present), then environment variables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
    /// Port the API listens on.
    pub api_port: u16,
    /// Development mode.
    pub develop: bool,
    /// Debug mode; dumps the loaded environment at startup.
    pub debug: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            api_port: DEFAULT_API_PORT,
            develop: DEFAULT_DEVELOP,
            debug: DEFAULT_DEBUG,
        }
    }
}

impl Config {
    /// Defaults overridden by the process environment.
    pub fn from_env() -> ConfigResult<Self> {
        let mut config = Self::default();
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Load from the config file (if any), then apply the process environment.
    pub fn load(paths: &Paths) -> ConfigResult<Self> {
        let config_path = paths.config_file();

        let mut config = if config_path.exists() {
            Self::load_from_file(&config_path)?
        } else {
            Self::default()
        };

        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Load configuration from a specific file. Missing fields take defaults.
    pub fn load_from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Save configuration to the base directory.
    pub fn save(&self, paths: &Paths) -> ConfigResult<()> {
        paths.ensure_dirs()?;
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(paths.config_file(), content)?;
        Ok(())
    }

    /// Override fields from an environment lookup. Empty values are ignored.
    pub fn apply_env<F>(&mut self, lookup: F) -> ConfigResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).and_then(non_empty);

        if let Some(raw) = get(ENV_API_PORT) {
            self.api_port = parse_port(ENV_API_PORT, &raw)?;
        }
        if let Some(raw) = get(ENV_DEVELOP) {
            self.develop = parse_bool(ENV_DEVELOP, &raw)?;
        }
        if let Some(raw) = get(ENV_DEBUG) {
            self.debug = parse_bool(ENV_DEBUG, &raw)?;
        }
        if let Some(raw) = get(ENV_LOG_LEVEL) {
            self.log_level = raw.trim().to_string();
        }
        Ok(())
    }

    /// Loaded settings paired with the raw environment values.
    pub fn env_entries<F>(&self, lookup: F) -> Vec<EnvEntry>
    where
        F: Fn(&str) -> Option<String>,
    {
        vec![
            EnvEntry {
                key: ENV_DEVELOP,
                value: self.develop.to_string(),
                raw: lookup(ENV_DEVELOP),
            },
            EnvEntry {
                key: ENV_DEBUG,
                value: self.debug.to_string(),
                raw: lookup(ENV_DEBUG),
            },
            EnvEntry {
                key: ENV_API_PORT,
                value: self.api_port.to_string(),
                raw: lookup(ENV_API_PORT),
            },
            EnvEntry {
                key: ENV_LOG_LEVEL,
                value: self.log_level.clone(),
                raw: lookup(ENV_LOG_LEVEL),
            },
        ]
    }

    /// Dump the loaded settings at debug level when debug mode is on.
    pub fn log_loaded_env(&self) {
        if !self.debug {
            return;
        }
        for entry in self.env_entries(|key| std::env::var(key).ok()) {
            tracing::debug!(
                key = entry.key,
                value = %entry.value,
                raw = entry.raw.as_deref().unwrap_or("<unset>"),
                "loaded environment variable"
            );
        }
        if self.develop {
            tracing::warn!("running in development mode");
        }
    }
}
