//! Environment command.

use crate::output::{row, OutputFormat};
use anyhow::Result;
use logify_config::{Config, Paths};
use serde_json::json;

/// Print the loaded settings next to their raw environment values.
pub fn env(config: &Config, paths: &Paths, format: OutputFormat) -> Result<()> {
    let entries = config.env_entries(|key| std::env::var(key).ok());

    match format {
        OutputFormat::Text => {
            for entry in &entries {
                let raw = entry.raw.as_deref().unwrap_or("<unset>");
                println!("{}", row(entry.key, &format!("{} (raw: {})", entry.value, raw)));
            }
            println!("{}", row("LOGIFY_HOME", &paths.base_dir().display().to_string()));
        }
        OutputFormat::Json => {
            let vars: Vec<_> = entries
                .iter()
                .map(|e| json!({ "key": e.key, "value": e.value, "raw": e.raw }))
                .collect();
            let out = json!({
                "base_dir": paths.base_dir(),
                "variables": vars,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
    }
    Ok(())
}
