//! Environment value parsing.

use crate::{ConfigError, ConfigResult};

/// One loaded setting, as shown by the debug dump: the parsed value next to
/// the raw environment value it came from (if any).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvEntry {
    pub key: &'static str,
    pub value: String,
    pub raw: Option<String>,
}

/// Parse a boolean-ish string.
///
/// Accepts `true/false`, `1/0`, `yes/no`, `y/n`, `on/off` and
/// `enabled/disabled`, case-insensitively and ignoring surrounding
/// whitespace.
pub fn parse_bool(key: &str, raw: &str) -> ConfigResult<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "y" | "on" | "enabled" => Ok(true),
        "false" | "0" | "no" | "n" | "off" | "disabled" => Ok(false),
        _ => Err(ConfigError::invalid(key, raw, "expected a boolean")),
    }
}

/// Parse a TCP port in `0..=65535`.
pub(crate) fn parse_port(key: &str, raw: &str) -> ConfigResult<u16> {
    let trimmed = raw.trim();
    let number: i64 = trimmed
        .parse()
        .map_err(|_| ConfigError::invalid(key, raw, "expected a number"))?;
    u16::try_from(number).map_err(|_| ConfigError::invalid(key, raw, "must be within 0..=65535"))
}

/// Drop empty values so `FOO=` behaves like an unset variable.
pub(crate) fn non_empty(raw: String) -> Option<String> {
    if raw.trim().is_empty() {
        None
    } else {
        Some(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_bool_accepts_common_spellings() {
        for raw in ["true", "TRUE", "1", "yes", "Y", "on", "enabled", " true "] {
            assert!(parse_bool("DEBUG", raw).unwrap(), "{raw}");
        }
        for raw in ["false", "False", "0", "no", "n", "OFF", "disabled"] {
            assert!(!parse_bool("DEBUG", raw).unwrap(), "{raw}");
        }
    }

    #[test]
    fn parse_bool_rejects_garbage() {
        let err = parse_bool("DEVELOP", "maybe").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "DEVELOP"));
    }

    #[test]
    fn parse_port_bounds() {
        assert_eq!(parse_port("API_PORT", "0").unwrap(), 0);
        assert_eq!(parse_port("API_PORT", "8000").unwrap(), 8000);
        assert_eq!(parse_port("API_PORT", " 65535 ").unwrap(), 65535);
        assert!(parse_port("API_PORT", "65536").is_err());
        assert!(parse_port("API_PORT", "-1").is_err());
        assert!(parse_port("API_PORT", "eighty").is_err());
    }

    #[test]
    fn non_empty_filters_blank() {
        assert_eq!(non_empty("".to_string()), None);
        assert_eq!(non_empty("  ".to_string()), None);
        assert_eq!(non_empty("x".to_string()), Some("x".to_string()));
    }
}
