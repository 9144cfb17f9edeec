use std::env;
use std::str::FromStr;

use super::types::ConfigError;

const LOCAL_ORIGINS: &[&str] = &["http://localhost:5173", "http://localhost:3000"];

/// Trimmed value of `key`; blank counts as unset.
pub(super) fn env_var(key: &str) -> Option<String> {
    env::var(key).ok().map(|value| value.trim().to_string()).filter(|value| !value.is_empty())
}

pub(super) fn env_var_or(key: &str, default: &str) -> String {
    env_var(key).unwrap_or_else(|| default.to_string())
}

pub(super) fn parse_number<T: FromStr>(key: &'static str, raw: String) -> Result<T, ConfigError> {
    raw.parse::<T>().map_err(|_| ConfigError::InvalidValue { key, value: raw })
}

/// A typo in a switch is reported rather than silently read as "off".
pub(super) fn parse_flag(key: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue { key, value: raw.to_string() }),
    }
}

pub(super) fn flag_or(key: &'static str, default: bool) -> Result<bool, ConfigError> {
    env_var(key).map_or(Ok(default), |raw| parse_flag(key, &raw))
}

/// Accepts a JSON array or a comma-separated list. Every origin needs an
/// http(s) scheme; a trailing slash is dropped since browsers never send one.
pub(super) fn parse_origins(raw: Option<String>) -> Result<Vec<String>, ConfigError> {
    let items: Vec<String> = match raw {
        None => Vec::new(),
        Some(raw) if raw.trim_start().starts_with('[') => {
            serde_json::from_str(&raw).map_err(|_| ConfigError::InvalidOrigin(raw.clone()))?
        }
        Some(raw) => raw.split(',').map(str::to_string).collect(),
    };

    let origins = items
        .iter()
        .map(|item| item.trim().trim_end_matches('/'))
        .filter(|item| !item.is_empty())
        .map(|origin| {
            if origin.starts_with("http://") || origin.starts_with("https://") {
                Ok(origin.to_string())
            } else {
                Err(ConfigError::InvalidOrigin(origin.to_string()))
            }
        })
        .collect::<Result<Vec<_>, _>>()?;

    if origins.is_empty() {
        return Ok(LOCAL_ORIGINS.iter().map(|origin| origin.to_string()).collect());
    }
    Ok(origins)
}
