//! Environment-driven settings helpers.
//!
//! Each crate owns its own settings struct; this module only provides the
//! shared error type and the "read, parse, or fall back" step. Lookups are
//! injected so tests never touch the process environment.

use core::str::FromStr;

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key}: cannot parse {value:?}: {message}")]
    Parse {
        key: &'static str,
        value: String,
        message: String,
    },

    #[error("{key}: {message}")]
    OutOfRange { key: &'static str, message: String },
}

/// Read `key` through `lookup`, parsing it as `T`, or return `default` when unset.
pub fn read_var<T, F>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: core::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse::<T>().map_err(|e| ConfigError::Parse {
            key,
            value: raw,
            message: e.to_string(),
        }),
    }
}

/// Like [`read_var`] for booleans, also accepting `1/0`, `yes/no`, `on/off`.
pub fn read_flag<F>(lookup: &F, key: &'static str, default: bool) -> Result<bool, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(key) else {
        return Ok(default);
    };
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Parse {
            key,
            value: raw,
            message: "expected a boolean".to_string(),
        }),
    }
}

/// Process-environment lookup.
pub fn env_lookup(key: &str) -> Option<String> {
    std::env::var(key).ok()
}
