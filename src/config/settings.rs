//! Typed settings for the keys the application itself consumes.

use super::effective::{mismatch, EffectiveConfig};
use super::error::{ConfigError, ConfigResult};
use super::value::ConfigValue;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Database path that opens an in-memory SQLite database.
pub const IN_MEMORY_DATABASE: &str = ":memory:";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            other => Err(format!("unknown log level '{other}'")),
        }
    }
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatabaseSettings {
    pub path: PathBuf,
    pub pool_size: u32,
    pub stacktrace: bool,
}

impl DatabaseSettings {
    /// Read `database.*`. `path` may be a plain string or a `$path` reference,
    /// which is bound against the directory of the source that declared it.
    pub fn from_config(config: &EffectiveConfig) -> ConfigResult<Self> {
        let path = match config.require("database.path")? {
            ConfigValue::String(s) => PathBuf::from(s),
            ConfigValue::Opaque(r) => {
                r.expand_path().ok_or_else(|| mismatch("database.path", "path", &ConfigValue::Opaque(r.clone())))?
            }
            other => return Err(mismatch("database.path", "string or path reference", other)),
        };

        let raw_pool = config.require_int("database.pool_size")?;
        let pool_size = u32::try_from(raw_pool).ok().filter(|n| *n >= 1).ok_or_else(|| {
            ConfigError::TypeMismatch {
                key: "database.pool_size".to_string(),
                expected: "a positive integer".to_string(),
                found: raw_pool.to_string(),
            }
        })?;

        let stacktrace = match config.get("database.stacktrace") {
            None => false,
            Some(value) => value.as_bool().ok_or_else(|| mismatch("database.stacktrace", "boolean", value))?,
        };

        Ok(Self { path, pool_size, stacktrace })
    }

    pub fn is_in_memory(&self) -> bool {
        self.path.as_os_str() == IN_MEMORY_DATABASE
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LoggerSettings {
    pub level: LogLevel,
}

impl LoggerSettings {
    pub fn from_config(config: &EffectiveConfig) -> ConfigResult<Self> {
        let raw = config.require_str("logger.level")?;
        let level = raw.parse().map_err(|_| ConfigError::TypeMismatch {
            key: "logger.level".to_string(),
            expected: "one of debug, info, warn, error".to_string(),
            found: format!("'{raw}'"),
        })?;
        Ok(Self { level })
    }
}

/// Everything the application reads from the effective configuration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppSettings {
    pub database: DatabaseSettings,
    pub logger: LoggerSettings,
}

impl AppSettings {
    pub fn from_config(config: &EffectiveConfig) -> ConfigResult<Self> {
        Ok(Self {
            database: DatabaseSettings::from_config(config)?,
            logger: LoggerSettings::from_config(config)?,
        })
    }
}
