//! The merged, read-only configuration and its process-wide slot.

use super::error::{ConfigError, ConfigResult};
use super::value::{ConfigValue, Mapping};
use once_cell::sync::OnceCell;
use serde::{Serialize, Serializer};

static INSTALLED: OnceCell<EffectiveConfig> = OnceCell::new();

/// Result of merging a base document with its environment override.
#[derive(Debug, Clone, PartialEq)]
pub struct EffectiveConfig {
    environment: String,
    values: Mapping,
}

impl EffectiveConfig {
    pub(crate) fn new(environment: String, values: Mapping) -> Self {
        Self { environment, values }
    }

    /// Environment this configuration was resolved for.
    pub fn environment(&self) -> &str {
        &self.environment
    }

    pub fn as_mapping(&self) -> &Mapping {
        &self.values
    }

    pub fn namespaces(&self) -> impl Iterator<Item = &str> {
        self.values.keys()
    }

    pub fn namespace(&self, name: &str) -> Option<&Mapping> {
        self.values.get(name).and_then(ConfigValue::as_mapping)
    }

    /// Look up a dotted key such as `database.pool_size`.
    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.values.lookup(key.split('.'))
    }

    pub fn require(&self, key: &str) -> ConfigResult<&ConfigValue> {
        self.get(key).ok_or_else(|| ConfigError::MissingRequiredKey { key: key.to_string() })
    }

    pub fn require_str(&self, key: &str) -> ConfigResult<&str> {
        let value = self.require(key)?;
        value.as_str().ok_or_else(|| mismatch(key, "string", value))
    }

    pub fn require_int(&self, key: &str) -> ConfigResult<i64> {
        let value = self.require(key)?;
        value.as_i64().ok_or_else(|| mismatch(key, "integer", value))
    }

    pub fn require_bool(&self, key: &str) -> ConfigResult<bool> {
        let value = self.require(key)?;
        value.as_bool().ok_or_else(|| mismatch(key, "boolean", value))
    }

    /// Make this the process-wide configuration. Only the first call succeeds.
    pub fn install(self) -> ConfigResult<&'static EffectiveConfig> {
        INSTALLED.set(self).map_err(|_| ConfigError::AlreadyInstalled)?;
        INSTALLED.get().ok_or(ConfigError::AlreadyInstalled)
    }

    /// The installed process-wide configuration, if any.
    pub fn global() -> Option<&'static EffectiveConfig> {
        INSTALLED.get()
    }
}

pub(crate) fn mismatch(key: &str, expected: &str, found: &ConfigValue) -> ConfigError {
    ConfigError::TypeMismatch { key: key.to_string(), expected: expected.to_string(), found: found.kind().to_string() }
}

impl Serialize for EffectiveConfig {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.values.serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::document::ConfigDocument;

    fn sample() -> EffectiveConfig {
        let mut doc = ConfigDocument::new();
        doc.set("database.pool_size", ConfigValue::Integer(10));
        doc.set("database.path", "sample.db".into());
        doc.set("database.stacktrace", ConfigValue::Bool(true));
        EffectiveConfig::new("test".to_string(), doc.into_mapping())
    }

    #[test]
    fn typed_lookups() {
        let config = sample();
        assert_eq!(config.require_int("database.pool_size").expect("int"), 10);
        assert_eq!(config.require_str("database.path").expect("str"), "sample.db");
        assert!(config.require_bool("database.stacktrace").expect("bool"));
        assert_eq!(config.namespaces().collect::<Vec<_>>(), vec!["database"]);
    }

    #[test]
    fn missing_key_is_reported_by_name() {
        let err = sample().require("logger.level").expect_err("missing");
        assert!(matches!(&err, ConfigError::MissingRequiredKey { key } if key == "logger.level"));
        assert_eq!(err.to_string(), "Missing required configuration key: logger.level");
    }

    #[test]
    fn wrong_type_is_mismatch() {
        let err = sample().require_int("database.path").expect_err("mismatch");
        assert_eq!(err.to_string(), "Invalid value for database.path: expected integer, found string");
    }

    #[test]
    fn serializes_as_plain_mapping() {
        let json = serde_json::to_string(&sample()).expect("json");
        assert_eq!(json, r#"{"database":{"pool_size":10,"path":"sample.db","stacktrace":true}}"#);
    }

    #[test]
    fn install_is_write_once() {
        let first = sample().install().expect("first install");
        assert_eq!(first.environment(), "test");
        assert!(matches!(sample().install(), Err(ConfigError::AlreadyInstalled)));
        assert_eq!(EffectiveConfig::global(), Some(first));
    }
}
