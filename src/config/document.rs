//! Parsed configuration documents.

use super::value::{ConfigValue, Mapping};
use std::path::{Path, PathBuf};

/// One parsed configuration source: namespaces mapped to key/value mappings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigDocument {
    namespaces: Mapping,
    origin: Option<PathBuf>,
}

impl ConfigDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty document remembering which file it came from.
    pub fn from_origin(origin: impl Into<PathBuf>) -> Self {
        Self { namespaces: Mapping::new(), origin: Some(origin.into()) }
    }

    /// Set `key` (`namespace.path.to.key`) to `value`. Last write wins.
    ///
    /// Missing intermediate mappings are created; a non-mapping intermediate
    /// is replaced by a mapping.
    pub fn set(&mut self, key: &str, value: ConfigValue) {
        let segments: Vec<&str> = key.split('.').collect();
        set_path(&mut self.namespaces, &segments, value);
    }

    /// Replace a whole namespace.
    pub fn set_namespace(&mut self, namespace: impl Into<String>, entries: Mapping) {
        self.namespaces.insert(namespace, ConfigValue::Mapping(entries));
    }

    /// Mark a whole namespace as null. In an override this removes it.
    pub fn clear_namespace(&mut self, namespace: impl Into<String>) {
        self.namespaces.insert(namespace, ConfigValue::Null);
    }

    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.namespaces.lookup(key.split('.'))
    }

    pub fn namespace(&self, name: &str) -> Option<&Mapping> {
        self.namespaces.get(name).and_then(ConfigValue::as_mapping)
    }

    pub fn namespace_names(&self) -> impl Iterator<Item = &str> {
        self.namespaces.keys()
    }

    pub fn is_empty(&self) -> bool {
        self.namespaces.is_empty()
    }

    pub fn origin(&self) -> Option<&Path> {
        self.origin.as_deref()
    }

    pub fn as_mapping(&self) -> &Mapping {
        &self.namespaces
    }

    pub fn into_mapping(self) -> Mapping {
        self.namespaces
    }
}

fn set_path(target: &mut Mapping, segments: &[&str], value: ConfigValue) {
    match segments {
        [] => {}
        [last] => {
            target.insert(*last, value);
        }
        [head, rest @ ..] => {
            if !matches!(target.get(head), Some(ConfigValue::Mapping(_))) {
                target.insert(*head, ConfigValue::Mapping(Mapping::new()));
            }
            if let Some(ConfigValue::Mapping(child)) = target.get_mut(head) {
                set_path(child, rest, value);
            }
        }
    }
}
