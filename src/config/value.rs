//! Configuration values and ordered mappings.

use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use std::fmt;
use std::path::{Path, PathBuf};

/// A single configuration value.
///
/// Function bindings and path expressions are never evaluated by the resolver;
/// they are carried as [`OpaqueRef`]s and bound by whoever consumes them.
#[derive(Debug, Clone)]
pub enum ConfigValue {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Sequence(Vec<ConfigValue>),
    Mapping(Mapping),
    Opaque(OpaqueRef),
}

// Floats compare by bit pattern so a `.nan` read twice is still equal.
impl PartialEq for ConfigValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ConfigValue::Null, ConfigValue::Null) => true,
            (ConfigValue::Bool(a), ConfigValue::Bool(b)) => a == b,
            (ConfigValue::Integer(a), ConfigValue::Integer(b)) => a == b,
            (ConfigValue::Float(a), ConfigValue::Float(b)) => a.to_bits() == b.to_bits(),
            (ConfigValue::String(a), ConfigValue::String(b)) => a == b,
            (ConfigValue::Sequence(a), ConfigValue::Sequence(b)) => a == b,
            (ConfigValue::Mapping(a), ConfigValue::Mapping(b)) => a == b,
            (ConfigValue::Opaque(a), ConfigValue::Opaque(b)) => a == b,
            _ => false,
        }
    }
}

impl ConfigValue {
    /// Short type name used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            ConfigValue::Null => "null",
            ConfigValue::Bool(_) => "boolean",
            ConfigValue::Integer(_) => "integer",
            ConfigValue::Float(_) => "float",
            ConfigValue::String(_) => "string",
            ConfigValue::Sequence(_) => "sequence",
            ConfigValue::Mapping(_) => "mapping",
            ConfigValue::Opaque(_) => "opaque reference",
        }
    }

    pub fn as_mapping(&self) -> Option<&Mapping> {
        match self {
            ConfigValue::Mapping(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConfigValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ConfigValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ConfigValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, ConfigValue::Null)
    }
}

impl From<&str> for ConfigValue {
    fn from(value: &str) -> Self {
        ConfigValue::String(value.to_string())
    }
}

impl From<String> for ConfigValue {
    fn from(value: String) -> Self {
        ConfigValue::String(value)
    }
}

impl From<i64> for ConfigValue {
    fn from(value: i64) -> Self {
        ConfigValue::Integer(value)
    }
}

impl From<bool> for ConfigValue {
    fn from(value: bool) -> Self {
        ConfigValue::Bool(value)
    }
}

impl From<f64> for ConfigValue {
    fn from(value: f64) -> Self {
        ConfigValue::Float(value)
    }
}

impl From<Mapping> for ConfigValue {
    fn from(value: Mapping) -> Self {
        ConfigValue::Mapping(value)
    }
}

impl From<OpaqueRef> for ConfigValue {
    fn from(value: OpaqueRef) -> Self {
        ConfigValue::Opaque(value)
    }
}

impl fmt::Display for ConfigValue {
    /// Scalars print bare; structured values print as compact JSON.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigValue::Null => f.write_str("null"),
            ConfigValue::Bool(b) => write!(f, "{b}"),
            ConfigValue::Integer(i) => write!(f, "{i}"),
            ConfigValue::Float(x) => write!(f, "{x}"),
            ConfigValue::String(s) => f.write_str(s),
            ConfigValue::Opaque(r) => write!(f, "{r}"),
            ConfigValue::Sequence(_) | ConfigValue::Mapping(_) => {
                let json = serde_json::to_string(self).map_err(|_| fmt::Error)?;
                f.write_str(&json)
            }
        }
    }
}

/// What an opaque reference stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpaqueKind {
    /// A path expression, relative to the declaring source's directory.
    Path,
    /// A named function or module binding.
    Function,
}

impl OpaqueKind {
    /// Marker key used to declare the reference in a source file.
    pub fn marker(&self) -> &'static str {
        match self {
            OpaqueKind::Path => "$path",
            OpaqueKind::Function => "$fn",
        }
    }

    pub fn from_marker(marker: &str) -> Option<Self> {
        match marker {
            "$path" => Some(OpaqueKind::Path),
            "$fn" => Some(OpaqueKind::Function),
            _ => None,
        }
    }
}

/// An unevaluated reference to something outside the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpaqueRef {
    pub kind: OpaqueKind,
    pub target: String,
    /// Directory of the source that declared the reference, if it came from a file.
    pub origin: Option<PathBuf>,
}

impl OpaqueRef {
    pub fn path(target: impl Into<String>) -> Self {
        Self { kind: OpaqueKind::Path, target: target.into(), origin: None }
    }

    pub fn function(target: impl Into<String>) -> Self {
        Self { kind: OpaqueKind::Function, target: target.into(), origin: None }
    }

    pub fn with_origin(mut self, origin: impl Into<PathBuf>) -> Self {
        self.origin = Some(origin.into());
        self
    }

    /// Bind a path reference against its origin directory.
    ///
    /// Returns `None` for non-path references.
    pub fn expand_path(&self) -> Option<PathBuf> {
        if self.kind != OpaqueKind::Path {
            return None;
        }
        let target = Path::new(&self.target);
        match &self.origin {
            Some(dir) if target.is_relative() => Some(dir.join(target)),
            _ => Some(target.to_path_buf()),
        }
    }
}

impl fmt::Display for OpaqueRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind.marker(), self.target)
    }
}

impl Serialize for OpaqueRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(self.kind.marker(), &self.target)?;
        map.end()
    }
}

/// An insertion-ordered string-keyed mapping.
///
/// Config mappings are small, so lookups are linear scans.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mapping {
    entries: Vec<(String, ConfigValue)>,
}

impl Mapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut ConfigValue> {
        self.entries.iter_mut().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Insert or replace. A replaced key keeps its original position.
    pub fn insert(&mut self, key: impl Into<String>, value: ConfigValue) -> Option<ConfigValue> {
        let key = key.into();
        match self.get_mut(&key) {
            Some(slot) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<ConfigValue> {
        let idx = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(idx).1)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ConfigValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Walk nested mappings along `segments`.
    pub fn lookup<'a, I>(&self, segments: I) -> Option<&ConfigValue>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut segments = segments.into_iter();
        let mut current = self.get(segments.next()?)?;
        for segment in segments {
            current = current.as_mapping()?.get(segment)?;
        }
        Some(current)
    }
}

impl<K: Into<String>> FromIterator<(K, ConfigValue)> for Mapping {
    fn from_iter<T: IntoIterator<Item = (K, ConfigValue)>>(iter: T) -> Self {
        let mut mapping = Mapping::new();
        for (k, v) in iter {
            mapping.insert(k, v);
        }
        mapping
    }
}

impl IntoIterator for Mapping {
    type Item = (String, ConfigValue);
    type IntoIter = std::vec::IntoIter<(String, ConfigValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl Serialize for Mapping {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

impl Serialize for ConfigValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ConfigValue::Null => serializer.serialize_unit(),
            ConfigValue::Bool(b) => serializer.serialize_bool(*b),
            ConfigValue::Integer(i) => serializer.serialize_i64(*i),
            ConfigValue::Float(x) => serializer.serialize_f64(*x),
            ConfigValue::String(s) => serializer.serialize_str(s),
            ConfigValue::Sequence(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            ConfigValue::Mapping(m) => m.serialize(serializer),
            ConfigValue::Opaque(r) => r.serialize(serializer),
        }
    }
}
