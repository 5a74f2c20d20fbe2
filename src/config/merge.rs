//! Deep merge of an override document onto a base document.
//!
//! Mappings merge key by key; anything else in the override replaces the base
//! value outright. A `null` in the override removes the key.

use super::document::ConfigDocument;
use super::value::{ConfigValue, Mapping};

/// Merge `overlay` onto `base` without touching either input.
///
/// Keys keep the base's order; keys only the overlay defines are appended in
/// the overlay's order.
pub fn merge_documents(base: &ConfigDocument, overlay: &ConfigDocument) -> Mapping {
    merge_mappings(base.as_mapping(), overlay.as_mapping())
}

pub fn merge_mappings(base: &Mapping, overlay: &Mapping) -> Mapping {
    let mut merged = Mapping::new();

    for (key, base_value) in base.iter() {
        match overlay.get(key) {
            None => {
                merged.insert(key, base_value.clone());
            }
            Some(ConfigValue::Null) => {}
            Some(over) => {
                merged.insert(key, merge_values(base_value, over));
            }
        }
    }

    for (key, over) in overlay.iter() {
        if base.contains_key(key) || over.is_null() {
            continue;
        }
        merged.insert(key, strip_nulls(over));
    }

    merged
}

fn merge_values(base: &ConfigValue, overlay: &ConfigValue) -> ConfigValue {
    match (base, overlay) {
        (ConfigValue::Mapping(b), ConfigValue::Mapping(o)) => ConfigValue::Mapping(merge_mappings(b, o)),
        (_, over) => strip_nulls(over),
    }
}

/// Removal markers have nothing to remove inside a subtree the base never had.
fn strip_nulls(value: &ConfigValue) -> ConfigValue {
    match value {
        ConfigValue::Mapping(m) => ConfigValue::Mapping(
            m.iter().filter(|(_, v)| !v.is_null()).map(|(k, v)| (k, strip_nulls(v))).collect(),
        ),
        other => other.clone(),
    }
}
