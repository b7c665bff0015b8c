//! Field formats registry resolved per settings scope.

use serde_json::{json, Value};
use std::collections::{BTreeMap, BTreeSet};

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::index_pattern::SerializedFieldFormat;

/// Formatter ids known to the platform.
pub const BUILTIN_FORMAT_IDS: &[&str] = &[
    "_source",
    "boolean",
    "bytes",
    "color",
    "date",
    "date_nanos",
    "duration",
    "histogram",
    "ip",
    "number",
    "percent",
    "relative_date",
    "static_lookup",
    "string",
    "truncate",
    "url",
];

/// Key of the fallback entry in a default type map.
pub const DEFAULT_TYPE_KEY: &str = "_default_";

/// Built-in value of the `format:defaultTypeMap` setting.
pub fn default_type_map() -> Value {
    json!({
        "ip": { "id": "ip", "params": {} },
        "date": { "id": "date", "params": {} },
        "date_nanos": { "id": "date_nanos", "params": {} },
        "number": { "id": "number", "params": {} },
        "boolean": { "id": "boolean", "params": {} },
        "histogram": { "id": "histogram", "params": {} },
        "_source": { "id": "_source", "params": {} },
        "_default_": { "id": "string", "params": {} }
    })
}

/// Registered formatters plus the default formatter per field type.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldFormatsRegistry {
    registered: BTreeSet<String>,
    default_map: BTreeMap<String, SerializedFieldFormat>,
}

impl FieldFormatsRegistry {
    /// Build a registry, rejecting defaults that point at unknown formatters.
    pub fn new<I, S>(registered: I, default_map: BTreeMap<String, SerializedFieldFormat>) -> DomainResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let registered: BTreeSet<String> = registered.into_iter().map(Into::into).collect();

        if let Some((field_type, format)) = default_map
            .iter()
            .find(|(_, format)| !registered.contains(&format.id))
        {
            return Err(DomainError::FieldFormats(format!(
                "default format for '{field_type}' references unknown formatter '{}'",
                format.id
            )));
        }

        if !default_map.contains_key(DEFAULT_TYPE_KEY) {
            return Err(DomainError::FieldFormats(format!(
                "default type map is missing the '{DEFAULT_TYPE_KEY}' entry"
            )));
        }

        Ok(Self {
            registered,
            default_map,
        })
    }

    /// Parse a `format:defaultTypeMap` value (an object, or its JSON text).
    pub fn from_setting(registered: &[&str], setting: &Value) -> DomainResult<Self> {
        let map: BTreeMap<String, SerializedFieldFormat> = match setting {
            Value::String(text) => serde_json::from_str(text)?,
            other => serde_json::from_value(other.clone())?,
        };
        Self::new(registered.iter().copied(), map)
    }

    pub fn has(&self, id: &str) -> bool {
        self.registered.contains(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.registered.iter().map(String::as_str)
    }

    /// Default formatter for a field, preferring an Elasticsearch type entry.
    pub fn default_config(&self, field_type: &str, es_types: &[String]) -> SerializedFieldFormat {
        es_types
            .iter()
            .find_map(|es_type| self.default_map.get(es_type))
            .or_else(|| self.default_map.get(field_type))
            .or_else(|| self.default_map.get(DEFAULT_TYPE_KEY))
            .cloned()
            .unwrap_or_else(|| SerializedFieldFormat {
                id: "string".to_string(),
                params: None,
            })
    }

    /// Validate a stored format reference against the registry.
    pub fn resolve(&self, format: &SerializedFieldFormat) -> DomainResult<SerializedFieldFormat> {
        if self.has(&format.id) {
            Ok(format.clone())
        } else {
            Err(DomainError::FieldFormats(format!(
                "unknown field formatter '{}'",
                format.id
            )))
        }
    }
}

impl Default for FieldFormatsRegistry {
    fn default() -> Self {
        let default_map = serde_json::from_value(default_type_map()).unwrap_or_default();
        Self {
            registered: BUILTIN_FORMAT_IDS.iter().map(|s| (*s).to_string()).collect(),
            default_map,
        }
    }
}
