//! Index pattern models.
//!
//! Two shapes exist: [`IndexPatternAttributes`] is what the `index-pattern`
//! saved object stores (nested collections are JSON-encoded strings), and
//! [`IndexPatternSpec`] is the decoded runtime shape the service works with.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::saved_object::SavedObject;

/// Serialized reference to a field formatter and its parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializedFieldFormat {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

/// A field known to an index pattern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldSpec {
    pub name: String,
    /// Field type, e.g. `string`, `number`, `date`, or `conflict`.
    #[serde(rename = "type")]
    pub field_type: String,
    #[serde(default)]
    pub es_types: Vec<String>,
    #[serde(default)]
    pub searchable: bool,
    #[serde(default)]
    pub aggregatable: bool,
    #[serde(default)]
    pub read_from_doc_values: bool,
    #[serde(default)]
    pub scripted: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,
    #[serde(default)]
    pub count: u64,
    /// Types per index when the field is in conflict.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conflict_descriptions: Option<BTreeMap<String, Vec<String>>>,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, field_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            field_type: field_type.into(),
            es_types: Vec::new(),
            searchable: false,
            aggregatable: false,
            read_from_doc_values: false,
            scripted: false,
            script: None,
            lang: None,
            count: 0,
            conflict_descriptions: None,
        }
    }

    pub fn scripted(name: impl Into<String>, field_type: impl Into<String>, script: impl Into<String>) -> Self {
        Self {
            scripted: true,
            script: Some(script.into()),
            lang: Some("painless".to_string()),
            searchable: true,
            aggregatable: true,
            ..Self::new(name, field_type)
        }
    }
}

/// Runtime field definition stored on the index pattern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuntimeField {
    #[serde(rename = "type")]
    pub field_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script: Option<RuntimeFieldScript>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeFieldScript {
    pub source: String,
}

/// Source filter entry excluding fields from `_source` display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFilter {
    pub value: String,
}

/// Persisted attributes of an `index-pattern` saved object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexPatternAttributes {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_field_name: Option<String>,
    /// Legacy time-interval pattern name, e.g. `daily`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval_name: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub pattern_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_filters: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_format_map: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runtime_field_map: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_no_index: Option<bool>,
}

/// Decoded index pattern.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexPatternSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_field_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval_name: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub pattern_type: Option<String>,
    #[serde(default)]
    pub fields: BTreeMap<String, FieldSpec>,
    #[serde(default)]
    pub source_filters: Vec<SourceFilter>,
    #[serde(default)]
    pub field_formats: BTreeMap<String, SerializedFieldFormat>,
    #[serde(default)]
    pub runtime_field_map: BTreeMap<String, RuntimeField>,
    #[serde(default)]
    pub allow_no_index: bool,
}

impl IndexPatternSpec {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn with_time_field(mut self, field: impl Into<String>) -> Self {
        self.time_field_name = Some(field.into());
        self
    }

    pub fn with_fields(mut self, fields: impl IntoIterator<Item = FieldSpec>) -> Self {
        self.fields = fields.into_iter().map(|f| (f.name.clone(), f)).collect();
        self
    }

    /// Decode a stored `index-pattern` saved object.
    pub fn from_saved_object(object: &SavedObject) -> DomainResult<Self> {
        let attributes: IndexPatternAttributes = serde_json::from_value(object.attributes.clone())
            .map_err(|e| {
                DomainError::InvalidIndexPattern(format!("{}: {e}", object.id))
            })?;

        let fields: Vec<FieldSpec> = decode_json_attr(attributes.fields.as_deref())?;

        Ok(Self {
            id: Some(object.id.clone()),
            version: object.version.clone(),
            title: attributes.title,
            time_field_name: attributes.time_field_name,
            interval_name: attributes.interval_name,
            pattern_type: attributes.pattern_type,
            fields: fields.into_iter().map(|f| (f.name.clone(), f)).collect(),
            source_filters: decode_json_attr(attributes.source_filters.as_deref())?,
            field_formats: decode_json_attr(attributes.field_format_map.as_deref())?,
            runtime_field_map: decode_json_attr(attributes.runtime_field_map.as_deref())?,
            allow_no_index: attributes.allow_no_index.unwrap_or(false),
        })
    }

    /// Encode into the persisted attribute shape.
    pub fn to_attributes(&self) -> DomainResult<IndexPatternAttributes> {
        let fields: Vec<&FieldSpec> = self.fields.values().collect();
        Ok(IndexPatternAttributes {
            title: self.title.clone(),
            time_field_name: self.time_field_name.clone(),
            interval_name: self.interval_name.clone(),
            pattern_type: self.pattern_type.clone(),
            fields: Some(serde_json::to_string(&fields)?),
            source_filters: encode_non_empty(&self.source_filters, self.source_filters.is_empty())?,
            field_format_map: encode_non_empty(&self.field_formats, self.field_formats.is_empty())?,
            runtime_field_map: encode_non_empty(
                &self.runtime_field_map,
                self.runtime_field_map.is_empty(),
            )?,
            allow_no_index: self.allow_no_index.then_some(true),
        })
    }
}

fn decode_json_attr<T>(raw: Option<&str>) -> DomainResult<T>
where
    T: serde::de::DeserializeOwned + Default,
{
    match raw {
        Some(text) if !text.trim().is_empty() => Ok(serde_json::from_str(text)?),
        _ => Ok(T::default()),
    }
}

fn encode_non_empty<T: Serialize>(value: &T, empty: bool) -> DomainResult<Option<String>> {
    if empty {
        return Ok(None);
    }
    Ok(Some(serde_json::to_string(value)?))
}

/// Id and title pair used by list endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexPatternListItem {
    pub id: String,
    pub title: String,
}

/// A loaded index pattern.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexPattern {
    spec: IndexPatternSpec,
}

impl IndexPattern {
    pub const fn new(spec: IndexPatternSpec) -> Self {
        Self { spec }
    }

    pub fn id(&self) -> Option<&str> {
        self.spec.id.as_deref()
    }

    pub fn title(&self) -> &str {
        &self.spec.title
    }

    pub fn version(&self) -> Option<&str> {
        self.spec.version.as_deref()
    }

    pub fn spec(&self) -> &IndexPatternSpec {
        &self.spec
    }

    pub fn into_spec(self) -> IndexPatternSpec {
        self.spec
    }

    pub fn is_time_based(&self) -> bool {
        self.spec.time_field_name.is_some()
    }

    /// Whether this pattern still uses a legacy time-interval title.
    pub fn is_time_interval_based(&self) -> bool {
        self.spec
            .interval_name
            .as_deref()
            .is_some_and(|name| !name.is_empty())
    }

    pub fn get_field(&self, name: &str) -> Option<&FieldSpec> {
        self.spec.fields.get(name)
    }

    pub fn fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.spec.fields.values()
    }

    pub fn scripted_fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.spec.fields.values().filter(|f| f.scripted)
    }

    pub fn runtime_fields(&self) -> &BTreeMap<String, RuntimeField> {
        &self.spec.runtime_field_map
    }

    pub fn set_fields(&mut self, fields: Vec<FieldSpec>) {
        // Scripted fields are user-defined and survive a refresh.
        let scripted: Vec<FieldSpec> = self.scripted_fields().cloned().collect();
        self.spec.fields = fields
            .into_iter()
            .chain(scripted)
            .map(|f| (f.name.clone(), f))
            .collect();
    }

    pub(crate) fn set_saved(&mut self, id: String, version: Option<String>) {
        self.spec.id = Some(id);
        self.spec.version = version;
    }

    /// Index expression actually queried.
    ///
    /// For legacy time-interval titles such as `[logstash-]YYYY.MM.DD` the
    /// bracketed literals are kept and every date token run becomes `*`,
    /// giving `logstash-*`.
    pub fn index(&self) -> String {
        if self.is_time_interval_based() {
            time_pattern_to_wildcard(&self.spec.title)
        } else {
            self.spec.title.clone()
        }
    }
}

/// Convert a bracket-quoted time pattern into a wildcard expression.
pub fn time_pattern_to_wildcard(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len());
    let mut in_literal = false;

    for ch in pattern.chars() {
        match ch {
            '[' if !in_literal => in_literal = true,
            ']' if in_literal => in_literal = false,
            _ if in_literal => out.push(ch),
            _ => {
                if !out.ends_with('*') {
                    out.push('*');
                }
            }
        }
    }
    out
}
