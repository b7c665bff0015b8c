//! Saved object shapes shared by the platform and the index patterns service.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeMap;

/// Saved object type name under which index patterns are persisted.
pub const INDEX_PATTERN_SAVED_OBJECT_TYPE: &str = "index-pattern";

/// A persisted document with untyped attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedObject {
    pub id: String,
    #[serde(rename = "type")]
    pub object_type: String,
    pub attributes: Value,
    #[serde(default)]
    pub references: Vec<SavedObjectReference>,
    /// Opaque version token; absent on objects that were never persisted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl SavedObject {
    /// Title attribute, when the document carries one.
    pub fn title(&self) -> Option<&str> {
        self.attributes.get("title").and_then(Value::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedObjectReference {
    pub name: String,
    #[serde(rename = "type")]
    pub object_type: String,
    pub id: String,
}

/// Options for listing saved objects of one type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FindOptions {
    pub object_type: String,
    /// Attribute names to return. Empty means all attributes.
    pub fields: Vec<String>,
    /// Search expression. A quoted value matches exactly, otherwise by prefix.
    pub search: Option<String>,
    pub search_fields: Vec<String>,
    pub per_page: usize,
}

impl FindOptions {
    pub fn new(object_type: impl Into<String>) -> Self {
        Self {
            object_type: object_type.into(),
            fields: Vec::new(),
            search: None,
            search_fields: Vec::new(),
            per_page: 10_000,
        }
    }

    pub fn with_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_search(mut self, search: impl Into<String>, field: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self.search_fields = vec![field.into()];
        self
    }

    pub const fn with_per_page(mut self, per_page: usize) -> Self {
        self.per_page = per_page;
        self
    }
}

/// Options for creating a saved object.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateOptions {
    pub id: Option<String>,
    pub overwrite: bool,
}

/// Options for updating a saved object.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateOptions {
    /// Expected current version; a mismatch is a conflict.
    pub version: Option<String>,
}

/// How a saved object type is scoped across spaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NamespaceType {
    Single,
    Multiple,
    Agnostic,
}

/// Management UI metadata for a saved object type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedObjectTypeManagement {
    pub icon: String,
    pub default_search_field: String,
    pub importable_and_exportable: bool,
    /// Edit URL template; `{id}` is replaced with the object id.
    pub edit_url: String,
    /// In-app URL template; `{id}` is replaced with the object id.
    pub in_app_url: String,
    pub ui_capabilities_path: String,
}

impl SavedObjectTypeManagement {
    pub fn edit_url_for(&self, id: &str) -> String {
        self.edit_url.replace("{id}", id)
    }

    pub fn in_app_url_for(&self, id: &str) -> String {
        self.in_app_url.replace("{id}", id)
    }
}

/// Schema registered with the platform so its storage accepts a document type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedObjectTypeDefinition {
    pub name: String,
    pub hidden: bool,
    pub namespace_type: NamespaceType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub management: Option<SavedObjectTypeManagement>,
    /// Field mappings keyed by attribute name.
    pub mappings: BTreeMap<String, Value>,
    /// Whether attributes outside `mappings` are indexed.
    pub dynamic_mappings: bool,
}

impl SavedObjectTypeDefinition {
    pub fn mappings_json(&self) -> Value {
        json!({
            "dynamic": self.dynamic_mappings,
            "properties": self.mappings,
        })
    }
}

/// The `index-pattern` saved object type.
pub fn index_pattern_saved_object_type() -> SavedObjectTypeDefinition {
    let mut mappings = BTreeMap::new();
    mappings.insert("title".to_string(), json!({ "type": "text" }));
    mappings.insert("type".to_string(), json!({ "type": "keyword" }));

    SavedObjectTypeDefinition {
        name: INDEX_PATTERN_SAVED_OBJECT_TYPE.to_string(),
        hidden: false,
        namespace_type: NamespaceType::Single,
        management: Some(SavedObjectTypeManagement {
            icon: "indexPatternApp".to_string(),
            default_search_field: "title".to_string(),
            importable_and_exportable: true,
            edit_url: "/management/kibana/indexPatterns/patterns/{id}".to_string(),
            in_app_url: "/app/management/kibana/indexPatterns/patterns/{id}".to_string(),
            ui_capabilities_path: "management.kibana.indexPatterns".to_string(),
        }),
        mappings,
        dynamic_mappings: false,
    }
}
