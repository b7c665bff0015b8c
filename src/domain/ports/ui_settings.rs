//! Settings port used by the index patterns service.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeMap;

use crate::domain::errors::DomainResult;

/// Id of the index pattern used when none is requested explicitly.
pub const DEFAULT_INDEX_SETTING: &str = "defaultIndex";
/// Fields reported for every pattern regardless of mappings.
pub const META_FIELDS_SETTING: &str = "metaFields";
/// Default formatter per field type.
pub const FORMAT_DEFAULT_TYPE_MAP_SETTING: &str = "format:defaultTypeMap";

/// Settings access as the index patterns service expects it.
#[async_trait]
pub trait UiSettingsCommon: Send + Sync {
    /// Effective value of a setting (user value, else registered default).
    async fn get(&self, key: &str) -> DomainResult<Option<Value>>;

    async fn get_all(&self) -> DomainResult<BTreeMap<String, Value>>;

    async fn set(&self, key: &str, value: Value) -> DomainResult<()>;

    /// Drop the user value so the default applies again.
    async fn remove(&self, key: &str) -> DomainResult<()>;
}
