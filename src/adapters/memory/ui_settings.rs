//! UI settings stored in the `config` saved object.

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::domain::models::field_formats::default_type_map;
use crate::domain::models::{CreateOptions, NamespaceType, SavedObjectTypeDefinition};
use crate::domain::ports::{DEFAULT_INDEX_SETTING, FORMAT_DEFAULT_TYPE_MAP_SETTING, META_FIELDS_SETTING};
use crate::platform::errors::PlatformResult;
use crate::platform::saved_objects::SavedObjectsClient;
use crate::platform::ui_settings::{UiSettingsClient, UiSettingsServiceStart};

/// Saved object type holding user setting values.
pub const CONFIG_SAVED_OBJECT_TYPE: &str = "config";
/// Id of the single settings document.
pub const CONFIG_SAVED_OBJECT_ID: &str = "default";

pub fn config_saved_object_type() -> SavedObjectTypeDefinition {
    SavedObjectTypeDefinition {
        name: CONFIG_SAVED_OBJECT_TYPE.to_string(),
        hidden: false,
        namespace_type: NamespaceType::Single,
        management: None,
        mappings: BTreeMap::from([("buildNum".to_string(), json!({ "type": "keyword" }))]),
        dynamic_mappings: false,
    }
}

/// Registered defaults for the settings the index patterns service reads.
pub fn default_settings() -> BTreeMap<String, Value> {
    BTreeMap::from([
        (DEFAULT_INDEX_SETTING.to_string(), Value::Null),
        (
            META_FIELDS_SETTING.to_string(),
            json!(["_source", "_id", "_type", "_index", "_score"]),
        ),
        (FORMAT_DEFAULT_TYPE_MAP_SETTING.to_string(), default_type_map()),
    ])
}

/// Settings service whose clients persist through the given saved objects client.
#[derive(Debug, Clone)]
pub struct InMemoryUiSettingsService {
    defaults: Arc<BTreeMap<String, Value>>,
}

impl InMemoryUiSettingsService {
    /// Registered defaults with `overrides` applied on top.
    pub fn new(overrides: &BTreeMap<String, Value>) -> Self {
        let mut defaults = default_settings();
        defaults.extend(overrides.iter().map(|(k, v)| (k.clone(), v.clone())));
        Self {
            defaults: Arc::new(defaults),
        }
    }
}

impl Default for InMemoryUiSettingsService {
    fn default() -> Self {
        Self::new(&BTreeMap::new())
    }
}

impl UiSettingsServiceStart for InMemoryUiSettingsService {
    fn as_scoped_to_client(
        &self,
        client: Arc<dyn SavedObjectsClient>,
    ) -> PlatformResult<Arc<dyn UiSettingsClient>> {
        Ok(Arc::new(InMemoryUiSettingsClient {
            client,
            defaults: Arc::clone(&self.defaults),
        }))
    }
}

pub struct InMemoryUiSettingsClient {
    client: Arc<dyn SavedObjectsClient>,
    defaults: Arc<BTreeMap<String, Value>>,
}

impl InMemoryUiSettingsClient {
    async fn write(&self, values: BTreeMap<String, Value>) -> PlatformResult<()> {
        let attributes: Map<String, Value> = values.into_iter().collect();
        self.client
            .create(
                CONFIG_SAVED_OBJECT_TYPE,
                Value::Object(attributes),
                &CreateOptions {
                    id: Some(CONFIG_SAVED_OBJECT_ID.to_string()),
                    overwrite: true,
                },
            )
            .await?;
        Ok(())
    }
}

#[async_trait]
impl UiSettingsClient for InMemoryUiSettingsClient {
    async fn get(&self, key: &str) -> PlatformResult<Option<Value>> {
        let mut user = self.get_user_provided().await?;
        Ok(user.remove(key).or_else(|| self.defaults.get(key).cloned()))
    }

    async fn get_all(&self) -> PlatformResult<BTreeMap<String, Value>> {
        let mut all = (*self.defaults).clone();
        all.extend(self.get_user_provided().await?);
        Ok(all)
    }

    async fn get_user_provided(&self) -> PlatformResult<BTreeMap<String, Value>> {
        match self
            .client
            .get(CONFIG_SAVED_OBJECT_TYPE, CONFIG_SAVED_OBJECT_ID)
            .await
        {
            Ok(object) => Ok(object
                .attributes
                .as_object()
                .map(|map| map.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
                .unwrap_or_default()),
            Err(err) if err.is_not_found() => Ok(BTreeMap::new()),
            Err(err) => Err(err),
        }
    }

    async fn set(&self, key: &str, value: Value) -> PlatformResult<()> {
        let mut user = self.get_user_provided().await?;
        user.insert(key.to_string(), value);
        self.write(user).await
    }

    async fn remove(&self, key: &str) -> PlatformResult<()> {
        let mut user = self.get_user_provided().await?;
        if user.remove(key).is_some() {
            self.write(user).await?;
        }
        Ok(())
    }
}
