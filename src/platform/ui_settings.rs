//! UI settings start contract.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::platform::errors::PlatformResult;
use crate::platform::saved_objects::SavedObjectsClient;

/// Settings client bound to one saved objects client.
#[async_trait]
pub trait UiSettingsClient: Send + Sync {
    /// User value if set, otherwise the registered default.
    async fn get(&self, key: &str) -> PlatformResult<Option<Value>>;

    /// Every registered setting with user values applied.
    async fn get_all(&self) -> PlatformResult<BTreeMap<String, Value>>;

    /// Only the values the user has set.
    async fn get_user_provided(&self) -> PlatformResult<BTreeMap<String, Value>>;

    async fn set(&self, key: &str, value: Value) -> PlatformResult<()>;

    async fn remove(&self, key: &str) -> PlatformResult<()>;
}

pub trait UiSettingsServiceStart: Send + Sync {
    /// Scope a settings client to the storage reachable through `client`.
    fn as_scoped_to_client(
        &self,
        client: Arc<dyn SavedObjectsClient>,
    ) -> PlatformResult<Arc<dyn UiSettingsClient>>;
}
