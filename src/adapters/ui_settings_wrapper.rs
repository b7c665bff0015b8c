//! Settings shim over the platform UI settings client.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::ports::UiSettingsCommon;
use crate::platform::errors::PlatformError;
use crate::platform::ui_settings::UiSettingsClient;

pub struct UiSettingsServerToCommon {
    ui_settings: Arc<dyn UiSettingsClient>,
}

impl UiSettingsServerToCommon {
    pub fn new(ui_settings: Arc<dyn UiSettingsClient>) -> Self {
        Self { ui_settings }
    }
}

fn settings_error(err: PlatformError) -> DomainError {
    DomainError::SettingsUnavailable(err.to_string())
}

#[async_trait]
impl UiSettingsCommon for UiSettingsServerToCommon {
    async fn get(&self, key: &str) -> DomainResult<Option<Value>> {
        self.ui_settings.get(key).await.map_err(settings_error)
    }

    async fn get_all(&self) -> DomainResult<BTreeMap<String, Value>> {
        self.ui_settings.get_all().await.map_err(settings_error)
    }

    async fn set(&self, key: &str, value: Value) -> DomainResult<()> {
        self.ui_settings.set(key, value).await.map_err(settings_error)
    }

    async fn remove(&self, key: &str) -> DomainResult<()> {
        self.ui_settings.remove(key).await.map_err(settings_error)
    }
}
