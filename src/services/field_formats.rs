//! Field formats start contract resolving a registry from settings.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::field_formats::{FieldFormatsRegistry, BUILTIN_FORMAT_IDS};
use crate::domain::ports::{FieldFormatsStart, FORMAT_DEFAULT_TYPE_MAP_SETTING};
use crate::platform::ui_settings::UiSettingsClient;

/// Builds a registry per settings scope from `format:defaultTypeMap`.
#[derive(Debug, Clone)]
pub struct FieldFormatsService {
    registered: Vec<String>,
}

impl FieldFormatsService {
    pub fn new<I, S>(registered: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            registered: registered.into_iter().map(Into::into).collect(),
        }
    }

    pub fn registered(&self) -> &[String] {
        &self.registered
    }
}

impl Default for FieldFormatsService {
    fn default() -> Self {
        Self::new(BUILTIN_FORMAT_IDS.iter().copied())
    }
}

#[async_trait]
impl FieldFormatsStart for FieldFormatsService {
    async fn field_format_service_factory(
        &self,
        ui_settings: Arc<dyn UiSettingsClient>,
    ) -> DomainResult<Arc<FieldFormatsRegistry>> {
        let setting = ui_settings
            .get(FORMAT_DEFAULT_TYPE_MAP_SETTING)
            .await
            .map_err(|err| DomainError::SettingsUnavailable(err.to_string()))?;

        let registered: Vec<&str> = self.registered.iter().map(String::as_str).collect();
        let registry = match setting {
            Some(value) if !value.is_null() => FieldFormatsRegistry::from_setting(&registered, &value)
                .map_err(|err| match err {
                    DomainError::FieldFormats(_) => err,
                    other => DomainError::FieldFormats(other.to_string()),
                })?,
            _ => FieldFormatsRegistry::default(),
        };

        debug!(formats = registered.len(), "resolved field formats registry");
        Ok(Arc::new(registry))
    }
}
