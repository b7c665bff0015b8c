//! Per-request construction of the index patterns service.

use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, instrument};

use crate::adapters::{IndexPatternsApiServer, SavedObjectsClientServerToCommon, UiSettingsServerToCommon};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{
    IndexPatternsConfig, Notification, OnError, OnNotification, OnUnsupportedTimePattern,
    UnsupportedTimePattern,
};
use crate::domain::ports::{FieldFormatsStart, Level, Logger};
use crate::platform::elasticsearch::ElasticsearchClient;
use crate::platform::saved_objects::SavedObjectsClient;
use crate::platform::ui_settings::UiSettingsServiceStart;
use crate::services::index_patterns_service::{IndexPatternsService, IndexPatternsServiceDeps};

/// Collaborators captured when the platform starts.
#[derive(Clone)]
pub struct IndexPatternsServiceFactoryConfig {
    pub logger: Arc<dyn Logger>,
    pub ui_settings: Arc<dyn UiSettingsServiceStart>,
    pub field_formats: Arc<dyn FieldFormatsStart>,
    pub options: IndexPatternsConfig,
}

/// Builds a fresh [`IndexPatternsService`] for each pair of scoped clients.
#[derive(Clone)]
pub struct IndexPatternsServiceFactory {
    config: Arc<IndexPatternsServiceFactoryConfig>,
}

impl std::fmt::Debug for IndexPatternsServiceFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexPatternsServiceFactory")
            .field("options", &self.config.options)
            .finish_non_exhaustive()
    }
}

/// Text logged when a pattern still uses a legacy time-interval title.
pub fn unsupported_time_pattern_message(event: &UnsupportedTimePattern) -> String {
    format!(
        "Currently querying all indices matching {}. {} should be migrated to a wildcard-based index pattern.",
        event.index, event.title
    )
}

/// Text logged for a notification.
pub fn notification_message(notification: &Notification) -> String {
    format!("{} : {}", notification.title, notification.text)
}

impl IndexPatternsServiceFactory {
    pub fn new(config: IndexPatternsServiceFactoryConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &IndexPatternsServiceFactoryConfig {
        &self.config
    }

    /// Scope settings to `saved_objects_client`, resolve field formats for
    /// them, and assemble the service. Either failure aborts construction.
    #[instrument(skip_all)]
    pub async fn create(
        &self,
        saved_objects_client: Arc<dyn SavedObjectsClient>,
        elasticsearch_client: Arc<dyn ElasticsearchClient>,
    ) -> DomainResult<IndexPatternsService> {
        let ui_settings = self
            .config
            .ui_settings
            .as_scoped_to_client(Arc::clone(&saved_objects_client))
            .map_err(|err| DomainError::SettingsUnavailable(err.to_string()))?;

        let field_formats = self
            .config
            .field_formats
            .field_format_service_factory(Arc::clone(&ui_settings))
            .await?;

        let logger = &self.config.logger;

        let on_error: OnError = {
            let logger = Arc::clone(logger);
            Arc::new(move |error: &DomainError| logger.error(&error.to_string()))
        };

        let on_notification: OnNotification = {
            let logger = Arc::clone(logger);
            Arc::new(move |notification: Notification| {
                logger.warn(&notification_message(&notification));
            })
        };

        let on_unsupported_time_pattern: OnUnsupportedTimePattern = {
            let logger = Arc::clone(logger);
            Arc::new(move |event: UnsupportedTimePattern| {
                let fields = event
                    .id
                    .as_ref()
                    .map(|id| HashMap::from([("index_pattern_id".to_string(), id.clone().into())]))
                    .unwrap_or_default();
                logger.log(Level::Warn, &unsupported_time_pattern_message(&event), fields);
            })
        };

        debug!("index patterns service created");
        Ok(IndexPatternsService::new(IndexPatternsServiceDeps {
            ui_settings: Arc::new(UiSettingsServerToCommon::new(ui_settings)),
            saved_objects_client: Arc::new(SavedObjectsClientServerToCommon::new(Arc::clone(
                &saved_objects_client,
            ))),
            api_client: Arc::new(IndexPatternsApiServer::new(elasticsearch_client, saved_objects_client)),
            field_formats,
            on_error,
            on_notification,
            on_unsupported_time_pattern,
            per_page: self.config.options.per_page,
            allow_no_index: self.config.options.allow_no_index,
        }))
    }
}
