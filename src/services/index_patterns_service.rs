//! Per-request index patterns service.
//!
//! Built by [`IndexPatternsServiceFactory`](crate::services::IndexPatternsServiceFactory)
//! for one request and dropped with it. Nothing is cached between calls.

use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, instrument};

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{
    CreateOptions, FieldFormatsRegistry, FieldSpec, FindOptions, IndexPattern, IndexPatternListItem,
    IndexPatternSpec, Notification, OnError, OnNotification, OnUnsupportedTimePattern,
    SerializedFieldFormat, UnsupportedTimePattern, UpdateOptions, INDEX_PATTERN_SAVED_OBJECT_TYPE,
};
use crate::domain::ports::{
    GetFieldsOptions, IndexPatternsApiClient, SavedObjectsClientCommon, UiSettingsCommon,
    DEFAULT_INDEX_SETTING, META_FIELDS_SETTING,
};

/// Everything a service instance is built from.
pub struct IndexPatternsServiceDeps {
    pub ui_settings: Arc<dyn UiSettingsCommon>,
    pub saved_objects_client: Arc<dyn SavedObjectsClientCommon>,
    pub api_client: Arc<dyn IndexPatternsApiClient>,
    pub field_formats: Arc<FieldFormatsRegistry>,
    pub on_error: OnError,
    pub on_notification: OnNotification,
    pub on_unsupported_time_pattern: OnUnsupportedTimePattern,
    /// Page size for saved object listings.
    pub per_page: usize,
    /// Tolerate patterns that match no index, whatever the pattern says.
    pub allow_no_index: bool,
}

pub struct IndexPatternsService {
    ui_settings: Arc<dyn UiSettingsCommon>,
    saved_objects_client: Arc<dyn SavedObjectsClientCommon>,
    api_client: Arc<dyn IndexPatternsApiClient>,
    field_formats: Arc<FieldFormatsRegistry>,
    on_error: OnError,
    on_notification: OnNotification,
    on_unsupported_time_pattern: OnUnsupportedTimePattern,
    per_page: usize,
    allow_no_index: bool,
}

impl std::fmt::Debug for IndexPatternsService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexPatternsService")
            .field("per_page", &self.per_page)
            .field("allow_no_index", &self.allow_no_index)
            .finish_non_exhaustive()
    }
}

impl IndexPatternsService {
    pub fn new(deps: IndexPatternsServiceDeps) -> Self {
        Self {
            ui_settings: deps.ui_settings,
            saved_objects_client: deps.saved_objects_client,
            api_client: deps.api_client,
            field_formats: deps.field_formats,
            on_error: deps.on_error,
            on_notification: deps.on_notification,
            on_unsupported_time_pattern: deps.on_unsupported_time_pattern,
            per_page: deps.per_page,
            allow_no_index: deps.allow_no_index,
        }
    }

    pub fn ui_settings(&self) -> &Arc<dyn UiSettingsCommon> {
        &self.ui_settings
    }

    pub fn saved_objects_client(&self) -> &Arc<dyn SavedObjectsClientCommon> {
        &self.saved_objects_client
    }

    pub fn api_client(&self) -> &Arc<dyn IndexPatternsApiClient> {
        &self.api_client
    }

    pub fn field_formats(&self) -> &Arc<FieldFormatsRegistry> {
        &self.field_formats
    }

    pub fn on_error(&self) -> &OnError {
        &self.on_error
    }

    pub fn on_notification(&self) -> &OnNotification {
        &self.on_notification
    }

    pub fn on_unsupported_time_pattern(&self) -> &OnUnsupportedTimePattern {
        &self.on_unsupported_time_pattern
    }

    async fn list(&self) -> DomainResult<Vec<IndexPatternListItem>> {
        let options = FindOptions::new(INDEX_PATTERN_SAVED_OBJECT_TYPE)
            .with_fields(["title"])
            .with_per_page(self.per_page);
        let objects = self.saved_objects_client.find(options).await?;
        Ok(objects
            .into_iter()
            .map(|object| IndexPatternListItem {
                title: object.title().unwrap_or_default().to_string(),
                id: object.id,
            })
            .collect())
    }

    /// Ids of every stored index pattern.
    pub async fn get_ids(&self) -> DomainResult<Vec<String>> {
        Ok(self.list().await?.into_iter().map(|item| item.id).collect())
    }

    /// Titles of every stored index pattern.
    pub async fn get_titles(&self) -> DomainResult<Vec<String>> {
        Ok(self.list().await?.into_iter().map(|item| item.title).collect())
    }

    pub async fn get_id_with_title(&self) -> DomainResult<Vec<IndexPatternListItem>> {
        self.list().await
    }

    /// Load up to `size` patterns whose title starts with `search`.
    #[instrument(skip(self))]
    pub async fn find(&self, search: &str, size: usize) -> DomainResult<Vec<IndexPattern>> {
        let options = FindOptions::new(INDEX_PATTERN_SAVED_OBJECT_TYPE)
            .with_fields(["title"])
            .with_search(search, "title")
            .with_per_page(size);
        let objects = self.saved_objects_client.find(options).await?;

        let mut patterns = Vec::with_capacity(objects.len());
        for object in objects {
            patterns.push(self.get(&object.id).await?);
        }
        Ok(patterns)
    }

    pub async fn get_default_id(&self) -> DomainResult<Option<String>> {
        Ok(self
            .ui_settings
            .get(DEFAULT_INDEX_SETTING)
            .await?
            .and_then(|value| value.as_str().map(str::to_string))
            .filter(|id| !id.is_empty()))
    }

    /// Make `id` the default pattern. Without `force` an existing default is kept.
    pub async fn set_default(&self, id: &str, force: bool) -> DomainResult<()> {
        if force || self.get_default_id().await?.is_none() {
            self.ui_settings
                .set(DEFAULT_INDEX_SETTING, Value::String(id.to_string()))
                .await?;
        }
        Ok(())
    }

    /// The `metaFields` setting.
    pub async fn meta_fields(&self) -> DomainResult<Vec<String>> {
        let value = self.ui_settings.get(META_FIELDS_SETTING).await?;
        Ok(value
            .and_then(|v| serde_json::from_value(v).ok())
            .unwrap_or_default())
    }

    /// Field listing with the `metaFields` setting applied.
    pub async fn get_fields_for_wildcard(
        &self,
        mut options: GetFieldsOptions,
    ) -> DomainResult<Vec<FieldSpec>> {
        options.meta_fields = self.meta_fields().await?;
        self.api_client.get_fields_for_wildcard(&options).await
    }

    /// Load a stored index pattern.
    #[instrument(skip(self))]
    pub async fn get(&self, id: &str) -> DomainResult<IndexPattern> {
        let object = self
            .saved_objects_client
            .get(INDEX_PATTERN_SAVED_OBJECT_TYPE, id)
            .await?;
        let mut pattern = IndexPattern::new(IndexPatternSpec::from_saved_object(&object)?);

        if pattern.is_time_interval_based() {
            (self.on_unsupported_time_pattern)(UnsupportedTimePattern {
                id: Some(id.to_string()),
                index: pattern.index(),
                title: pattern.title().to_string(),
            });
        }

        if pattern.fields().next().is_none() {
            self.refresh_fields(&mut pattern).await;
        }

        debug!(title = pattern.title(), "loaded index pattern");
        Ok(pattern)
    }

    /// Reload fields from the search API.
    ///
    /// Failures are reported through the callbacks and leave the current
    /// fields in place.
    pub async fn refresh_fields(&self, pattern: &mut IndexPattern) {
        match self.fetch_fields(pattern).await {
            Ok(fields) => pattern.set_fields(fields),
            Err(err @ DomainError::NoMatchingIndices(_)) => {
                (self.on_notification)(Notification::new(
                    err.to_string(),
                    format!("Index pattern {} has no matching indices", pattern.title()),
                ));
            }
            Err(err) => (self.on_error)(&err),
        }
    }

    async fn fetch_fields(&self, pattern: &IndexPattern) -> DomainResult<Vec<FieldSpec>> {
        let spec = pattern.spec();
        let options = GetFieldsOptions {
            pattern: pattern.index(),
            meta_fields: Vec::new(),
            pattern_type: spec.pattern_type.clone(),
            allow_no_index: spec.allow_no_index || self.allow_no_index,
        };
        self.get_fields_for_wildcard(options).await
    }

    /// Build an unsaved pattern, fetching its fields unless told not to.
    pub async fn create(&self, spec: IndexPatternSpec, skip_fetch_fields: bool) -> DomainResult<IndexPattern> {
        if spec.title.trim().is_empty() {
            return Err(DomainError::InvalidIndexPattern("title is required".to_string()));
        }
        let mut pattern = IndexPattern::new(spec);
        if !skip_fetch_fields {
            self.refresh_fields(&mut pattern).await;
        }
        Ok(pattern)
    }

    /// Create, persist, and make default if no default exists yet.
    #[instrument(skip(self, spec), fields(title = %spec.title))]
    pub async fn create_and_save(
        &self,
        spec: IndexPatternSpec,
        override_existing: bool,
        skip_fetch_fields: bool,
    ) -> DomainResult<IndexPattern> {
        let pattern = self.create(spec, skip_fetch_fields).await?;
        let pattern = self.create_saved_object(pattern, override_existing).await?;
        if let Some(id) = pattern.id() {
            self.set_default(id, false).await?;
        }
        Ok(pattern)
    }

    /// Persist a new pattern. A pattern with the same title is rejected
    /// unless `override_existing`, in which case it is replaced.
    pub async fn create_saved_object(
        &self,
        mut pattern: IndexPattern,
        override_existing: bool,
    ) -> DomainResult<IndexPattern> {
        let options = FindOptions::new(INDEX_PATTERN_SAVED_OBJECT_TYPE)
            .with_fields(["title"])
            .with_search(format!("\"{}\"", pattern.title()), "title")
            .with_per_page(self.per_page);
        let duplicates = self.saved_objects_client.find(options).await?;

        if !duplicates.is_empty() {
            if !override_existing {
                return Err(DomainError::DuplicateIndexPattern(pattern.title().to_string()));
            }
            for duplicate in duplicates {
                self.delete(&duplicate.id).await?;
            }
        }

        let attributes = serde_json::to_value(pattern.spec().to_attributes()?)?;
        let saved = self
            .saved_objects_client
            .create(
                INDEX_PATTERN_SAVED_OBJECT_TYPE,
                attributes,
                CreateOptions {
                    id: pattern.id().map(str::to_string),
                    overwrite: override_existing,
                },
            )
            .await?;
        pattern.set_saved(saved.id, saved.version);
        Ok(pattern)
    }

    /// Write a loaded pattern back; a stale version is a conflict.
    pub async fn update_saved_object(&self, pattern: &mut IndexPattern) -> DomainResult<()> {
        let id = pattern
            .id()
            .map(str::to_string)
            .ok_or_else(|| DomainError::InvalidIndexPattern("cannot update an unsaved index pattern".to_string()))?;
        let attributes = serde_json::to_value(pattern.spec().to_attributes()?)?;

        let saved = self
            .saved_objects_client
            .update(
                INDEX_PATTERN_SAVED_OBJECT_TYPE,
                &id,
                attributes,
                UpdateOptions {
                    version: pattern.version().map(str::to_string),
                },
            )
            .await?;
        pattern.set_saved(saved.id, saved.version);
        Ok(())
    }

    /// Delete a stored pattern, clearing the default if it pointed there.
    pub async fn delete(&self, id: &str) -> DomainResult<()> {
        self.saved_objects_client
            .delete(INDEX_PATTERN_SAVED_OBJECT_TYPE, id)
            .await?;
        if self.get_default_id().await?.as_deref() == Some(id) {
            self.ui_settings.remove(DEFAULT_INDEX_SETTING).await?;
        }
        Ok(())
    }

    /// Formatter for a field: the pattern override, else the type default.
    pub fn format_for_field(&self, pattern: &IndexPattern, field_name: &str) -> DomainResult<SerializedFieldFormat> {
        if let Some(format) = pattern.spec().field_formats.get(field_name) {
            return self.field_formats.resolve(format);
        }
        let field = pattern.get_field(field_name).ok_or_else(|| {
            DomainError::ValidationFailed(format!(
                "field {field_name} not found in index pattern {}",
                pattern.title()
            ))
        })?;
        Ok(self.field_formats.default_config(&field.field_type, &field.es_types))
    }
}
