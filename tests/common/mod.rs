//! Common test utilities for integration tests
//!
//! Provides platform fixtures and failing collaborators shared across
//! integration test files.
#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use index_patterns::adapters::memory::{InMemoryUiSettingsService, RecordingLogger};
use index_patterns::domain::errors::{DomainError, DomainResult};
use index_patterns::domain::models::{Config, FieldFormatsRegistry};
use index_patterns::domain::ports::FieldFormatsStart;
use index_patterns::platform::{
    HttpRequest, PlatformError, PlatformResult, RouteResponse, SavedObjectsClient, UiSettingsClient,
    UiSettingsServiceStart,
};
use index_patterns::{Platform, PlatformBuilder};

pub const API: &str = "/api/index_patterns";

/// Config seeded with two log indices and one metrics index
pub fn seeded_config() -> Config {
    let mut config = Config::default();
    let logs: BTreeMap<String, String> = [
        ("@timestamp", "date"),
        ("message", "text"),
        ("host.name", "keyword"),
        ("bytes", "long"),
    ]
    .into_iter()
    .map(|(field, es_type)| (field.to_string(), es_type.to_string()))
    .collect();
    config
        .elasticsearch
        .indices
        .insert("logs-2024.01.01".to_string(), logs.clone());
    config
        .elasticsearch
        .indices
        .insert("logs-2024.01.02".to_string(), logs);
    config.elasticsearch.indices.insert(
        "metrics-system".to_string(),
        [("@timestamp", "date"), ("system.cpu.pct", "float")]
            .into_iter()
            .map(|(field, es_type)| (field.to_string(), es_type.to_string()))
            .collect(),
    );
    config
}

/// Started platform logging into a [`RecordingLogger`]
pub fn platform() -> (Platform, Arc<RecordingLogger>) {
    let logger = Arc::new(RecordingLogger::new());
    let platform = PlatformBuilder::new(seeded_config())
        .logger(logger.clone())
        .build()
        .expect("platform should start");
    (platform, logger)
}

pub fn builder(logger: &Arc<RecordingLogger>) -> PlatformBuilder {
    PlatformBuilder::new(seeded_config()).logger(logger.clone())
}

pub async fn send(platform: &Platform, request: HttpRequest) -> RouteResponse {
    platform.http.handle(request).await
}

/// Create a pattern through the HTTP API and return its id
pub async fn create_pattern(platform: &Platform, body: Value) -> String {
    let response = send(
        platform,
        HttpRequest::post(&format!("{API}/index_pattern"), json!({ "index_pattern": body })),
    )
    .await;
    assert_eq!(response.status, 200, "create failed: {}", response.body);
    response.body["index_pattern"]["id"]
        .as_str()
        .expect("created pattern has an id")
        .to_string()
}

/// Settings service whose scoping always fails
#[derive(Debug, Default)]
pub struct FailingUiSettings;

impl UiSettingsServiceStart for FailingUiSettings {
    fn as_scoped_to_client(
        &self,
        _client: Arc<dyn SavedObjectsClient>,
    ) -> PlatformResult<Arc<dyn UiSettingsClient>> {
        Err(PlatformError::Unavailable("settings backend down".to_string()))
    }
}

/// Settings service counting how often it is scoped
#[derive(Default)]
pub struct CountingUiSettings {
    inner: InMemoryUiSettingsService,
    pub scoped: AtomicUsize,
}

impl CountingUiSettings {
    pub fn count(&self) -> usize {
        self.scoped.load(Ordering::SeqCst)
    }
}

impl UiSettingsServiceStart for CountingUiSettings {
    fn as_scoped_to_client(
        &self,
        client: Arc<dyn SavedObjectsClient>,
    ) -> PlatformResult<Arc<dyn UiSettingsClient>> {
        self.scoped.fetch_add(1, Ordering::SeqCst);
        self.inner.as_scoped_to_client(client)
    }
}

/// Field formats resolution that always fails
#[derive(Debug, Default)]
pub struct FailingFieldFormats;

#[async_trait]
impl FieldFormatsStart for FailingFieldFormats {
    async fn field_format_service_factory(
        &self,
        _ui_settings: Arc<dyn UiSettingsClient>,
    ) -> DomainResult<Arc<FieldFormatsRegistry>> {
        Err(DomainError::FieldFormats("registry unavailable".to_string()))
    }
}
