//! Service operations against the in-memory platform backends.

mod common;

use common::platform;
use index_patterns::domain::errors::DomainError;
use index_patterns::domain::models::{FieldSpec, IndexPatternSpec, SerializedFieldFormat};
use index_patterns::domain::ports::GetFieldsOptions;
use index_patterns::platform::HttpRequest;
use index_patterns::services::IndexPatternsService;
use index_patterns::Platform;
use serde_json::json;

async fn service(platform: &Platform) -> IndexPatternsService {
    let request = HttpRequest::get("/");
    let started = platform.start_services.get().await.unwrap();
    started
        .own
        .index_patterns_service_factory
        .create(
            started.core.saved_objects.get_scoped_client(&request),
            started.core.elasticsearch.as_scoped(&request).as_current_user(),
        )
        .await
        .unwrap()
}

#[tokio::test]
async fn test_listing_and_find() {
    let (platform, _logger) = platform();
    let service = service(&platform).await;

    for title in ["logs-*", "logs-2024*", "metrics-*"] {
        service
            .create_and_save(IndexPatternSpec::new(title), false, true)
            .await
            .unwrap();
    }

    let mut titles = service.get_titles().await.unwrap();
    titles.sort();
    assert_eq!(titles, vec!["logs-*", "logs-2024*", "metrics-*"]);
    assert_eq!(service.get_ids().await.unwrap().len(), 3);

    let items = service.get_id_with_title().await.unwrap();
    assert!(items.iter().all(|item| !item.id.is_empty()));

    let found = service.find("logs", 10).await.unwrap();
    assert_eq!(found.len(), 2);
    assert!(found.iter().all(|p| p.title().starts_with("logs")));
    // Loaded patterns had no stored fields, so they were refreshed
    assert!(found.iter().all(|p| p.fields().next().is_some()));
}

#[tokio::test]
async fn test_update_detects_stale_version() {
    let (platform, _logger) = platform();
    let service = service(&platform).await;

    let saved = service
        .create_and_save(IndexPatternSpec::new("logs-*"), false, false)
        .await
        .unwrap();
    let id = saved.id().unwrap().to_string();

    let mut first = service.get(&id).await.unwrap();
    let mut second = service.get(&id).await.unwrap();

    service.update_saved_object(&mut first).await.unwrap();
    assert_ne!(first.version(), second.version());

    let err = service.update_saved_object(&mut second).await.unwrap_err();
    assert!(matches!(err, DomainError::VersionConflict { .. }));
}

#[tokio::test]
async fn test_update_requires_saved_pattern() {
    let (platform, _logger) = platform();
    let service = service(&platform).await;

    let mut unsaved = service
        .create(IndexPatternSpec::new("logs-*"), true)
        .await
        .unwrap();
    let err = service.update_saved_object(&mut unsaved).await.unwrap_err();
    assert!(matches!(err, DomainError::InvalidIndexPattern(_)));
}

#[tokio::test]
async fn test_refresh_keeps_scripted_fields() {
    let (platform, _logger) = platform();
    let service = service(&platform).await;

    let spec = IndexPatternSpec::new("logs-*")
        .with_fields(vec![FieldSpec::scripted("kb", "number", "doc['bytes'].value / 1024")]);
    let mut pattern = service.create(spec, true).await.unwrap();

    service.refresh_fields(&mut pattern).await;
    assert!(pattern.get_field("kb").unwrap().scripted);
    assert!(pattern.get_field("message").is_some());
}

#[tokio::test]
async fn test_meta_fields_are_applied_to_field_listing() {
    let (platform, _logger) = platform();
    let service = service(&platform).await;

    let fields = service
        .get_fields_for_wildcard(GetFieldsOptions {
            pattern: "metrics-*".to_string(),
            meta_fields: Vec::new(),
            pattern_type: None,
            allow_no_index: false,
        })
        .await
        .unwrap();

    let names: Vec<&str> = fields.iter().map(|f| f.name.as_str()).collect();
    for meta in ["_source", "_id", "_type", "_index", "_score"] {
        assert!(names.contains(&meta), "missing {meta}");
    }
    let score = fields.iter().find(|f| f.name == "_score").unwrap();
    assert_eq!(score.field_type, "number");
}

#[tokio::test]
async fn test_format_for_field() {
    let (platform, _logger) = platform();
    let service = service(&platform).await;

    let mut spec = IndexPatternSpec::new("logs-*");
    spec.field_formats.insert(
        "bytes".to_string(),
        SerializedFieldFormat {
            id: "bytes".to_string(),
            params: None,
        },
    );
    let pattern = service.create(spec, false).await.unwrap();

    assert_eq!(service.format_for_field(&pattern, "bytes").unwrap().id, "bytes");
    assert_eq!(service.format_for_field(&pattern, "@timestamp").unwrap().id, "date");
    assert_eq!(service.format_for_field(&pattern, "host.name").unwrap().id, "string");
    assert!(service.format_for_field(&pattern, "nope").is_err());
}

#[tokio::test]
async fn test_default_type_map_setting_drives_formats() {
    let mut config = common::seeded_config();
    let mut map = index_patterns::domain::models::field_formats::default_type_map();
    map["number"] = json!({ "id": "percent", "params": {} });
    config
        .ui_settings
        .overrides
        .insert("format:defaultTypeMap".to_string(), map);
    let platform = Platform::bootstrap(&config).unwrap();
    let service = service(&platform).await;

    let pattern = service
        .create(IndexPatternSpec::new("metrics-*"), false)
        .await
        .unwrap();
    assert_eq!(service.format_for_field(&pattern, "system.cpu.pct").unwrap().id, "percent");
}

#[tokio::test]
async fn test_allow_no_index_config_suppresses_notification() {
    let logger = std::sync::Arc::new(index_patterns::adapters::memory::RecordingLogger::new());
    let mut config = common::seeded_config();
    config.index_patterns.allow_no_index = true;
    let platform = index_patterns::PlatformBuilder::new(config)
        .logger(logger.clone())
        .build()
        .unwrap();
    let service = service(&platform).await;

    let pattern = service
        .create(IndexPatternSpec::new("nomatch-*"), false)
        .await
        .unwrap();
    assert_eq!(pattern.fields().count(), 0);
    assert_eq!(logger.count(index_patterns::domain::ports::Level::Warn), 0);
}
