//! Per-request service construction and the callbacks it wires to the logger.

mod common;

use common::{builder, platform, send, CountingUiSettings, FailingFieldFormats, FailingUiSettings, API};
use index_patterns::domain::errors::DomainError;
use index_patterns::domain::models::{IndexPatternSpec, Notification, UnsupportedTimePattern};
use index_patterns::domain::ports::Level;
use index_patterns::platform::HttpRequest;
use index_patterns::services::IndexPatternsService;
use index_patterns::Platform;
use std::sync::Arc;

async fn service_for(platform: &Platform, request: &HttpRequest) -> Result<IndexPatternsService, DomainError> {
    let started = platform.start_services.get().await.expect("started");
    started
        .own
        .index_patterns_service_factory
        .create(
            started.core.saved_objects.get_scoped_client(request),
            started.core.elasticsearch.as_scoped(request).as_current_user(),
        )
        .await
}

#[tokio::test]
async fn test_create_with_working_adapters() {
    let (platform, logger) = platform();
    let request = HttpRequest::get("/");

    let service = service_for(&platform, &request).await.unwrap();
    assert!(service.get_ids().await.unwrap().is_empty());
    assert_eq!(service.get_default_id().await.unwrap(), None);
    assert!(service.meta_fields().await.unwrap().contains(&"_source".to_string()));
    assert_eq!(logger.count(Level::Error), 0);
}

#[tokio::test]
async fn test_create_fails_when_settings_cannot_be_scoped() {
    let logger = Arc::new(index_patterns::adapters::memory::RecordingLogger::new());
    let platform = builder(&logger)
        .ui_settings(Arc::new(FailingUiSettings))
        .build()
        .unwrap();

    let err = service_for(&platform, &HttpRequest::get("/")).await.unwrap_err();
    assert!(matches!(err, DomainError::SettingsUnavailable(msg) if msg.contains("settings backend down")));
}

#[tokio::test]
async fn test_create_fails_when_field_formats_fail() {
    let logger = Arc::new(index_patterns::adapters::memory::RecordingLogger::new());
    let platform = builder(&logger)
        .field_formats(Arc::new(FailingFieldFormats))
        .build()
        .unwrap();

    let err = service_for(&platform, &HttpRequest::get("/")).await.unwrap_err();
    assert_eq!(err, DomainError::FieldFormats("registry unavailable".to_string()));
}

#[tokio::test]
async fn test_failing_context_logs_one_error_and_is_absent() {
    let logger = Arc::new(index_patterns::adapters::memory::RecordingLogger::new());
    let platform = builder(&logger)
        .field_formats(Arc::new(FailingFieldFormats))
        .build()
        .unwrap();

    let context = platform.http.create_context(HttpRequest::get("/"));
    let service = context.get::<IndexPatternsService>("indexPatterns").await;
    assert!(service.is_none());

    // Resolved once per request even when asked twice
    assert!(context.get::<IndexPatternsService>("indexPatterns").await.is_none());
    let errors = logger.messages(Level::Error);
    assert_eq!(errors.len(), 1, "errors: {errors:?}");
    assert!(errors[0].contains("registry unavailable"));
}

#[tokio::test]
async fn test_route_answers_503_when_context_is_absent() {
    let logger = Arc::new(index_patterns::adapters::memory::RecordingLogger::new());
    let platform = builder(&logger)
        .ui_settings(Arc::new(FailingUiSettings))
        .build()
        .unwrap();

    let response = send(&platform, HttpRequest::get(&format!("{API}/default"))).await;
    assert_eq!(response.status, 503);
    assert_eq!(logger.count(Level::Error), 1);
}

#[tokio::test]
async fn test_notification_is_logged_as_one_warning() {
    let (platform, logger) = platform();
    let service = service_for(&platform, &HttpRequest::get("/")).await.unwrap();

    (service.on_notification())(Notification::new("T", "X"));

    assert_eq!(logger.messages(Level::Warn), vec!["T : X".to_string()]);
}

#[tokio::test]
async fn test_error_callback_logs_error() {
    let (platform, logger) = platform();
    let service = service_for(&platform, &HttpRequest::get("/")).await.unwrap();

    (service.on_error())(&DomainError::Search("shard failure".to_string()));

    assert_eq!(logger.messages(Level::Error), vec!["Search error: shard failure".to_string()]);
}

#[tokio::test]
async fn test_unsupported_time_pattern_warning() {
    let (platform, logger) = platform();
    let service = service_for(&platform, &HttpRequest::get("/")).await.unwrap();

    (service.on_unsupported_time_pattern())(UnsupportedTimePattern {
        id: Some("legacy".to_string()),
        index: "idx-*".to_string(),
        title: "My Pattern".to_string(),
    });

    let warnings = logger.messages(Level::Warn);
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].contains("idx-*"));
    assert!(warnings[0].contains("My Pattern"));
    assert!(warnings[0].contains("should be migrated to a wildcard-based index pattern"));

    let entry = logger
        .entries()
        .into_iter()
        .find(|entry| entry.level == Level::Warn)
        .unwrap();
    assert_eq!(entry.fields["index_pattern_id"], "legacy");
}

#[tokio::test]
async fn test_loading_interval_pattern_warns_with_wildcard_index() {
    let (platform, logger) = platform();
    let service = service_for(&platform, &HttpRequest::get("/")).await.unwrap();

    let mut spec = IndexPatternSpec::new("[logs-]YYYY.MM.DD");
    spec.interval_name = Some("days".to_string());
    let saved = service.create_and_save(spec, false, false).await.unwrap();
    assert!(saved.get_field("message").is_some(), "fields resolved through logs-*");
    logger.clear();

    service.get(saved.id().unwrap()).await.unwrap();
    let warnings = logger.messages(Level::Warn);
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].contains("Currently querying all indices matching logs-*"));
}

#[tokio::test]
async fn test_empty_interval_name_loads_as_plain_pattern() {
    let (platform, logger) = platform();
    let service = service_for(&platform, &HttpRequest::get("/")).await.unwrap();

    let mut spec = IndexPatternSpec::new("metrics-*");
    spec.interval_name = Some(String::new());
    let saved = service.create_and_save(spec, false, true).await.unwrap();
    logger.clear();

    let loaded = service.get(saved.id().unwrap()).await.unwrap();
    assert!(logger.messages(Level::Warn).is_empty());
    assert!(loaded.get_field("system.cpu.pct").is_some());
    assert!(loaded.get_field("message").is_none(), "logs-* fields must not leak in");
}

#[tokio::test]
async fn test_no_matching_indices_becomes_notification() {
    let (platform, logger) = platform();
    let service = service_for(&platform, &HttpRequest::get("/")).await.unwrap();

    let pattern = service
        .create(IndexPatternSpec::new("nomatch-*"), false)
        .await
        .unwrap();

    assert_eq!(pattern.fields().count(), 0);
    let warnings = logger.messages(Level::Warn);
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].contains("nomatch-*"));
    assert!(warnings[0].ends_with("Index pattern nomatch-* has no matching indices"));
    assert_eq!(logger.count(Level::Error), 0);
}

#[tokio::test]
async fn test_fresh_service_per_request_and_single_registration() {
    let logger = Arc::new(index_patterns::adapters::memory::RecordingLogger::new());
    let ui_settings = Arc::new(CountingUiSettings::default());
    let platform = builder(&logger).ui_settings(ui_settings.clone()).build().unwrap();

    for _ in 0..5 {
        let response = send(&platform, HttpRequest::get(&format!("{API}/default"))).await;
        assert_eq!(response.status, 200);
    }

    assert_eq!(ui_settings.count(), 5, "one scoped settings client per request");
    let types = platform.saved_object_types.type_names();
    assert_eq!(types.iter().filter(|t| t.as_str() == "index-pattern").count(), 1);
    assert_eq!(platform.http.context_names(), vec!["indexPatterns".to_string()]);
    assert_eq!(platform.http.routes().len(), 7);
    assert_eq!(platform.expressions.function_names(), vec!["indexPatternLoad".to_string()]);
    assert_eq!(
        platform.usage_collection.as_ref().unwrap().collector_types(),
        vec!["index-patterns".to_string()]
    );
    assert_eq!(platform.capabilities.provider_count(), 1);
}
