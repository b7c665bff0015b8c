//! The `indexPatternLoad` expression function and the usage collector.

mod common;

use common::{builder, create_pattern, platform, send, API};
use index_patterns::adapters::memory::RecordingLogger;
use index_patterns::domain::errors::DomainError;
use index_patterns::platform::{ExecutionContext, HttpRequest};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::sync::Arc;

fn id_arg(id: &str) -> BTreeMap<String, Value> {
    BTreeMap::from([("id".to_string(), json!(id))])
}

#[tokio::test]
async fn test_index_pattern_load_returns_pattern() {
    let (platform, _logger) = platform();
    let id = create_pattern(&platform, json!({ "title": "metrics-*" })).await;

    let context = ExecutionContext::for_request(HttpRequest::get("/api/expressions"));
    let output = platform
        .expressions
        .run("indexPatternLoad", Value::Null, id_arg(&id), &context)
        .await
        .unwrap();

    assert_eq!(output["type"], "index_pattern");
    assert_eq!(output["value"]["title"], "metrics-*");
    assert_eq!(output["value"]["id"], id.as_str());
}

#[tokio::test]
async fn test_index_pattern_load_requires_request() {
    let (platform, _logger) = platform();

    let err = platform
        .expressions
        .run("indexPatternLoad", Value::Null, id_arg("any"), &ExecutionContext::default())
        .await
        .unwrap_err();
    assert_eq!(err, DomainError::MissingRequest("load index patterns".to_string()));
    assert_eq!(
        err.to_string(),
        "A request is required to load index patterns on the server"
    );
}

#[tokio::test]
async fn test_index_pattern_load_validates_arguments() {
    let (platform, _logger) = platform();
    let context = ExecutionContext::for_request(HttpRequest::get("/"));

    let err = platform
        .expressions
        .run("indexPatternLoad", Value::Null, BTreeMap::new(), &context)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::ValidationFailed(msg) if msg.contains("\"id\"")));

    let err = platform
        .expressions
        .run("indexPatternLoad", Value::Null, id_arg("missing"), &context)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::SavedObjectNotFound { .. }));
}

#[tokio::test]
async fn test_usage_collector_reports_counts() {
    let (platform, _logger) = platform();
    create_pattern(&platform, json!({ "title": "logs-*" })).await;
    create_pattern(
        &platform,
        json!({
            "title": "metrics-*",
            "fields": {
                "cpu_pct": {
                    "name": "cpu_pct",
                    "type": "number",
                    "scripted": true,
                    "script": "doc['system.cpu.pct'].value * 100"
                }
            }
        }),
    )
    .await;

    let usage = platform
        .usage_collection
        .as_ref()
        .unwrap()
        .bulk_fetch(&platform.collector_fetch_context())
        .await;

    let stats = &usage["index-patterns"];
    assert_eq!(stats["indexpatterns_total"], 2);
    assert_eq!(stats["indexpatterns_with_scripted_field_count"], 1);
    assert_eq!(stats["scripted_field_count"], 1);
    assert_eq!(stats["runtime_field_count"], 0);
}

#[tokio::test]
async fn test_usage_collector_waits_for_start() {
    let logger = Arc::new(RecordingLogger::new());
    let platform = builder(&logger).setup().unwrap();
    let usage_collection = platform.usage_collection.clone().unwrap();

    let usage = usage_collection
        .bulk_fetch(&platform.collector_fetch_context())
        .await;
    assert!(usage.is_empty(), "collector is not ready before start");

    platform.start().unwrap();
    let usage = usage_collection
        .bulk_fetch(&platform.collector_fetch_context())
        .await;
    assert_eq!(usage["index-patterns"]["indexpatterns_total"], 0);
}

#[tokio::test]
async fn test_management_capability_enabled() {
    let (platform, _logger) = platform();
    let capabilities = platform.capabilities.resolve(&HttpRequest::get("/"));
    assert!(capabilities.is_enabled("management.kibana.indexPatterns"));

    // Sanity check that the capability flag does not change API behaviour
    let response = send(&platform, HttpRequest::get(&format!("{API}/default"))).await;
    assert_eq!(response.status, 200);
}
