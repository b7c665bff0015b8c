//! HTTP routes under `/api/index_patterns`.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::adapters::IndexPatternsApiServer;
use crate::domain::errors::DomainError;
use crate::domain::models::IndexPatternSpec;
use crate::domain::ports::{GetFieldsOptions, IndexPatternsApiClient, Logger, DEFAULT_INDEX_SETTING};
use crate::platform::errors::PlatformResult;
use crate::platform::http::{HttpRequest, HttpService, RequestHandlerContext, RouteHandler, RouteResponse};
use crate::services::index_patterns_service::IndexPatternsService;
use crate::services::provider::{IndexPatternsStartServices, INDEX_PATTERNS_CONTEXT};

pub const API_BASE: &str = "/api/index_patterns";

/// Map a service error onto an HTTP response.
pub fn error_response(err: &DomainError) -> RouteResponse {
    match err {
        DomainError::SavedObjectNotFound { .. } | DomainError::NoMatchingIndices(_) => {
            RouteResponse::not_found(err.to_string())
        }
        DomainError::DuplicateIndexPattern(_) | DomainError::VersionConflict { .. } => {
            RouteResponse::conflict(err.to_string())
        }
        DomainError::InvalidIndexPattern(_)
        | DomainError::ValidationFailed(_)
        | DomainError::SerializationError(_) => RouteResponse::bad_request(err.to_string()),
        DomainError::PlatformUnavailable(_) => RouteResponse::service_unavailable(err.to_string()),
        _ => RouteResponse::internal_error(err.to_string()),
    }
}

/// Route backed by the per-request service from the `indexPatterns` context.
#[async_trait]
trait ServiceRoute: Send + Sync {
    async fn respond(&self, service: &IndexPatternsService, request: &HttpRequest) -> RouteResponse;
}

struct WithService<R>(R);

#[async_trait]
impl<R: ServiceRoute> RouteHandler for WithService<R> {
    async fn handle(&self, context: &RequestHandlerContext, request: &HttpRequest) -> RouteResponse {
        match context.get::<IndexPatternsService>(INDEX_PATTERNS_CONTEXT).await {
            Some(service) => self.0.respond(&service, request).await,
            None => RouteResponse::service_unavailable("Index patterns service is not available"),
        }
    }
}

fn required_param<'a>(request: &'a HttpRequest, name: &str) -> Result<&'a str, RouteResponse> {
    request
        .param(name)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| RouteResponse::bad_request(format!("[request params.{name}]: expected value of type [string]")))
}

fn parse_body<T: serde::de::DeserializeOwned>(request: &HttpRequest) -> Result<T, RouteResponse> {
    let body = request.body.clone().unwrap_or(Value::Null);
    serde_json::from_value(body).map_err(|err| RouteResponse::bad_request(format!("[request body]: {err}")))
}

struct GetIndexPattern;

#[async_trait]
impl ServiceRoute for GetIndexPattern {
    async fn respond(&self, service: &IndexPatternsService, request: &HttpRequest) -> RouteResponse {
        let id = match required_param(request, "id") {
            Ok(id) => id,
            Err(response) => return response,
        };
        match service.get(id).await {
            Ok(pattern) => RouteResponse::ok(json!({ "index_pattern": pattern.spec() })),
            Err(err) => error_response(&err),
        }
    }
}

struct DeleteIndexPattern;

#[async_trait]
impl ServiceRoute for DeleteIndexPattern {
    async fn respond(&self, service: &IndexPatternsService, request: &HttpRequest) -> RouteResponse {
        let id = match required_param(request, "id") {
            Ok(id) => id,
            Err(response) => return response,
        };
        match service.delete(id).await {
            Ok(()) => RouteResponse::ok(json!({})),
            Err(err) => error_response(&err),
        }
    }
}

#[derive(Debug, Deserialize)]
struct CreateIndexPatternBody {
    index_pattern: IndexPatternSpec,
    #[serde(default, rename = "override")]
    override_existing: bool,
    #[serde(default = "default_true")]
    refresh_fields: bool,
}

const fn default_true() -> bool {
    true
}

struct CreateIndexPattern;

#[async_trait]
impl ServiceRoute for CreateIndexPattern {
    async fn respond(&self, service: &IndexPatternsService, request: &HttpRequest) -> RouteResponse {
        let body: CreateIndexPatternBody = match parse_body(request) {
            Ok(body) => body,
            Err(response) => return response,
        };
        match service
            .create_and_save(body.index_pattern, body.override_existing, !body.refresh_fields)
            .await
        {
            Ok(pattern) => RouteResponse::ok(json!({ "index_pattern": pattern.spec() })),
            Err(err) => error_response(&err),
        }
    }
}

struct GetDefault;

#[async_trait]
impl ServiceRoute for GetDefault {
    async fn respond(&self, service: &IndexPatternsService, _request: &HttpRequest) -> RouteResponse {
        match service.get_default_id().await {
            Ok(id) => RouteResponse::ok(json!({ "index_pattern_id": id })),
            Err(err) => error_response(&err),
        }
    }
}

#[derive(Debug, Deserialize)]
struct SetDefaultBody {
    index_pattern_id: Option<String>,
    #[serde(default)]
    force: bool,
}

struct SetDefault;

#[async_trait]
impl ServiceRoute for SetDefault {
    async fn respond(&self, service: &IndexPatternsService, request: &HttpRequest) -> RouteResponse {
        let body: SetDefaultBody = match parse_body(request) {
            Ok(body) => body,
            Err(response) => return response,
        };
        let result = match body.index_pattern_id {
            Some(id) => service.set_default(&id, body.force).await,
            None => service.ui_settings().remove(DEFAULT_INDEX_SETTING).await,
        };
        match result {
            Ok(()) => RouteResponse::ok(json!({ "acknowledged": true })),
            Err(err) => error_response(&err),
        }
    }
}

/// `meta_fields` as a JSON array or a comma separated list.
fn parse_meta_fields(raw: Option<&str>) -> Vec<String> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Vec::new();
    };
    serde_json::from_str::<Vec<String>>(raw).unwrap_or_else(|_| {
        raw.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    })
}

/// Search API client built from request-scoped platform clients.
#[derive(Clone)]
struct ScopedApi {
    start_services: IndexPatternsStartServices,
}

impl ScopedApi {
    async fn api_client(&self, request: &HttpRequest) -> Option<IndexPatternsApiServer> {
        let started = self.start_services.get().await.ok()?;
        Some(IndexPatternsApiServer::new(
            started.core.elasticsearch.as_scoped(request).as_current_user(),
            started.core.saved_objects.get_scoped_client(request),
        ))
    }
}

struct FieldsForWildcard(ScopedApi);

#[async_trait]
impl RouteHandler for FieldsForWildcard {
    async fn handle(&self, _context: &RequestHandlerContext, request: &HttpRequest) -> RouteResponse {
        let Some(pattern) = request.query_param("pattern").filter(|p| !p.is_empty()) else {
            return RouteResponse::bad_request("[request query.pattern]: expected value of type [string]");
        };
        let Some(api) = self.0.api_client(request).await else {
            return RouteResponse::service_unavailable("Platform has not started");
        };

        let options = GetFieldsOptions {
            pattern: pattern.to_string(),
            meta_fields: parse_meta_fields(request.query_param("meta_fields")),
            pattern_type: request.query_param("type").map(str::to_string),
            allow_no_index: request.query_flag("allow_no_index"),
        };
        match api.get_fields_for_wildcard(&options).await {
            Ok(fields) => RouteResponse::ok(json!({ "fields": fields })),
            Err(err) => error_response(&err),
        }
    }
}

struct HasUserIndexPattern(ScopedApi);

#[async_trait]
impl RouteHandler for HasUserIndexPattern {
    async fn handle(&self, _context: &RequestHandlerContext, request: &HttpRequest) -> RouteResponse {
        let Some(api) = self.0.api_client(request).await else {
            return RouteResponse::service_unavailable("Platform has not started");
        };
        match api.has_user_index_pattern().await {
            Ok(result) => RouteResponse::ok(json!({ "result": result })),
            Err(err) => error_response(&err),
        }
    }
}

pub fn register_routes(
    http: &HttpService,
    start_services: IndexPatternsStartServices,
    logger: Arc<dyn Logger>,
) -> PlatformResult<()> {
    let router = http.create_router();
    let path = |suffix: &str| format!("{API_BASE}/{suffix}");

    router.get(&path("index_pattern/{id}"), WithService(GetIndexPattern))?;
    router.delete(&path("index_pattern/{id}"), WithService(DeleteIndexPattern))?;
    router.post(&path("index_pattern"), WithService(CreateIndexPattern))?;
    router.get(&path("default"), WithService(GetDefault))?;
    router.post(&path("default"), WithService(SetDefault))?;
    let scoped_api = ScopedApi { start_services };
    router.get(&path("_fields_for_wildcard"), FieldsForWildcard(scoped_api.clone()))?;
    router.get(&path("has_user_index_pattern"), HasUserIndexPattern(scoped_api))?;

    logger.debug("index pattern routes registered");
    Ok(())
}
