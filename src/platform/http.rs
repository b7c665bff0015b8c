//! HTTP surface of the platform: requests, routing and request context.
//!
//! Plugins register two things here during setup:
//! - routes on the shared [`Router`], answered by [`RouteHandler`]s;
//! - named request context providers on the [`ContextContainer`].
//!
//! Every dispatched request gets a fresh [`RequestHandlerContext`]. A context
//! value is only computed when a handler asks for it, at most once per
//! request, and a provider that yields `None` makes the value absent for the
//! rest of that request.

use async_trait::async_trait;
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::any::Any;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::future::Future;
use std::str::FromStr;
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use tokio::sync::OnceCell;
use uuid::Uuid;

use crate::platform::errors::{PlatformError, PlatformResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Get => write!(f, "GET"),
            Self::Post => write!(f, "POST"),
            Self::Put => write!(f, "PUT"),
            Self::Delete => write!(f, "DELETE"),
        }
    }
}

impl FromStr for Method {
    type Err = PlatformError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Self::Get),
            "POST" => Ok(Self::Post),
            "PUT" => Ok(Self::Put),
            "DELETE" => Ok(Self::Delete),
            other => Err(PlatformError::BadRequest(format!("unsupported method: {other}"))),
        }
    }
}

/// An incoming request as seen by route handlers and context providers.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub id: Uuid,
    pub method: Method,
    pub path: String,
    /// Path parameters, filled in by the router.
    pub params: BTreeMap<String, String>,
    pub query: BTreeMap<String, String>,
    pub body: Option<Value>,
    /// Authenticated principal, if any.
    pub user: Option<String>,
}

impl HttpRequest {
    /// Build a request from a method and a `path?query` target.
    pub fn new(method: Method, target: &str) -> Self {
        let (path, query) = match target.split_once('?') {
            Some((path, query)) => (path, parse_query(query)),
            None => (target, BTreeMap::new()),
        };

        Self {
            id: Uuid::new_v4(),
            method,
            path: path.to_string(),
            params: BTreeMap::new(),
            query,
            body: None,
            user: None,
        }
    }

    pub fn get(target: &str) -> Self {
        Self::new(Method::Get, target)
    }

    pub fn post(target: &str, body: Value) -> Self {
        Self::new(Method::Post, target).with_body(body)
    }

    pub fn delete(target: &str) -> Self {
        Self::new(Method::Delete, target)
    }

    #[must_use]
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    #[must_use]
    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query.get(name).map(String::as_str)
    }

    /// Boolean query flag; `true`, `1` and a bare key count as set.
    pub fn query_flag(&self, name: &str) -> bool {
        matches!(self.query_param(name), Some("" | "true" | "1"))
    }
}

fn parse_query(query: &str) -> BTreeMap<String, String> {
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| match pair.split_once('=') {
            Some((k, v)) => (k.to_string(), v.to_string()),
            None => (pair.to_string(), String::new()),
        })
        .collect()
}

/// Status and JSON body produced by a route handler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteResponse {
    pub status: u16,
    pub body: Value,
}

impl RouteResponse {
    pub const fn ok(body: Value) -> Self {
        Self { status: 200, body }
    }

    pub fn error(status: u16, error: &str, message: impl Into<String>) -> Self {
        Self {
            status,
            body: json!({
                "statusCode": status,
                "error": error,
                "message": message.into(),
            }),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::error(400, "Bad Request", message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::error(404, "Not Found", message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::error(409, "Conflict", message)
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::error(500, "Internal Server Error", message)
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::error(503, "Service Unavailable", message)
    }

    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

#[async_trait]
pub trait RouteHandler: Send + Sync {
    async fn handle(&self, context: &RequestHandlerContext, request: &HttpRequest) -> RouteResponse;
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param(String),
}

fn parse_segments(path: &str) -> Vec<Segment> {
    path.split('/')
        .filter(|s| !s.is_empty())
        .map(|s| match s.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
            Some(name) => Segment::Param(name.to_string()),
            None => Segment::Literal(s.to_string()),
        })
        .collect()
}

struct Route {
    method: Method,
    path: String,
    segments: Vec<Segment>,
    handler: Arc<dyn RouteHandler>,
}

impl Route {
    fn matches(&self, method: Method, path: &str) -> Option<BTreeMap<String, String>> {
        if self.method != method {
            return None;
        }
        let parts: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        if parts.len() != self.segments.len() {
            return None;
        }

        let mut params = BTreeMap::new();
        for (segment, part) in self.segments.iter().zip(parts) {
            match segment {
                Segment::Literal(literal) if literal == part => {}
                Segment::Literal(_) => return None,
                Segment::Param(name) => {
                    params.insert(name.clone(), part.to_string());
                }
            }
        }
        Some(params)
    }
}

/// Route table shared by all plugins.
#[derive(Default)]
pub struct Router {
    routes: RwLock<Vec<Arc<Route>>>,
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router").field("routes", &self.routes()).finish()
    }
}

impl Router {
    pub fn get(&self, path: &str, handler: impl RouteHandler + 'static) -> PlatformResult<()> {
        self.add_route(Method::Get, path, Arc::new(handler))
    }

    pub fn post(&self, path: &str, handler: impl RouteHandler + 'static) -> PlatformResult<()> {
        self.add_route(Method::Post, path, Arc::new(handler))
    }

    pub fn delete(&self, path: &str, handler: impl RouteHandler + 'static) -> PlatformResult<()> {
        self.add_route(Method::Delete, path, Arc::new(handler))
    }

    pub fn add_route(
        &self,
        method: Method,
        path: &str,
        handler: Arc<dyn RouteHandler>,
    ) -> PlatformResult<()> {
        let mut routes = self.routes.write().unwrap_or_else(PoisonError::into_inner);
        let segments = parse_segments(path);
        if routes
            .iter()
            .any(|r| r.method == method && r.segments == segments)
        {
            return Err(PlatformError::duplicate("route", format!("{method} {path}")));
        }

        tracing::debug!(%method, path, "registered route");
        routes.push(Arc::new(Route {
            method,
            path: path.to_string(),
            segments,
            handler,
        }));
        Ok(())
    }

    /// Registered routes as (method, path template).
    pub fn routes(&self) -> Vec<(Method, String)> {
        self.routes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|r| (r.method, r.path.clone()))
            .collect()
    }

    fn match_route(&self, method: Method, path: &str) -> Option<(Arc<Route>, BTreeMap<String, String>)> {
        self.routes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .find_map(|route| route.matches(method, path).map(|p| (Arc::clone(route), p)))
    }
}

type ContextValue = Option<Arc<dyn Any + Send + Sync>>;
type ContextProviderFn = Arc<dyn Fn(Arc<HttpRequest>) -> BoxFuture<'static, ContextValue> + Send + Sync>;

/// Named, lazily evaluated request context providers.
#[derive(Default)]
pub struct ContextContainer {
    providers: RwLock<BTreeMap<String, ContextProviderFn>>,
}

impl fmt::Debug for ContextContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContextContainer")
            .field("providers", &self.names())
            .finish()
    }
}

impl ContextContainer {
    /// Register the provider computing the context value `name`.
    ///
    /// The provider runs at most once per request, the first time a handler
    /// asks for `name`. Returning `None` marks the value absent.
    pub fn register_provider<T, F, Fut>(&self, name: &str, provider: F) -> PlatformResult<()>
    where
        T: Send + Sync + 'static,
        F: Fn(Arc<HttpRequest>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Option<T>> + Send + 'static,
    {
        let mut providers = self.providers.write().unwrap_or_else(PoisonError::into_inner);
        if providers.contains_key(name) {
            return Err(PlatformError::duplicate("request context", name));
        }

        let erased: ContextProviderFn =
            Arc::new(move |request: Arc<HttpRequest>| -> BoxFuture<'static, ContextValue> {
                let value = provider(request);
                Box::pin(async move {
                    value
                        .await
                        .map(|v| Arc::new(v) as Arc<dyn Any + Send + Sync>)
                })
            });
        providers.insert(name.to_string(), erased);
        tracing::debug!(context = name, "registered request context provider");
        Ok(())
    }

    pub fn names(&self) -> Vec<String> {
        self.providers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect()
    }

    fn provider(&self, name: &str) -> Option<ContextProviderFn> {
        self.providers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }
}

/// Per-request view over the registered context providers.
pub struct RequestHandlerContext {
    request: Arc<HttpRequest>,
    container: Arc<ContextContainer>,
    values: Mutex<HashMap<String, Arc<OnceCell<ContextValue>>>>,
}

impl fmt::Debug for RequestHandlerContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestHandlerContext")
            .field("request_id", &self.request.id)
            .finish_non_exhaustive()
    }
}

impl RequestHandlerContext {
    pub fn new(container: Arc<ContextContainer>, request: Arc<HttpRequest>) -> Self {
        Self {
            request,
            container,
            values: Mutex::new(HashMap::new()),
        }
    }

    pub fn request(&self) -> &HttpRequest {
        &self.request
    }

    /// Resolve the context value `name` for this request.
    ///
    /// Returns `None` when no provider is registered under `name`, when the
    /// provider yielded nothing, or when the value is not a `T`. Concurrent
    /// callers share a single provider invocation.
    pub async fn get<T: Send + Sync + 'static>(&self, name: &str) -> Option<Arc<T>> {
        let provider = self.container.provider(name)?;
        let cell = {
            let mut values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(values.entry(name.to_string()).or_default())
        };

        let request = Arc::clone(&self.request);
        let value = cell.get_or_init(|| provider(request)).await;
        value.clone()?.downcast::<T>().ok()
    }

    /// Whether `name` has already been resolved on this request.
    pub fn is_resolved(&self, name: &str) -> bool {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .is_some_and(|cell| cell.initialized())
    }
}

/// The platform HTTP service: router plus request context container.
#[derive(Clone, Default)]
pub struct HttpService {
    router: Arc<Router>,
    contexts: Arc<ContextContainer>,
}

impl fmt::Debug for HttpService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpService")
            .field("router", &self.router)
            .field("contexts", &self.contexts)
            .finish()
    }
}

impl HttpService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_router(&self) -> Arc<Router> {
        Arc::clone(&self.router)
    }

    pub fn register_route_handler_context<T, F, Fut>(&self, name: &str, provider: F) -> PlatformResult<()>
    where
        T: Send + Sync + 'static,
        F: Fn(Arc<HttpRequest>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Option<T>> + Send + 'static,
    {
        self.contexts.register_provider(name, provider)
    }

    pub fn context_names(&self) -> Vec<String> {
        self.contexts.names()
    }

    pub fn routes(&self) -> Vec<(Method, String)> {
        self.router.routes()
    }

    /// Fresh context for a request that bypasses routing.
    pub fn create_context(&self, request: HttpRequest) -> RequestHandlerContext {
        RequestHandlerContext::new(Arc::clone(&self.contexts), Arc::new(request))
    }

    /// Route a request and run its handler with a fresh request context.
    #[tracing::instrument(skip(self, request), fields(request_id = %request.id, method = %request.method, path = %request.path))]
    pub async fn handle(&self, mut request: HttpRequest) -> RouteResponse {
        let Some((route, params)) = self.router.match_route(request.method, &request.path) else {
            tracing::debug!("no route matched");
            return RouteResponse::not_found(format!(
                "No route for {} {}",
                request.method, request.path
            ));
        };

        request.params = params;
        let context = self.create_context(request);
        let response = route.handler.handle(&context, context.request()).await;
        tracing::debug!(status = response.status, "request handled");
        response
    }
}
