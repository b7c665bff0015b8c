//! Index patterns service
//!
//! Wires the index patterns capability into a host platform: one-time
//! registration of its saved object type, capabilities, request context,
//! routes, expression function and usage collector, plus a factory that
//! builds a fresh service for every request from request-scoped clients.
//!
//! # Architecture
//!
//! - **Domain Layer** (`domain`): models, errors and the ports the service is written against
//! - **Platform Layer** (`platform`): host platform contracts the capability registers with
//! - **Adapter Layer** (`adapters`): shims from platform clients to domain ports, plus in-memory backends
//! - **Service Layer** (`services`): the service, its factory and the registrar
//! - **Infrastructure Layer** (`infrastructure`): configuration, logging and bootstrap
//! - **CLI Layer** (`cli`): command-line interface
//!
//! # Example
//!
//! ```ignore
//! use index_patterns::{Config, Platform};
//! use index_patterns::platform::HttpRequest;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let platform = Platform::bootstrap(&Config::default())?;
//!     let response = platform.http.handle(HttpRequest::get("/api/index_patterns/default")).await;
//!     assert_eq!(response.status, 200);
//!     Ok(())
//! }
//! ```

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod platform;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::errors::{DomainError, DomainResult};
pub use domain::models::{Config, IndexPattern, IndexPatternSpec, IndexPatternsConfig, LoggingConfig};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use infrastructure::setup::{Platform, PlatformBuilder};
pub use services::{
    IndexPatternsService, IndexPatternsServiceFactory, IndexPatternsServiceProvider,
    IndexPatternsServiceStart,
};
