//! Index patterns services: the per-request service, its factory, and the
//! collaborators registered with the platform at setup.

pub mod capabilities_provider;
pub mod expressions;
pub mod field_formats;
pub mod index_patterns_service;
pub mod provider;
pub mod routes;
pub mod service_factory;
pub mod usage_collector;

pub use field_formats::FieldFormatsService;
pub use index_patterns_service::{IndexPatternsService, IndexPatternsServiceDeps};
pub use provider::{
    IndexPatternsServiceProvider, IndexPatternsServiceSetupDeps, IndexPatternsServiceStart,
    IndexPatternsServiceStartDeps, IndexPatternsStartServices, INDEX_PATTERNS_CONTEXT,
};
pub use service_factory::{IndexPatternsServiceFactory, IndexPatternsServiceFactoryConfig};
pub use usage_collector::{IndexPatternsUsage, IndexPatternsUsageCollector};
