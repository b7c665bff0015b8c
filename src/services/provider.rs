//! Registration of the index patterns capability with the host platform.

use std::sync::Arc;
use tracing::{info, instrument};

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{index_pattern_saved_object_type, IndexPatternsConfig};
use crate::domain::ports::{FieldFormatsStart, Logger};
use crate::platform::errors::PlatformResult;
use crate::platform::expressions::ExpressionsService;
use crate::platform::http::HttpRequest;
use crate::platform::start_services::StartServices;
use crate::platform::usage_collection::UsageCollectionService;
use crate::platform::{CoreSetup, CoreStart};
use crate::services::capabilities_provider::capabilities_provider;
use crate::services::expressions::IndexPatternLoad;
use crate::services::index_patterns_service::IndexPatternsService;
use crate::services::routes::register_routes;
use crate::services::service_factory::{IndexPatternsServiceFactory, IndexPatternsServiceFactoryConfig};
use crate::services::usage_collector::IndexPatternsUsageCollector;

/// Name of the request context value holding the per-request service.
pub const INDEX_PATTERNS_CONTEXT: &str = "indexPatterns";

pub struct IndexPatternsServiceSetupDeps {
    pub expressions: Arc<ExpressionsService>,
    pub logger: Arc<dyn Logger>,
    pub usage_collection: Option<Arc<UsageCollectionService>>,
}

pub struct IndexPatternsServiceStartDeps {
    pub field_formats: Arc<dyn FieldFormatsStart>,
    pub logger: Arc<dyn Logger>,
}

/// Start contract published to other plugins.
#[derive(Debug, Clone)]
pub struct IndexPatternsServiceStart {
    pub index_patterns_service_factory: IndexPatternsServiceFactory,
}

/// Start services as seen by this capability.
pub type IndexPatternsStartServices = StartServices<IndexPatternsServiceStartDeps, IndexPatternsServiceStart>;

/// Build a service from request-scoped clients, resolving start services first.
pub(crate) async fn service_for_request(
    start_services: &IndexPatternsStartServices,
    request: &HttpRequest,
) -> DomainResult<IndexPatternsService> {
    let started = start_services
        .get()
        .await
        .map_err(|err| DomainError::PlatformUnavailable(err.to_string()))?;
    let saved_objects = started.core.saved_objects.get_scoped_client(request);
    let elasticsearch = started.core.elasticsearch.as_scoped(request).as_current_user();
    started
        .own
        .index_patterns_service_factory
        .create(saved_objects, elasticsearch)
        .await
}

#[derive(Debug, Clone, Default)]
pub struct IndexPatternsServiceProvider {
    options: IndexPatternsConfig,
}

impl IndexPatternsServiceProvider {
    pub fn new(options: IndexPatternsConfig) -> Self {
        Self { options }
    }

    /// One-time registration with the platform.
    #[instrument(skip_all)]
    pub fn setup(
        &self,
        core: &CoreSetup<IndexPatternsServiceStartDeps, IndexPatternsServiceStart>,
        deps: IndexPatternsServiceSetupDeps,
    ) -> PlatformResult<()> {
        let IndexPatternsServiceSetupDeps {
            expressions,
            logger,
            usage_collection,
        } = deps;
        let start_services = core.get_start_services();

        core.saved_objects
            .register_type(index_pattern_saved_object_type())?;
        core.capabilities.register_provider(capabilities_provider);

        let context_start_services = start_services.clone();
        let context_logger = Arc::clone(&logger);
        core.http
            .register_route_handler_context(INDEX_PATTERNS_CONTEXT, move |request| {
                let start_services = context_start_services.clone();
                let logger = Arc::clone(&context_logger);
                async move {
                    match service_for_request(&start_services, &request).await {
                        Ok(service) => Some(service),
                        Err(err) => {
                            logger.error(&err.to_string());
                            None
                        }
                    }
                }
            })?;

        register_routes(&core.http, start_services.clone(), Arc::clone(&logger))?;
        expressions.register_function(IndexPatternLoad::new(start_services.clone()))?;

        if let Some(usage_collection) = usage_collection {
            usage_collection.register_collector(IndexPatternsUsageCollector::new(start_services))?;
        }

        info!("index patterns capability registered");
        Ok(())
    }

    /// Capture the start collaborators into the service factory.
    pub fn start(&self, core: &CoreStart, deps: &IndexPatternsServiceStartDeps) -> IndexPatternsServiceStart {
        let factory = IndexPatternsServiceFactory::new(IndexPatternsServiceFactoryConfig {
            logger: Arc::clone(&deps.logger),
            ui_settings: Arc::clone(&core.ui_settings),
            field_formats: Arc::clone(&deps.field_formats),
            options: self.options.clone(),
        });
        IndexPatternsServiceStart {
            index_patterns_service_factory: factory,
        }
    }
}
