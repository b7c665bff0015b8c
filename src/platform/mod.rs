//! Host platform contracts: setup registries, start clients, request context.

pub mod capabilities;
pub mod elasticsearch;
pub mod errors;
pub mod expressions;
pub mod http;
pub mod saved_objects;
pub mod start_services;
pub mod ui_settings;
pub mod usage_collection;

use std::sync::Arc;

pub use capabilities::{Capabilities, CapabilitiesService};
pub use elasticsearch::{
    ElasticsearchClient, ElasticsearchServiceStart, FieldCapability, FieldCapsResponse,
    ScopedClusterClient,
};
pub use errors::{PlatformError, PlatformResult};
pub use expressions::{ArgumentDefinition, ExecutionContext, ExpressionFunction, ExpressionsService};
pub use http::{
    HttpRequest, HttpService, Method, RequestHandlerContext, RouteHandler, RouteResponse,
};
pub use saved_objects::{
    SavedObjectTypeRegistry, SavedObjectsClient, SavedObjectsFindResponse, SavedObjectsServiceStart,
};
pub use start_services::{StartServices, StartServicesValue};
pub use ui_settings::{UiSettingsClient, UiSettingsServiceStart};
pub use usage_collection::{CollectorFetchContext, UsageCollectionService, UsageCollector};

/// Core services available while plugins set up.
pub struct CoreSetup<P, O> {
    pub saved_objects: Arc<SavedObjectTypeRegistry>,
    pub capabilities: Arc<CapabilitiesService>,
    pub http: HttpService,
    start_services: StartServices<P, O>,
}

impl<P, O> CoreSetup<P, O>
where
    P: Send + Sync + 'static,
    O: Send + Sync + 'static,
{
    pub fn new(
        saved_objects: Arc<SavedObjectTypeRegistry>,
        capabilities: Arc<CapabilitiesService>,
        http: HttpService,
        start_services: StartServices<P, O>,
    ) -> Self {
        Self {
            saved_objects,
            capabilities,
            http,
            start_services,
        }
    }

    /// Accessor that resolves once the platform has started.
    pub fn get_start_services(&self) -> StartServices<P, O> {
        self.start_services.clone()
    }
}

/// Core clients available once the platform has started.
#[derive(Clone)]
pub struct CoreStart {
    pub saved_objects: Arc<dyn SavedObjectsServiceStart>,
    pub elasticsearch: Arc<dyn ElasticsearchServiceStart>,
    pub ui_settings: Arc<dyn UiSettingsServiceStart>,
}
