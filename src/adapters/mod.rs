//! Adapters between platform clients and the index patterns ports.
//!
//! The shims wrap request-scoped platform clients so the service only sees
//! the common port traits. `memory` holds in-process platform backends.

pub mod index_patterns_api_client;
pub mod memory;
pub mod saved_objects_client_wrapper;
pub mod tracing_logger;
pub mod ui_settings_wrapper;

pub use index_patterns_api_client::IndexPatternsApiServer;
pub use saved_objects_client_wrapper::SavedObjectsClientServerToCommon;
pub use tracing_logger::TracingLogger;
pub use ui_settings_wrapper::UiSettingsServerToCommon;
