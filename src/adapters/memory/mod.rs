//! In-process platform backends.
//!
//! These drive the wiring end to end for the CLI and the test suites.

pub mod elasticsearch;
pub mod recording_logger;
pub mod saved_objects;
pub mod ui_settings;

pub use elasticsearch::{InMemoryElasticsearch, InMemoryElasticsearchService};
pub use recording_logger::{LogEntry, RecordingLogger};
pub use saved_objects::{InMemorySavedObjectsService, InMemorySavedObjectsStore};
pub use ui_settings::{
    config_saved_object_type, default_settings, InMemoryUiSettingsClient, InMemoryUiSettingsService,
    CONFIG_SAVED_OBJECT_ID, CONFIG_SAVED_OBJECT_TYPE,
};
