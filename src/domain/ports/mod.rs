//! Port trait definitions (Hexagonal Architecture)
//!
//! This module defines the interfaces the index patterns service is written
//! against:
//! - UiSettingsCommon: settings access
//! - SavedObjectsClientCommon: saved object storage
//! - IndexPatternsApiClient: field discovery through the search API
//! - FieldFormatsStart: field formats registry resolution
//! - Logger: leveled logging
//!
//! The adapters in `crate::adapters` implement these on top of platform clients.

pub mod api_client;
pub mod field_formats;
pub mod logger;
pub mod saved_objects;
pub mod ui_settings;

pub use api_client::{GetFieldsOptions, IndexPatternsApiClient};
pub use field_formats::FieldFormatsStart;
pub use logger::{Level, Logger};
pub use saved_objects::SavedObjectsClientCommon;
pub use ui_settings::{
    UiSettingsCommon, DEFAULT_INDEX_SETTING, FORMAT_DEFAULT_TYPE_MAP_SETTING, META_FIELDS_SETTING,
};
