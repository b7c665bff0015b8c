pub mod config;
pub mod events;
pub mod field_formats;
pub mod index_pattern;
pub mod saved_object;

pub use config::{
    Config, ElasticsearchConfig, IndexPatternsConfig, LoggingConfig, UiSettingsConfig,
    UsageCollectionConfig,
};
pub use events::{
    Notification, OnError, OnNotification, OnUnsupportedTimePattern, UnsupportedTimePattern,
};
pub use field_formats::FieldFormatsRegistry;
pub use index_pattern::{
    FieldSpec, IndexPattern, IndexPatternAttributes, IndexPatternListItem, IndexPatternSpec,
    RuntimeField, RuntimeFieldScript, SerializedFieldFormat, SourceFilter,
};
pub use saved_object::{
    index_pattern_saved_object_type, CreateOptions, FindOptions, NamespaceType, SavedObject,
    SavedObjectReference, SavedObjectTypeDefinition, SavedObjectTypeManagement, UpdateOptions,
    INDEX_PATTERN_SAVED_OBJECT_TYPE,
};
