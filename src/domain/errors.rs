//! Domain errors for the index patterns service.

use thiserror::Error;

/// Errors produced by the index patterns service and its ports.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Could not locate that {object_type} (id: {id})")]
    SavedObjectNotFound { object_type: String, id: String },

    #[error("Duplicate index pattern: {0}")]
    DuplicateIndexPattern(String),

    #[error("No matching indices found: No indices match pattern \"{0}\"")]
    NoMatchingIndices(String),

    #[error("Saved object [{object_type}/{id}] has been modified since it was loaded")]
    VersionConflict { object_type: String, id: String },

    #[error("Invalid index pattern: {0}")]
    InvalidIndexPattern(String),

    #[error("UI settings unavailable: {0}")]
    SettingsUnavailable(String),

    #[error("Field formats error: {0}")]
    FieldFormats(String),

    #[error("Saved objects error: {0}")]
    Storage(String),

    #[error("Search error: {0}")]
    Search(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Platform unavailable: {0}")]
    PlatformUnavailable(String),

    #[error("A request is required to {0} on the server")]
    MissingRequest(String),

    #[error("Validation failed: {0}")]
    ValidationFailed(String),
}

pub type DomainResult<T> = Result<T, DomainError>;

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError(err.to_string())
    }
}
