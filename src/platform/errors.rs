//! Errors raised by the host platform and its clients.

use thiserror::Error;

/// Failures surfaced by platform services and the clients they hand out.
///
/// The adapter shims in [`crate::adapters`] translate them into
/// [`DomainError`](crate::domain::errors::DomainError) before they reach the
/// index patterns service.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PlatformError {
    #[error("Saved object [{object_type}/{id}] not found")]
    NotFound { object_type: String, id: String },

    #[error("Saved object [{object_type}/{id}] conflict")]
    Conflict { object_type: String, id: String },

    #[error("Unsupported saved object type: '{0}'")]
    UnsupportedType(String),

    #[error("{kind} '{name}' is already registered")]
    DuplicateRegistration { kind: &'static str, name: String },

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Index not found: {0}")]
    IndexNotFound(String),

    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("Internal platform error: {0}")]
    Internal(String),
}

impl PlatformError {
    pub fn duplicate(kind: &'static str, name: impl Into<String>) -> Self {
        Self::DuplicateRegistration {
            kind,
            name: name.into(),
        }
    }

    pub fn not_found(object_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            object_type: object_type.into(),
            id: id.into(),
        }
    }

    /// Whether this error means the targeted saved object does not exist.
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Whether this error is a version or id conflict on write.
    pub const fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }
}

pub type PlatformResult<T> = Result<T, PlatformError>;
