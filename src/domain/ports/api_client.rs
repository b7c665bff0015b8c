//! Search API port used to discover fields behind an index pattern.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::errors::DomainResult;
use crate::domain::models::FieldSpec;

/// Parameters for a field listing over a wildcard expression.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetFieldsOptions {
    pub pattern: String,
    #[serde(default)]
    pub meta_fields: Vec<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub pattern_type: Option<String>,
    /// Return an empty list instead of failing when nothing matches.
    #[serde(default)]
    pub allow_no_index: bool,
}

impl GetFieldsOptions {
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            ..Self::default()
        }
    }
}

#[async_trait]
pub trait IndexPatternsApiClient: Send + Sync {
    /// Fields of every index matched by `options.pattern`.
    ///
    /// Fails with [`DomainError::NoMatchingIndices`](crate::domain::errors::DomainError::NoMatchingIndices)
    /// when nothing matches and `allow_no_index` is not set.
    async fn get_fields_for_wildcard(&self, options: &GetFieldsOptions) -> DomainResult<Vec<FieldSpec>>;

    /// Whether the user has created index patterns or has data worth one.
    async fn has_user_index_pattern(&self) -> DomainResult<bool>;
}
