//! Search cluster client contracts.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::platform::errors::PlatformResult;
use crate::platform::http::HttpRequest;

/// Capabilities of one field for one Elasticsearch type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldCapability {
    pub searchable: bool,
    pub aggregatable: bool,
    /// Indices holding this type, present only when the field is in conflict.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indices: Option<Vec<String>>,
}

/// Result of a field capabilities request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldCapsResponse {
    pub indices: Vec<String>,
    /// Field name to Elasticsearch type to capability.
    pub fields: BTreeMap<String, BTreeMap<String, FieldCapability>>,
}

#[async_trait]
pub trait ElasticsearchClient: Send + Sync {
    /// Field capabilities for all indices matching a comma separated expression.
    ///
    /// Fails with [`PlatformError::IndexNotFound`](crate::platform::errors::PlatformError::IndexNotFound)
    /// when nothing matches and `allow_no_indices` is false.
    async fn field_caps(&self, index: &str, allow_no_indices: bool) -> PlatformResult<FieldCapsResponse>;

    /// Names of open, non-hidden indices matching the expression.
    async fn resolve_index(&self, expression: &str) -> PlatformResult<Vec<String>>;
}

/// Cluster client pair scoped to one request.
#[derive(Clone)]
pub struct ScopedClusterClient {
    as_current_user: Arc<dyn ElasticsearchClient>,
    as_internal_user: Arc<dyn ElasticsearchClient>,
}

impl ScopedClusterClient {
    pub fn new(
        as_current_user: Arc<dyn ElasticsearchClient>,
        as_internal_user: Arc<dyn ElasticsearchClient>,
    ) -> Self {
        Self {
            as_current_user,
            as_internal_user,
        }
    }

    pub fn as_current_user(&self) -> Arc<dyn ElasticsearchClient> {
        Arc::clone(&self.as_current_user)
    }

    pub fn as_internal_user(&self) -> Arc<dyn ElasticsearchClient> {
        Arc::clone(&self.as_internal_user)
    }
}

pub trait ElasticsearchServiceStart: Send + Sync {
    fn as_scoped(&self, request: &HttpRequest) -> ScopedClusterClient;

    fn internal_client(&self) -> Arc<dyn ElasticsearchClient>;
}
