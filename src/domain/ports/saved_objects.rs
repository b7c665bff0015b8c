//! Saved objects port used by the index patterns service.

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::errors::DomainResult;
use crate::domain::models::{CreateOptions, FindOptions, SavedObject, UpdateOptions};

/// Storage access as the index patterns service expects it.
///
/// Not-found and conflict conditions surface as
/// [`DomainError::SavedObjectNotFound`](crate::domain::errors::DomainError::SavedObjectNotFound)
/// and [`DomainError::VersionConflict`](crate::domain::errors::DomainError::VersionConflict).
#[async_trait]
pub trait SavedObjectsClientCommon: Send + Sync {
    async fn find(&self, options: FindOptions) -> DomainResult<Vec<SavedObject>>;

    async fn get(&self, object_type: &str, id: &str) -> DomainResult<SavedObject>;

    async fn update(
        &self,
        object_type: &str,
        id: &str,
        attributes: Value,
        options: UpdateOptions,
    ) -> DomainResult<SavedObject>;

    async fn create(
        &self,
        object_type: &str,
        attributes: Value,
        options: CreateOptions,
    ) -> DomainResult<SavedObject>;

    async fn delete(&self, object_type: &str, id: &str) -> DomainResult<()>;
}
