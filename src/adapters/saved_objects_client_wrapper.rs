//! Storage shim over the platform saved objects client.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{CreateOptions, FindOptions, SavedObject, UpdateOptions};
use crate::domain::ports::SavedObjectsClientCommon;
use crate::platform::errors::PlatformError;
use crate::platform::saved_objects::SavedObjectsClient;

pub struct SavedObjectsClientServerToCommon {
    client: Arc<dyn SavedObjectsClient>,
}

impl SavedObjectsClientServerToCommon {
    pub fn new(client: Arc<dyn SavedObjectsClient>) -> Self {
        Self { client }
    }
}

pub(crate) fn storage_error(err: PlatformError) -> DomainError {
    match err {
        PlatformError::NotFound { object_type, id } => {
            DomainError::SavedObjectNotFound { object_type, id }
        }
        PlatformError::Conflict { object_type, id } => DomainError::VersionConflict { object_type, id },
        other => DomainError::Storage(other.to_string()),
    }
}

#[async_trait]
impl SavedObjectsClientCommon for SavedObjectsClientServerToCommon {
    async fn find(&self, options: FindOptions) -> DomainResult<Vec<SavedObject>> {
        let response = self.client.find(&options).await.map_err(storage_error)?;
        Ok(response.saved_objects)
    }

    async fn get(&self, object_type: &str, id: &str) -> DomainResult<SavedObject> {
        self.client.get(object_type, id).await.map_err(storage_error)
    }

    async fn update(
        &self,
        object_type: &str,
        id: &str,
        attributes: Value,
        options: UpdateOptions,
    ) -> DomainResult<SavedObject> {
        self.client
            .update(object_type, id, attributes, &options)
            .await
            .map_err(storage_error)
    }

    async fn create(
        &self,
        object_type: &str,
        attributes: Value,
        options: CreateOptions,
    ) -> DomainResult<SavedObject> {
        self.client
            .create(object_type, attributes, &options)
            .await
            .map_err(storage_error)
    }

    async fn delete(&self, object_type: &str, id: &str) -> DomainResult<()> {
        self.client.delete(object_type, id).await.map_err(storage_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemorySavedObjectsStore;
    use crate::domain::models::{index_pattern_saved_object_type, INDEX_PATTERN_SAVED_OBJECT_TYPE};
    use crate::platform::saved_objects::SavedObjectTypeRegistry;
    use serde_json::json;

    fn wrapper() -> SavedObjectsClientServerToCommon {
        let registry = Arc::new(SavedObjectTypeRegistry::new());
        registry
            .register_type(index_pattern_saved_object_type())
            .unwrap();
        SavedObjectsClientServerToCommon::new(Arc::new(InMemorySavedObjectsStore::new(registry)))
    }

    #[tokio::test]
    async fn test_find_returns_only_objects() {
        let client = wrapper();
        client
            .create(
                INDEX_PATTERN_SAVED_OBJECT_TYPE,
                json!({ "title": "logs-*" }),
                CreateOptions::default(),
            )
            .await
            .unwrap();

        let found = client
            .find(FindOptions::new(INDEX_PATTERN_SAVED_OBJECT_TYPE))
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].title(), Some("logs-*"));
    }

    #[tokio::test]
    async fn test_not_found_translated() {
        let err = wrapper()
            .get(INDEX_PATTERN_SAVED_OBJECT_TYPE, "missing")
            .await
            .unwrap_err();
        assert_eq!(
            err,
            DomainError::SavedObjectNotFound {
                object_type: "index-pattern".to_string(),
                id: "missing".to_string(),
            }
        );
        assert_eq!(err.to_string(), "Could not locate that index-pattern (id: missing)");
    }

    #[tokio::test]
    async fn test_stale_version_translated_to_conflict() {
        let client = wrapper();
        let created = client
            .create(
                INDEX_PATTERN_SAVED_OBJECT_TYPE,
                json!({ "title": "logs-*" }),
                CreateOptions::default(),
            )
            .await
            .unwrap();

        let err = client
            .update(
                INDEX_PATTERN_SAVED_OBJECT_TYPE,
                &created.id,
                json!({ "title": "logs-2-*" }),
                UpdateOptions {
                    version: Some("stale".to_string()),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::VersionConflict { .. }));
    }

    #[tokio::test]
    async fn test_unregistered_type_is_storage_error() {
        let err = wrapper()
            .create("visualization", json!({}), CreateOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Storage(_)));
    }
}
