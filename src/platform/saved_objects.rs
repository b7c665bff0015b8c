//! Saved objects: type registry (setup) and scoped clients (start).

use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock};

use crate::domain::models::{
    CreateOptions, FindOptions, SavedObject, SavedObjectTypeDefinition, UpdateOptions,
};
use crate::platform::errors::{PlatformError, PlatformResult};
use crate::platform::http::HttpRequest;

/// One page of a saved object listing.
#[derive(Debug, Clone, PartialEq)]
pub struct SavedObjectsFindResponse {
    pub saved_objects: Vec<SavedObject>,
    pub total: usize,
    pub page: usize,
    pub per_page: usize,
}

/// Platform saved objects client, scoped to a request or internal.
#[async_trait]
pub trait SavedObjectsClient: Send + Sync {
    async fn find(&self, options: &FindOptions) -> PlatformResult<SavedObjectsFindResponse>;

    async fn get(&self, object_type: &str, id: &str) -> PlatformResult<SavedObject>;

    async fn create(
        &self,
        object_type: &str,
        attributes: Value,
        options: &CreateOptions,
    ) -> PlatformResult<SavedObject>;

    /// Partial update: given attributes are merged over the stored ones.
    async fn update(
        &self,
        object_type: &str,
        id: &str,
        attributes: Value,
        options: &UpdateOptions,
    ) -> PlatformResult<SavedObject>;

    async fn delete(&self, object_type: &str, id: &str) -> PlatformResult<()>;
}

/// Start contract handing out saved objects clients.
pub trait SavedObjectsServiceStart: Send + Sync {
    fn get_scoped_client(&self, request: &HttpRequest) -> Arc<dyn SavedObjectsClient>;

    /// Client acting as the platform itself, for background work like telemetry.
    fn create_internal_repository(&self) -> Arc<dyn SavedObjectsClient>;
}

/// Saved object types the storage layer accepts.
#[derive(Debug, Default)]
pub struct SavedObjectTypeRegistry {
    types: RwLock<BTreeMap<String, SavedObjectTypeDefinition>>,
}

impl SavedObjectTypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_type(&self, definition: SavedObjectTypeDefinition) -> PlatformResult<()> {
        let mut types = self.types.write().unwrap_or_else(PoisonError::into_inner);
        if types.contains_key(&definition.name) {
            return Err(PlatformError::duplicate("saved object type", &definition.name));
        }
        tracing::debug!(object_type = %definition.name, "registered saved object type");
        types.insert(definition.name.clone(), definition);
        Ok(())
    }

    pub fn get_type(&self, name: &str) -> Option<SavedObjectTypeDefinition> {
        self.types
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.types
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(name)
    }

    pub fn type_names(&self) -> Vec<String> {
        self.types
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect()
    }
}
