//! Saved object storage kept in process memory.

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use uuid::Uuid;

use crate::domain::models::{CreateOptions, FindOptions, SavedObject, UpdateOptions};
use crate::platform::errors::{PlatformError, PlatformResult};
use crate::platform::http::HttpRequest;
use crate::platform::saved_objects::{
    SavedObjectTypeRegistry, SavedObjectsClient, SavedObjectsFindResponse, SavedObjectsServiceStart,
};

/// Whether `title` satisfies a find search expression.
///
/// `"exact"` matches exactly, `*` matches everything, anything else (with or
/// without a trailing `*`) matches by prefix.
fn search_matches(search: &str, value: &str) -> bool {
    let search = search.trim();
    if let Some(exact) = search.strip_prefix('"').and_then(|s| s.strip_suffix('"')) {
        return value == exact;
    }
    let prefix = search.trim_end_matches('*');
    value.starts_with(prefix)
}

fn project(attributes: &Value, fields: &[String]) -> Value {
    if fields.is_empty() {
        return attributes.clone();
    }
    let projected: Map<String, Value> = fields
        .iter()
        .filter_map(|field| attributes.get(field).map(|v| (field.clone(), v.clone())))
        .collect();
    Value::Object(projected)
}

/// Objects keyed by `(type, id)`, validated against the type registry.
#[derive(Debug)]
pub struct InMemorySavedObjectsStore {
    registry: Arc<SavedObjectTypeRegistry>,
    objects: RwLock<BTreeMap<(String, String), SavedObject>>,
    next_version: AtomicU64,
}

impl InMemorySavedObjectsStore {
    pub fn new(registry: Arc<SavedObjectTypeRegistry>) -> Self {
        Self {
            registry,
            objects: RwLock::new(BTreeMap::new()),
            next_version: AtomicU64::new(1),
        }
    }

    pub fn len(&self) -> usize {
        self.objects.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn version(&self) -> String {
        self.next_version.fetch_add(1, Ordering::Relaxed).to_string()
    }

    fn ensure_registered(&self, object_type: &str) -> PlatformResult<()> {
        if self.registry.is_registered(object_type) {
            Ok(())
        } else {
            Err(PlatformError::UnsupportedType(object_type.to_string()))
        }
    }
}

#[async_trait]
impl SavedObjectsClient for InMemorySavedObjectsStore {
    async fn find(&self, options: &FindOptions) -> PlatformResult<SavedObjectsFindResponse> {
        let objects = self.objects.read().unwrap_or_else(PoisonError::into_inner);
        let matching: Vec<&SavedObject> = objects
            .values()
            .filter(|object| object.object_type == options.object_type)
            .filter(|object| match &options.search {
                None => true,
                Some(search) => {
                    let fields = if options.search_fields.is_empty() {
                        vec!["title".to_string()]
                    } else {
                        options.search_fields.clone()
                    };
                    fields.iter().any(|field| {
                        object
                            .attributes
                            .get(field)
                            .and_then(Value::as_str)
                            .is_some_and(|value| search_matches(search, value))
                    })
                }
            })
            .collect();

        let total = matching.len();
        let saved_objects = matching
            .into_iter()
            .take(options.per_page)
            .map(|object| SavedObject {
                attributes: project(&object.attributes, &options.fields),
                ..object.clone()
            })
            .collect();

        Ok(SavedObjectsFindResponse {
            saved_objects,
            total,
            page: 1,
            per_page: options.per_page,
        })
    }

    async fn get(&self, object_type: &str, id: &str) -> PlatformResult<SavedObject> {
        self.objects
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&(object_type.to_string(), id.to_string()))
            .cloned()
            .ok_or_else(|| PlatformError::not_found(object_type, id))
    }

    async fn create(
        &self,
        object_type: &str,
        attributes: Value,
        options: &CreateOptions,
    ) -> PlatformResult<SavedObject> {
        self.ensure_registered(object_type)?;
        if !attributes.is_object() {
            return Err(PlatformError::BadRequest(
                "attributes must be a JSON object".to_string(),
            ));
        }

        let id = options
            .id
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let key = (object_type.to_string(), id.clone());

        let mut objects = self.objects.write().unwrap_or_else(PoisonError::into_inner);
        if objects.contains_key(&key) && !options.overwrite {
            return Err(PlatformError::Conflict {
                object_type: object_type.to_string(),
                id,
            });
        }

        let object = SavedObject {
            id,
            object_type: object_type.to_string(),
            attributes,
            references: Vec::new(),
            version: Some(self.version()),
            updated_at: Some(Utc::now()),
        };
        objects.insert(key, object.clone());
        Ok(object)
    }

    async fn update(
        &self,
        object_type: &str,
        id: &str,
        attributes: Value,
        options: &UpdateOptions,
    ) -> PlatformResult<SavedObject> {
        let Value::Object(changes) = attributes else {
            return Err(PlatformError::BadRequest(
                "attributes must be a JSON object".to_string(),
            ));
        };

        let mut objects = self.objects.write().unwrap_or_else(PoisonError::into_inner);
        let object = objects
            .get_mut(&(object_type.to_string(), id.to_string()))
            .ok_or_else(|| PlatformError::not_found(object_type, id))?;

        if options.version.is_some() && options.version != object.version {
            return Err(PlatformError::Conflict {
                object_type: object_type.to_string(),
                id: id.to_string(),
            });
        }

        if let Value::Object(current) = &mut object.attributes {
            current.extend(changes);
        } else {
            object.attributes = Value::Object(changes);
        }
        object.version = Some(self.version());
        object.updated_at = Some(Utc::now());
        Ok(object.clone())
    }

    async fn delete(&self, object_type: &str, id: &str) -> PlatformResult<()> {
        self.objects
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&(object_type.to_string(), id.to_string()))
            .map(|_| ())
            .ok_or_else(|| PlatformError::not_found(object_type, id))
    }
}

/// Start contract handing out the shared store for every scope.
#[derive(Debug, Clone)]
pub struct InMemorySavedObjectsService {
    store: Arc<InMemorySavedObjectsStore>,
}

impl InMemorySavedObjectsService {
    pub fn new(store: Arc<InMemorySavedObjectsStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> Arc<InMemorySavedObjectsStore> {
        Arc::clone(&self.store)
    }
}

impl SavedObjectsServiceStart for InMemorySavedObjectsService {
    fn get_scoped_client(&self, request: &HttpRequest) -> Arc<dyn SavedObjectsClient> {
        tracing::trace!(request_id = %request.id, "scoped saved objects client");
        Arc::clone(&self.store) as Arc<dyn SavedObjectsClient>
    }

    fn create_internal_repository(&self) -> Arc<dyn SavedObjectsClient> {
        Arc::clone(&self.store) as Arc<dyn SavedObjectsClient>
    }
}
