//! Field discovery shim over the search cluster client.

use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tracing::{debug, instrument};

use crate::adapters::saved_objects_client_wrapper::storage_error;
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{FieldSpec, FindOptions, INDEX_PATTERN_SAVED_OBJECT_TYPE};
use crate::domain::ports::{GetFieldsOptions, IndexPatternsApiClient};
use crate::platform::elasticsearch::{ElasticsearchClient, FieldCapability};
use crate::platform::errors::PlatformError;
use crate::platform::saved_objects::SavedObjectsClient;

/// Patterns created automatically for agent data; they do not count as user patterns.
const LOGS_INDEX_PATTERN: &str = "logs-*";
const METRICS_INDEX_PATTERN: &str = "metrics-*";

/// Agent-managed sources that exist before the user ingests anything.
const DEFAULT_SOURCES_TO_IGNORE: &[&str] = &[
    "metrics-endpoint.metadata_current_default",
    "logs-elastic_agent-default",
    "metrics-elastic_agent-default",
];

/// Elasticsearch types without their own field entry (object parents).
const PARENT_TYPES: &[&str] = &["object", "nested"];

/// Map an Elasticsearch mapping type onto a field type.
pub fn cast_es_to_kbn_type(es_type: &str) -> &'static str {
    match es_type {
        "text" | "keyword" | "constant_keyword" | "wildcard" | "version" | "string"
        | "match_only_text" => "string",
        "float" | "half_float" | "scaled_float" | "double" | "integer" | "long"
        | "unsigned_long" | "short" | "byte" | "token_count" => "number",
        "date" | "date_nanos" => "date",
        "ip" => "ip",
        "boolean" => "boolean",
        "geo_point" => "geo_point",
        "geo_shape" | "shape" => "geo_shape",
        "attachment" => "attachment",
        "murmur3" => "murmur3",
        "histogram" => "histogram",
        "_source" => "_source",
        "nested" => "nested",
        _ => "unknown",
    }
}

fn should_read_from_doc_values(aggregatable: bool, es_type: &str) -> bool {
    aggregatable && !matches!(es_type, "text" | "geo_shape") && !es_type.starts_with('_')
}

/// Fixed shapes for metadata fields.
fn apply_meta_overrides(mut field: FieldSpec) -> FieldSpec {
    match field.name.as_str() {
        "_source" => field.field_type = "_source".to_string(),
        "_id" | "_index" | "_type" => field.field_type = "string".to_string(),
        "_score" => {
            field.field_type = "number".to_string();
            field.searchable = false;
            field.aggregatable = false;
        }
        _ => {}
    }
    field
}

fn field_from_capabilities(name: &str, by_type: &BTreeMap<String, FieldCapability>) -> FieldSpec {
    let es_types: Vec<String> = by_type.keys().cloned().collect();
    let kbn_types: BTreeSet<&str> = es_types.iter().map(|t| cast_es_to_kbn_type(t)).collect();

    let mut field = FieldSpec::new(name, "unknown");
    field.searchable = by_type.values().any(|c| c.searchable);
    field.aggregatable = by_type.values().any(|c| c.aggregatable);

    if kbn_types.len() > 1 {
        field.field_type = "conflict".to_string();
        field.aggregatable = false;
        field.conflict_descriptions = Some(
            by_type
                .iter()
                .map(|(es_type, cap)| (es_type.clone(), cap.indices.clone().unwrap_or_default()))
                .collect(),
        );
    } else if let Some(kbn_type) = kbn_types.into_iter().next() {
        field.field_type = kbn_type.to_string();
    }

    field.read_from_doc_values = es_types
        .first()
        .is_some_and(|es_type| es_types.len() == 1 && should_read_from_doc_values(field.aggregatable, es_type));
    field.es_types = es_types;
    field
}

/// Search API client used by the index patterns service on the server.
pub struct IndexPatternsApiServer {
    elasticsearch: Arc<dyn ElasticsearchClient>,
    saved_objects: Arc<dyn SavedObjectsClient>,
}

impl IndexPatternsApiServer {
    pub fn new(elasticsearch: Arc<dyn ElasticsearchClient>, saved_objects: Arc<dyn SavedObjectsClient>) -> Self {
        Self {
            elasticsearch,
            saved_objects,
        }
    }
}

#[async_trait]
impl IndexPatternsApiClient for IndexPatternsApiServer {
    #[instrument(skip(self), fields(pattern = %options.pattern))]
    async fn get_fields_for_wildcard(&self, options: &GetFieldsOptions) -> DomainResult<Vec<FieldSpec>> {
        let response = self
            .elasticsearch
            .field_caps(&options.pattern, options.allow_no_index)
            .await
            .map_err(|err| match err {
                PlatformError::IndexNotFound(_) => DomainError::NoMatchingIndices(options.pattern.clone()),
                other => DomainError::Search(other.to_string()),
            })?;

        if response.indices.is_empty() && !options.allow_no_index {
            return Err(DomainError::NoMatchingIndices(options.pattern.clone()));
        }

        let mut fields: BTreeMap<String, FieldSpec> = response
            .fields
            .iter()
            .filter(|(name, _)| !name.starts_with('_'))
            .filter(|(_, by_type)| !by_type.keys().all(|t| PARENT_TYPES.contains(&t.as_str())))
            .map(|(name, by_type)| (name.clone(), field_from_capabilities(name, by_type)))
            .collect();

        for meta in &options.meta_fields {
            let field = match response.fields.get(meta) {
                Some(by_type) => field_from_capabilities(meta, by_type),
                None => FieldSpec::new(meta.as_str(), "string"),
            };
            fields.insert(meta.clone(), apply_meta_overrides(field));
        }

        debug!(indices = response.indices.len(), fields = fields.len(), "resolved fields for wildcard");
        Ok(fields.into_values().collect())
    }

    #[instrument(skip(self))]
    async fn has_user_index_pattern(&self) -> DomainResult<bool> {
        let options = FindOptions::new(INDEX_PATTERN_SAVED_OBJECT_TYPE)
            .with_fields(["title"])
            .with_search("*", "title")
            .with_per_page(100);
        let patterns = self.saved_objects.find(&options).await.map_err(storage_error)?;

        if patterns.total == 0 {
            return Ok(false);
        }

        let has_custom = patterns.saved_objects.iter().any(|object| {
            !matches!(object.title(), Some(LOGS_INDEX_PATTERN | METRICS_INDEX_PATTERN))
        });
        if has_custom {
            return Ok(true);
        }

        let sources = self
            .elasticsearch
            .resolve_index(&format!("{LOGS_INDEX_PATTERN},{METRICS_INDEX_PATTERN}"))
            .await
            .map_err(|err| DomainError::Search(err.to_string()))?;

        Ok(sources
            .iter()
            .any(|name| !DEFAULT_SOURCES_TO_IGNORE.contains(&name.as_str())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{InMemoryElasticsearch, InMemorySavedObjectsStore};
    use crate::domain::models::{index_pattern_saved_object_type, CreateOptions};
    use crate::platform::saved_objects::SavedObjectTypeRegistry;
    use serde_json::json;

    fn index(fields: &[(&str, &str)]) -> BTreeMap<String, String> {
        fields
            .iter()
            .map(|(name, es_type)| ((*name).to_string(), (*es_type).to_string()))
            .collect()
    }

    fn api(indices: BTreeMap<String, BTreeMap<String, String>>) -> (IndexPatternsApiServer, Arc<InMemorySavedObjectsStore>) {
        let registry = Arc::new(SavedObjectTypeRegistry::new());
        registry
            .register_type(index_pattern_saved_object_type())
            .unwrap();
        let store = Arc::new(InMemorySavedObjectsStore::new(registry));
        let es = Arc::new(InMemoryElasticsearch::new(indices));
        (IndexPatternsApiServer::new(es, Arc::clone(&store) as Arc<dyn SavedObjectsClient>), store)
    }

    #[test]
    fn test_cast_es_types() {
        assert_eq!(cast_es_to_kbn_type("keyword"), "string");
        assert_eq!(cast_es_to_kbn_type("long"), "number");
        assert_eq!(cast_es_to_kbn_type("date_nanos"), "date");
        assert_eq!(cast_es_to_kbn_type("dense_vector"), "unknown");
    }

    #[tokio::test]
    async fn test_fields_mapped_and_meta_fields_appended() {
        let (api, _) = api(BTreeMap::from([(
            "logs-a".to_string(),
            index(&[("@timestamp", "date"), ("message", "text"), ("bytes", "long")]),
        )]));

        let mut options = GetFieldsOptions::new("logs-*");
        options.meta_fields = vec!["_id".to_string(), "_source".to_string()];
        let fields = api.get_fields_for_wildcard(&options).await.unwrap();
        let by_name: BTreeMap<&str, &FieldSpec> = fields.iter().map(|f| (f.name.as_str(), f)).collect();

        assert_eq!(by_name["@timestamp"].field_type, "date");
        assert!(by_name["@timestamp"].read_from_doc_values);
        assert_eq!(by_name["message"].field_type, "string");
        assert!(!by_name["message"].aggregatable);
        assert_eq!(by_name["bytes"].field_type, "number");
        assert_eq!(by_name["_id"].field_type, "string");
        assert_eq!(by_name["_source"].field_type, "_source");
        assert!(!by_name.contains_key("_index"));
    }

    #[tokio::test]
    async fn test_conflicting_types_reported() {
        let (api, _) = api(BTreeMap::from([
            ("logs-a".to_string(), index(&[("status", "long")])),
            ("logs-b".to_string(), index(&[("status", "keyword")])),
        ]));

        let fields = api
            .get_fields_for_wildcard(&GetFieldsOptions::new("logs-*"))
            .await
            .unwrap();
        let status = fields.iter().find(|f| f.name == "status").unwrap();
        assert_eq!(status.field_type, "conflict");
        let descriptions = status.conflict_descriptions.as_ref().unwrap();
        assert_eq!(descriptions["long"], vec!["logs-a".to_string()]);
        assert_eq!(descriptions["keyword"], vec!["logs-b".to_string()]);
    }

    #[tokio::test]
    async fn test_no_matching_indices() {
        let (api, _) = api(BTreeMap::new());

        let err = api
            .get_fields_for_wildcard(&GetFieldsOptions::new("nothing-*"))
            .await
            .unwrap_err();
        assert_eq!(err, DomainError::NoMatchingIndices("nothing-*".to_string()));

        let mut options = GetFieldsOptions::new("nothing-*");
        options.allow_no_index = true;
        assert!(api.get_fields_for_wildcard(&options).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_has_user_index_pattern() {
        let (api, store) = api(BTreeMap::from([(
            "logs-elastic_agent-default".to_string(),
            index(&[("message", "text")]),
        )]));
        assert!(!api.has_user_index_pattern().await.unwrap());

        store
            .create(
                INDEX_PATTERN_SAVED_OBJECT_TYPE,
                json!({ "title": "logs-*" }),
                &CreateOptions::default(),
            )
            .await
            .unwrap();
        assert!(!api.has_user_index_pattern().await.unwrap());

        store
            .create(
                INDEX_PATTERN_SAVED_OBJECT_TYPE,
                json!({ "title": "web-*" }),
                &CreateOptions::default(),
            )
            .await
            .unwrap();
        assert!(api.has_user_index_pattern().await.unwrap());
    }
}
