//! Search cluster stand-in serving field capabilities from fixed mappings.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::platform::elasticsearch::{
    ElasticsearchClient, ElasticsearchServiceStart, FieldCapability, FieldCapsResponse,
    ScopedClusterClient,
};
use crate::platform::errors::{PlatformError, PlatformResult};
use crate::platform::http::HttpRequest;

/// Metadata fields every index reports.
const META_FIELDS: &[(&str, &str)] = &[("_id", "_id"), ("_index", "_index"), ("_source", "_source")];

/// Glob match where `*` spans any run of characters.
pub fn matches_wildcard(pattern: &str, name: &str) -> bool {
    let parts: Vec<&str> = pattern.split('*').collect();
    if parts.len() == 1 {
        return pattern == name;
    }

    let (first, rest) = (parts[0], &parts[1..]);
    let Some(mut remaining) = name.strip_prefix(first) else {
        return false;
    };
    let (last, middle) = rest.split_last().map_or(("", &[][..]), |(l, m)| (*l, m));

    for part in middle {
        match remaining.find(part) {
            Some(at) => remaining = &remaining[at + part.len()..],
            None => return false,
        }
    }
    remaining.len() >= last.len() && remaining.ends_with(last)
}

/// Index name to field name to mapping type.
#[derive(Debug, Clone, Default)]
pub struct InMemoryElasticsearch {
    indices: BTreeMap<String, BTreeMap<String, String>>,
}

impl InMemoryElasticsearch {
    pub fn new(indices: BTreeMap<String, BTreeMap<String, String>>) -> Self {
        Self { indices }
    }

    pub fn index_names(&self) -> impl Iterator<Item = &str> {
        self.indices.keys().map(String::as_str)
    }

    /// Indices matched by a comma separated expression. Dot-prefixed indices
    /// only match patterns that start with a dot.
    fn matching(&self, expression: &str) -> Vec<&str> {
        let patterns: Vec<&str> = expression
            .split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .collect();

        self.indices
            .keys()
            .map(String::as_str)
            .filter(|name| {
                patterns.iter().any(|pattern| {
                    (!name.starts_with('.') || pattern.starts_with('.')) && matches_wildcard(pattern, name)
                })
            })
            .collect()
    }
}

#[async_trait]
impl ElasticsearchClient for InMemoryElasticsearch {
    async fn field_caps(&self, index: &str, allow_no_indices: bool) -> PlatformResult<FieldCapsResponse> {
        let matched = self.matching(index);
        if matched.is_empty() && !allow_no_indices {
            return Err(PlatformError::IndexNotFound(index.to_string()));
        }

        // field -> es type -> indices holding it
        let mut by_field: BTreeMap<String, BTreeMap<String, Vec<String>>> = BTreeMap::new();
        for name in &matched {
            let mappings = self.indices.get(*name).into_iter().flatten();
            let meta = META_FIELDS
                .iter()
                .map(|(field, es_type)| ((*field).to_string(), (*es_type).to_string()));
            for (field, es_type) in mappings.map(|(f, t)| (f.clone(), t.clone())).chain(meta) {
                by_field
                    .entry(field)
                    .or_default()
                    .entry(es_type)
                    .or_default()
                    .push((*name).to_string());
            }
        }

        let fields = by_field
            .into_iter()
            .map(|(field, types)| {
                let conflicting = types.len() > 1;
                let caps = types
                    .into_iter()
                    .map(|(es_type, indices)| {
                        let capability = FieldCapability {
                            searchable: es_type != "_source",
                            aggregatable: !matches!(es_type.as_str(), "text" | "_source"),
                            indices: conflicting.then_some(indices),
                        };
                        (es_type, capability)
                    })
                    .collect();
                (field, caps)
            })
            .collect();

        Ok(FieldCapsResponse {
            indices: matched.into_iter().map(str::to_string).collect(),
            fields,
        })
    }

    async fn resolve_index(&self, expression: &str) -> PlatformResult<Vec<String>> {
        Ok(self
            .matching(expression)
            .into_iter()
            .map(str::to_string)
            .collect())
    }
}

/// Hands out the same cluster for every scope.
#[derive(Debug, Clone)]
pub struct InMemoryElasticsearchService {
    client: Arc<InMemoryElasticsearch>,
}

impl InMemoryElasticsearchService {
    pub fn new(client: Arc<InMemoryElasticsearch>) -> Self {
        Self { client }
    }
}

impl ElasticsearchServiceStart for InMemoryElasticsearchService {
    fn as_scoped(&self, request: &HttpRequest) -> ScopedClusterClient {
        tracing::trace!(request_id = %request.id, "scoped cluster client");
        let client = Arc::clone(&self.client) as Arc<dyn ElasticsearchClient>;
        ScopedClusterClient::new(Arc::clone(&client), client)
    }

    fn internal_client(&self) -> Arc<dyn ElasticsearchClient> {
        Arc::clone(&self.client) as Arc<dyn ElasticsearchClient>
    }
}
