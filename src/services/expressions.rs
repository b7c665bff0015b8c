//! `indexPatternLoad` expression function.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::BTreeMap;

use crate::domain::errors::{DomainError, DomainResult};
use crate::platform::expressions::{ArgumentDefinition, ExecutionContext, ExpressionFunction};
use crate::services::provider::{service_for_request, IndexPatternsStartServices};

pub const INDEX_PATTERN_LOAD_FUNCTION: &str = "indexPatternLoad";

/// Loads an index pattern by id on behalf of the executing request.
pub struct IndexPatternLoad {
    start_services: IndexPatternsStartServices,
}

impl IndexPatternLoad {
    pub fn new(start_services: IndexPatternsStartServices) -> Self {
        Self { start_services }
    }
}

#[async_trait]
impl ExpressionFunction for IndexPatternLoad {
    fn name(&self) -> &'static str {
        INDEX_PATTERN_LOAD_FUNCTION
    }

    fn help(&self) -> &'static str {
        "Loads an index pattern"
    }

    fn output_type(&self) -> &'static str {
        "index_pattern"
    }

    fn arguments(&self) -> Vec<ArgumentDefinition> {
        vec![ArgumentDefinition {
            name: "id",
            types: vec!["string"],
            required: true,
            help: "index pattern id to load",
        }]
    }

    async fn execute(
        &self,
        _input: Value,
        args: BTreeMap<String, Value>,
        context: &ExecutionContext,
    ) -> DomainResult<Value> {
        let request = context
            .request
            .as_ref()
            .ok_or_else(|| DomainError::MissingRequest("load index patterns".to_string()))?;
        let id = args
            .get("id")
            .and_then(Value::as_str)
            .ok_or_else(|| DomainError::ValidationFailed("id must be a string".to_string()))?;

        let service = service_for_request(&self.start_services, request).await?;
        let spec = serde_json::to_value(service.get(id).await?.spec())?;

        Ok(json!({ "type": "index_pattern", "value": spec }))
    }
}
