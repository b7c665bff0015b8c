//! Expressions engine setup contract.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock};

use crate::domain::errors::{DomainError, DomainResult};
use crate::platform::errors::{PlatformError, PlatformResult};
use crate::platform::http::HttpRequest;

/// Context an expression runs in.
#[derive(Debug, Clone, Default)]
pub struct ExecutionContext {
    /// Request that triggered the execution, when run on behalf of a user.
    pub request: Option<Arc<HttpRequest>>,
}

impl ExecutionContext {
    pub fn for_request(request: HttpRequest) -> Self {
        Self {
            request: Some(Arc::new(request)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArgumentDefinition {
    pub name: &'static str,
    pub types: Vec<&'static str>,
    pub required: bool,
    pub help: &'static str,
}

#[async_trait]
pub trait ExpressionFunction: Send + Sync {
    fn name(&self) -> &'static str;

    fn help(&self) -> &'static str;

    /// Type of the value the function returns.
    fn output_type(&self) -> &'static str;

    fn arguments(&self) -> Vec<ArgumentDefinition>;

    async fn execute(
        &self,
        input: Value,
        args: BTreeMap<String, Value>,
        context: &ExecutionContext,
    ) -> DomainResult<Value>;
}

#[derive(Default)]
pub struct ExpressionsService {
    functions: RwLock<BTreeMap<String, Arc<dyn ExpressionFunction>>>,
}

impl std::fmt::Debug for ExpressionsService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExpressionsService")
            .field("functions", &self.function_names())
            .finish()
    }
}

impl ExpressionsService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_function(&self, function: impl ExpressionFunction + 'static) -> PlatformResult<()> {
        let mut functions = self.functions.write().unwrap_or_else(PoisonError::into_inner);
        let name = function.name();
        if functions.contains_key(name) {
            return Err(PlatformError::duplicate("expression function", name));
        }
        tracing::debug!(function = name, "registered expression function");
        functions.insert(name.to_string(), Arc::new(function));
        Ok(())
    }

    pub fn function_names(&self) -> Vec<String> {
        self.functions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect()
    }

    pub fn get_function(&self, name: &str) -> Option<Arc<dyn ExpressionFunction>> {
        self.functions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    /// Run a registered function after checking its required arguments.
    pub async fn run(
        &self,
        name: &str,
        input: Value,
        args: BTreeMap<String, Value>,
        context: &ExecutionContext,
    ) -> DomainResult<Value> {
        let function = self
            .get_function(name)
            .ok_or_else(|| DomainError::ValidationFailed(format!("Function {name} could not be found")))?;

        if let Some(missing) = function
            .arguments()
            .iter()
            .find(|arg| arg.required && !args.contains_key(arg.name))
        {
            return Err(DomainError::ValidationFailed(format!(
                "{name} requires an \"{}\" argument",
                missing.name
            )));
        }

        function.execute(input, args, context).await
    }
}
