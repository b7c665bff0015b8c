//! Usage telemetry collectors.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock};

use crate::domain::errors::DomainResult;
use crate::platform::elasticsearch::ElasticsearchClient;
use crate::platform::errors::{PlatformError, PlatformResult};
use crate::platform::saved_objects::SavedObjectsClient;

/// Clients a collector may use while fetching.
#[derive(Clone)]
pub struct CollectorFetchContext {
    pub saved_objects_client: Arc<dyn SavedObjectsClient>,
    pub elasticsearch_client: Arc<dyn ElasticsearchClient>,
}

#[async_trait]
pub trait UsageCollector: Send + Sync {
    fn collector_type(&self) -> &'static str;

    async fn is_ready(&self) -> bool {
        true
    }

    async fn fetch(&self, context: &CollectorFetchContext) -> DomainResult<Value>;
}

#[derive(Default)]
pub struct UsageCollectionService {
    collectors: RwLock<BTreeMap<String, Arc<dyn UsageCollector>>>,
}

impl std::fmt::Debug for UsageCollectionService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UsageCollectionService")
            .field("collectors", &self.collector_types())
            .finish()
    }
}

impl UsageCollectionService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_collector(&self, collector: impl UsageCollector + 'static) -> PlatformResult<()> {
        let mut collectors = self.collectors.write().unwrap_or_else(PoisonError::into_inner);
        let collector_type = collector.collector_type();
        if collectors.contains_key(collector_type) {
            return Err(PlatformError::duplicate("usage collector", collector_type));
        }
        tracing::debug!(collector = collector_type, "registered usage collector");
        collectors.insert(collector_type.to_string(), Arc::new(collector));
        Ok(())
    }

    pub fn collector_types(&self) -> Vec<String> {
        self.collectors
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect()
    }

    /// Fetch every ready collector. Failing collectors are logged and skipped.
    pub async fn bulk_fetch(&self, context: &CollectorFetchContext) -> BTreeMap<String, Value> {
        let collectors: Vec<Arc<dyn UsageCollector>> = self
            .collectors
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect();

        let mut results = BTreeMap::new();
        for collector in collectors {
            let collector_type = collector.collector_type();
            if !collector.is_ready().await {
                tracing::debug!(collector = collector_type, "collector not ready, skipping");
                continue;
            }
            match collector.fetch(context).await {
                Ok(value) => {
                    results.insert(collector_type.to_string(), value);
                }
                Err(error) => {
                    tracing::warn!(collector = collector_type, %error, "usage collector failed");
                }
            }
        }
        results
    }
}
