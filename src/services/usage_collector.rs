//! `index-patterns` usage collector.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::IndexPattern;
use crate::platform::usage_collection::{CollectorFetchContext, UsageCollector};
use crate::services::provider::IndexPatternsStartServices;

pub const INDEX_PATTERNS_COLLECTOR: &str = "index-patterns";

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MinMaxAvg {
    pub min: f64,
    pub max: f64,
    pub avg: f64,
}

impl MinMaxAvg {
    /// All zero for an empty input.
    pub fn of(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self::default();
        }
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let avg = values.iter().sum::<f64>() / values.len() as f64;
        Self { min, max, avg }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerIndexPatternUsage {
    pub scripted_field_count: MinMaxAvg,
    pub runtime_field_count: MinMaxAvg,
    pub scripted_field_line_count: MinMaxAvg,
    pub runtime_field_line_count: MinMaxAvg,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndexPatternsUsage {
    pub indexpatterns_total: usize,
    pub indexpatterns_with_scripted_field_count: usize,
    pub indexpatterns_with_runtime_field_count: usize,
    pub scripted_field_count: usize,
    pub runtime_field_count: usize,
    pub per_index_pattern: PerIndexPatternUsage,
}

fn line_count(script: &str) -> f64 {
    script.lines().count().max(1) as f64
}

impl IndexPatternsUsage {
    pub fn from_patterns(patterns: &[IndexPattern]) -> Self {
        let mut scripted_total = 0_usize;
        let mut runtime_total = 0_usize;
        let mut scripted_counts = Vec::with_capacity(patterns.len());
        let mut runtime_counts = Vec::with_capacity(patterns.len());
        let mut scripted_lines = Vec::new();
        let mut runtime_lines = Vec::new();

        for pattern in patterns {
            let scripted: Vec<_> = pattern.scripted_fields().collect();
            scripted_total += scripted.len();
            scripted_counts.push(scripted.len() as f64);
            scripted_lines.extend(
                scripted
                    .iter()
                    .filter_map(|field| field.script.as_deref())
                    .map(line_count),
            );

            let runtime = pattern.runtime_fields();
            runtime_total += runtime.len();
            runtime_counts.push(runtime.len() as f64);
            runtime_lines.extend(
                runtime
                    .values()
                    .filter_map(|field| field.script.as_ref())
                    .map(|script| line_count(&script.source)),
            );
        }

        Self {
            indexpatterns_total: patterns.len(),
            indexpatterns_with_scripted_field_count: scripted_counts.iter().filter(|c| **c > 0.0).count(),
            indexpatterns_with_runtime_field_count: runtime_counts.iter().filter(|c| **c > 0.0).count(),
            scripted_field_count: scripted_total,
            runtime_field_count: runtime_total,
            per_index_pattern: PerIndexPatternUsage {
                scripted_field_count: MinMaxAvg::of(&scripted_counts),
                runtime_field_count: MinMaxAvg::of(&runtime_counts),
                scripted_field_line_count: MinMaxAvg::of(&scripted_lines),
                runtime_field_line_count: MinMaxAvg::of(&runtime_lines),
            },
        }
    }
}

/// Collects index pattern statistics as the internal user.
pub struct IndexPatternsUsageCollector {
    start_services: IndexPatternsStartServices,
}

impl IndexPatternsUsageCollector {
    pub fn new(start_services: IndexPatternsStartServices) -> Self {
        Self { start_services }
    }
}

#[async_trait]
impl UsageCollector for IndexPatternsUsageCollector {
    fn collector_type(&self) -> &'static str {
        INDEX_PATTERNS_COLLECTOR
    }

    async fn is_ready(&self) -> bool {
        self.start_services.is_resolved()
    }

    async fn fetch(&self, _context: &CollectorFetchContext) -> DomainResult<Value> {
        let started = self
            .start_services
            .get()
            .await
            .map_err(|err| DomainError::PlatformUnavailable(err.to_string()))?;
        let service = started
            .own
            .index_patterns_service_factory
            .create(
                started.core.saved_objects.create_internal_repository(),
                started.core.elasticsearch.internal_client(),
            )
            .await?;

        let mut patterns = Vec::new();
        for id in service.get_ids().await? {
            patterns.push(service.get(&id).await?);
        }

        let usage = IndexPatternsUsage::from_patterns(&patterns);
        debug!(total = usage.indexpatterns_total, "collected index pattern usage");
        Ok(serde_json::to_value(usage)?)
    }
}
