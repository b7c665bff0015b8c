use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Main configuration structure for the index patterns service
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Index patterns behaviour
    #[serde(default)]
    pub index_patterns: IndexPatternsConfig,

    /// UI settings default overrides
    #[serde(default)]
    pub ui_settings: UiSettingsConfig,

    /// Usage telemetry
    #[serde(default)]
    pub usage_collection: UsageCollectionConfig,

    /// Seed data for the in-memory search backend
    #[serde(default)]
    pub elasticsearch: ElasticsearchConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or pretty
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Directory for rotated log files; stdout only when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_dir: Option<PathBuf>,

    /// Log rotation: daily, hourly, never
    #[serde(default = "default_rotation")]
    pub rotation: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

fn default_rotation() -> String {
    "daily".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            log_dir: None,
            rotation: default_rotation(),
        }
    }
}

/// Index patterns configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct IndexPatternsConfig {
    /// Page size used when listing index pattern saved objects
    #[serde(default = "default_per_page")]
    pub per_page: usize,

    /// Whether patterns may be created before any index matches them
    #[serde(default)]
    pub allow_no_index: bool,
}

const fn default_per_page() -> usize {
    10_000
}

impl Default for IndexPatternsConfig {
    fn default() -> Self {
        Self {
            per_page: default_per_page(),
            allow_no_index: false,
        }
    }
}

/// Overrides applied on top of the registered UI settings defaults
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct UiSettingsConfig {
    #[serde(default)]
    pub overrides: BTreeMap<String, Value>,
}

/// Usage collection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct UsageCollectionConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
}

const fn default_true() -> bool {
    true
}

impl Default for UsageCollectionConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Seed indices for the in-memory search backend
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ElasticsearchConfig {
    /// Index name to field name to Elasticsearch type
    #[serde(default)]
    pub indices: BTreeMap<String, BTreeMap<String, String>>,
}
