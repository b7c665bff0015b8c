use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use std::path::Path;
use thiserror::Error;

use crate::domain::models::config::Config;
use crate::domain::ports::META_FIELDS_SETTING;

/// Project-local configuration directory.
pub const CONFIG_DIR: &str = ".index-patterns";
/// Environment variable prefix; nested keys use `__`.
pub const ENV_PREFIX: &str = "INDEX_PATTERNS_";

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),

    #[error("Invalid log rotation: {0}. Must be one of: daily, hourly, never")]
    InvalidRotation(String),

    #[error("Invalid per_page: {0}. Must be between 1 and 10000")]
    InvalidPerPage(usize),

    #[error("Invalid index name: '{0}'. Must be non-empty and lowercase")]
    InvalidIndexName(String),

    #[error("Field '{field}' in index '{index}' has an empty type")]
    EmptyFieldType { index: String, field: String },

    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. .index-patterns/config.yaml
    /// 3. .index-patterns/local.yaml (optional local overrides)
    /// 4. Environment variables (INDEX_PATTERNS_* prefix)
    pub fn load() -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(Path::new(CONFIG_DIR).join("config.yaml")))
            .merge(Yaml::file(Path::new(CONFIG_DIR).join("local.yaml")))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file, still honouring env overrides
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path.as_ref()))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .context(format!(
                "Failed to load config from {}",
                path.as_ref().display()
            ))?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        let valid_log_formats = ["json", "pretty"];
        if !valid_log_formats.contains(&config.logging.format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }

        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&config.logging.rotation.as_str()) {
            return Err(ConfigError::InvalidRotation(config.logging.rotation.clone()));
        }

        let per_page = config.index_patterns.per_page;
        if per_page == 0 || per_page > 10_000 {
            return Err(ConfigError::InvalidPerPage(per_page));
        }

        if let Some(meta_fields) = config.ui_settings.overrides.get(META_FIELDS_SETTING) {
            let is_string_list = meta_fields
                .as_array()
                .is_some_and(|items| items.iter().all(serde_json::Value::is_string));
            if !is_string_list {
                return Err(ConfigError::ValidationFailed(format!(
                    "ui_settings.overrides.{META_FIELDS_SETTING} must be a list of strings"
                )));
            }
        }

        for (index, fields) in &config.elasticsearch.indices {
            if index.is_empty() || index.chars().any(char::is_uppercase) {
                return Err(ConfigError::InvalidIndexName(index.clone()));
            }
            if let Some((field, _)) = fields.iter().find(|(_, es_type)| es_type.trim().is_empty()) {
                return Err(ConfigError::EmptyFieldType {
                    index: index.clone(),
                    field: field.clone(),
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.index_patterns.per_page, 10_000);
        assert!(!config.index_patterns.allow_no_index);
        assert!(config.usage_collection.enabled);
        assert_eq!(config.logging.level, "info");
        ConfigLoader::validate(&config).expect("Default config should be valid");
    }

    #[test]
    fn test_yaml_parsing() {
        let yaml = r#"
logging:
  level: debug
  format: pretty
index_patterns:
  per_page: 500
ui_settings:
  overrides:
    metaFields: ["_id", "_source"]
elasticsearch:
  indices:
    logs-2024.01:
      "@timestamp": date
      message: text
"#;

        let config: Config = serde_yaml::from_str(yaml).expect("YAML should parse");

        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, "pretty");
        assert_eq!(config.index_patterns.per_page, 500);
        assert_eq!(config.elasticsearch.indices["logs-2024.01"]["message"], "text");
        ConfigLoader::validate(&config).expect("Parsed config should be valid");
    }

    #[test]
    fn test_validate_invalid_log_level() {
        let mut config = Config::default();
        config.logging.level = "invalid".to_string();

        match ConfigLoader::validate(&config).unwrap_err() {
            ConfigError::InvalidLogLevel(level) => assert_eq!(level, "invalid"),
            other => panic!("Expected InvalidLogLevel error, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_invalid_log_format() {
        let mut config = Config::default();
        config.logging.format = "xml".to_string();

        assert!(matches!(
            ConfigLoader::validate(&config).unwrap_err(),
            ConfigError::InvalidLogFormat(format) if format == "xml"
        ));
    }

    #[test]
    fn test_validate_invalid_rotation() {
        let mut config = Config::default();
        config.logging.rotation = "weekly".to_string();

        assert!(matches!(
            ConfigLoader::validate(&config).unwrap_err(),
            ConfigError::InvalidRotation(_)
        ));
    }

    #[test]
    fn test_validate_per_page_bounds() {
        let mut config = Config::default();
        config.index_patterns.per_page = 0;
        assert!(matches!(
            ConfigLoader::validate(&config).unwrap_err(),
            ConfigError::InvalidPerPage(0)
        ));

        config.index_patterns.per_page = 10_001;
        assert!(ConfigLoader::validate(&config).is_err());
    }

    #[test]
    fn test_validate_meta_fields_override() {
        let mut config = Config::default();
        config
            .ui_settings
            .overrides
            .insert(META_FIELDS_SETTING.to_string(), serde_json::json!("_id"));

        assert!(matches!(
            ConfigLoader::validate(&config).unwrap_err(),
            ConfigError::ValidationFailed(msg) if msg.contains("metaFields")
        ));
    }

    #[test]
    fn test_validate_index_names() {
        let mut config = Config::default();
        config
            .elasticsearch
            .indices
            .insert("Logs".to_string(), Default::default());
        assert!(matches!(
            ConfigLoader::validate(&config).unwrap_err(),
            ConfigError::InvalidIndexName(name) if name == "Logs"
        ));

        let mut config = Config::default();
        config.elasticsearch.indices.insert(
            "logs".to_string(),
            [("message".to_string(), " ".to_string())].into_iter().collect(),
        );
        assert!(matches!(
            ConfigLoader::validate(&config).unwrap_err(),
            ConfigError::EmptyFieldType { .. }
        ));
    }

    #[test]
    fn test_env_override() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "logging:\n  level: info\nindex_patterns:\n  per_page: 100").unwrap();
        file.flush().unwrap();

        temp_env::with_vars(
            [
                ("INDEX_PATTERNS_LOGGING__LEVEL", Some("debug")),
                ("INDEX_PATTERNS_INDEX_PATTERNS__ALLOW_NO_INDEX", Some("true")),
            ],
            || {
                let config = ConfigLoader::load_from_file(file.path()).unwrap();
                assert_eq!(config.logging.level, "debug", "Env should win over file");
                assert_eq!(config.index_patterns.per_page, 100);
                assert!(config.index_patterns.allow_no_index);
            },
        );
    }

    #[test]
    fn test_hierarchical_merging() {
        let mut base_file = NamedTempFile::new().unwrap();
        writeln!(
            base_file,
            "index_patterns:\n  per_page: 50\nlogging:\n  level: info\n  format: json"
        )
        .unwrap();
        base_file.flush().unwrap();

        let mut override_file = NamedTempFile::new().unwrap();
        writeln!(override_file, "index_patterns:\n  per_page: 75\nlogging:\n  level: debug").unwrap();
        override_file.flush().unwrap();

        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(base_file.path()))
            .merge(Yaml::file(override_file.path()))
            .extract()
            .unwrap();

        assert_eq!(config.index_patterns.per_page, 75, "Override should win");
        assert_eq!(config.logging.level, "debug", "Override should win for nested fields");
        assert_eq!(
            config.logging.format, "json",
            "Base value should persist when not overridden"
        );
    }

    #[test]
    fn test_load_from_missing_file_uses_defaults() {
        temp_env::with_vars_unset(["INDEX_PATTERNS_LOGGING__LEVEL"], || {
            let config = ConfigLoader::load_from_file("/nonexistent/config.yaml").unwrap();
            assert_eq!(config.logging.level, "info");
        });
    }
}
