//! Project initialization and platform bootstrap
//!
//! Handles:
//! - Configuration directory and default config file creation
//! - Assembling the in-memory platform and running the index patterns
//!   capability through its setup and start phases

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use crate::adapters::memory::{
    config_saved_object_type, InMemoryElasticsearch, InMemoryElasticsearchService,
    InMemorySavedObjectsService, InMemorySavedObjectsStore, InMemoryUiSettingsService,
};
use crate::adapters::TracingLogger;
use crate::domain::models::Config;
use crate::domain::ports::{FieldFormatsStart, Logger};
use crate::infrastructure::config::CONFIG_DIR;
use crate::platform::{
    CapabilitiesService, CollectorFetchContext, CoreSetup, CoreStart, ExpressionsService,
    HttpService, SavedObjectTypeRegistry, UiSettingsServiceStart, UsageCollectionService,
};
use crate::services::field_formats::FieldFormatsService;
use crate::services::provider::{
    IndexPatternsServiceProvider, IndexPatternsServiceSetupDeps, IndexPatternsServiceStart,
    IndexPatternsServiceStartDeps, IndexPatternsStartServices,
};

/// Default configuration template content
pub const DEFAULT_CONFIG_TEMPLATE: &str = r#"# Index patterns service configuration
# Override settings by editing this file, adding .index-patterns/local.yaml,
# or setting environment variables with the INDEX_PATTERNS_ prefix
#
# Example environment variables:
#   export INDEX_PATTERNS_LOGGING__LEVEL=debug
#   export INDEX_PATTERNS_INDEX_PATTERNS__PER_PAGE=500

# Logging configuration
logging:
  # Log level: trace, debug, info, warn, error
  level: "info"

  # Log format: json, pretty
  format: "json"

  # Rotation for files under log_dir: daily, hourly, never
  rotation: "daily"

# Index patterns behaviour
index_patterns:
  # Page size when listing index pattern saved objects (1-10000)
  per_page: 10000

  # Allow patterns that match no index yet
  allow_no_index: false

# Overrides for UI settings defaults
ui_settings:
  overrides:
    metaFields: ["_source", "_id", "_type", "_index", "_score"]

# Usage telemetry
usage_collection:
  enabled: true

# Indices served by the in-memory search backend
elasticsearch:
  indices:
    logs-2024.01.01:
      "@timestamp": date
      message: text
      host.name: keyword
      bytes: long
    metrics-system:
      "@timestamp": date
      system.cpu.pct: float
"#;

/// Paths used during project initialization
#[derive(Debug, Clone)]
pub struct SetupPaths {
    pub config_dir: PathBuf,
    pub config_file: PathBuf,
}

impl SetupPaths {
    /// Setup paths for the current directory
    pub fn new() -> Result<Self> {
        let current_dir = std::env::current_dir().context("Failed to get current directory")?;
        Ok(Self::in_dir(current_dir))
    }

    /// Setup paths rooted at `root`
    pub fn in_dir(root: impl Into<PathBuf>) -> Self {
        let config_dir = root.into().join(CONFIG_DIR);
        Self {
            config_file: config_dir.join("config.yaml"),
            config_dir,
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.config_file.exists()
    }
}

/// Create the configuration directory
pub fn create_config_dir(paths: &SetupPaths) -> Result<()> {
    fs::create_dir_all(&paths.config_dir).context("Failed to create config directory")
}

/// Write the default configuration file; returns false when one exists and `force` is unset
pub fn create_config_file(paths: &SetupPaths, force: bool) -> Result<bool> {
    if paths.config_file.exists() && !force {
        return Ok(false);
    }

    fs::write(&paths.config_file, DEFAULT_CONFIG_TEMPLATE).context("Failed to write config file")?;
    Ok(true)
}

/// In-memory host platform with the index patterns capability registered
pub struct Platform {
    pub http: HttpService,
    pub capabilities: Arc<CapabilitiesService>,
    pub expressions: Arc<ExpressionsService>,
    pub usage_collection: Option<Arc<UsageCollectionService>>,
    pub saved_object_types: Arc<SavedObjectTypeRegistry>,
    pub store: Arc<InMemorySavedObjectsStore>,
    pub elasticsearch: Arc<InMemoryElasticsearch>,
    pub core: CoreStart,
    pub start_services: IndexPatternsStartServices,
    provider: IndexPatternsServiceProvider,
    logger: Arc<dyn Logger>,
    field_formats: Arc<dyn FieldFormatsStart>,
}

impl std::fmt::Debug for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Platform")
            .field("http", &self.http)
            .field("started", &self.start_services.is_resolved())
            .finish_non_exhaustive()
    }
}

/// Builder for [`Platform`]; unset collaborators fall back to the in-memory ones
pub struct PlatformBuilder {
    config: Config,
    logger: Option<Arc<dyn Logger>>,
    ui_settings: Option<Arc<dyn UiSettingsServiceStart>>,
    field_formats: Option<Arc<dyn FieldFormatsStart>>,
}

impl PlatformBuilder {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            logger: None,
            ui_settings: None,
            field_formats: None,
        }
    }

    #[must_use]
    pub fn logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = Some(logger);
        self
    }

    #[must_use]
    pub fn ui_settings(mut self, ui_settings: Arc<dyn UiSettingsServiceStart>) -> Self {
        self.ui_settings = Some(ui_settings);
        self
    }

    #[must_use]
    pub fn field_formats(mut self, field_formats: Arc<dyn FieldFormatsStart>) -> Self {
        self.field_formats = Some(field_formats);
        self
    }

    /// Run the setup phase only; routes answer but start services stay pending
    pub fn setup(self) -> Result<Platform> {
        let Self {
            config,
            logger,
            ui_settings,
            field_formats,
        } = self;
        let logger = logger.unwrap_or_else(|| Arc::new(TracingLogger::default()));

        let saved_object_types = Arc::new(SavedObjectTypeRegistry::new());
        saved_object_types
            .register_type(config_saved_object_type())
            .context("Failed to register the config saved object type")?;
        let store = Arc::new(InMemorySavedObjectsStore::new(Arc::clone(&saved_object_types)));
        let elasticsearch = Arc::new(InMemoryElasticsearch::new(config.elasticsearch.indices.clone()));

        let ui_settings = ui_settings.unwrap_or_else(|| {
            Arc::new(InMemoryUiSettingsService::new(&config.ui_settings.overrides))
        });
        let core = CoreStart {
            saved_objects: Arc::new(InMemorySavedObjectsService::new(Arc::clone(&store))),
            elasticsearch: Arc::new(InMemoryElasticsearchService::new(Arc::clone(&elasticsearch))),
            ui_settings,
        };

        let http = HttpService::new();
        let capabilities = Arc::new(CapabilitiesService::new());
        let expressions = Arc::new(ExpressionsService::new());
        let usage_collection = config
            .usage_collection
            .enabled
            .then(|| Arc::new(UsageCollectionService::new()));

        let start_services = IndexPatternsStartServices::new();
        let core_setup = CoreSetup::new(
            Arc::clone(&saved_object_types),
            Arc::clone(&capabilities),
            http.clone(),
            start_services.clone(),
        );

        let provider = IndexPatternsServiceProvider::new(config.index_patterns.clone());
        provider
            .setup(
                &core_setup,
                IndexPatternsServiceSetupDeps {
                    expressions: Arc::clone(&expressions),
                    logger: Arc::clone(&logger),
                    usage_collection: usage_collection.clone(),
                },
            )
            .context("Index patterns setup failed")?;

        Ok(Platform {
            http,
            capabilities,
            expressions,
            usage_collection,
            saved_object_types,
            store,
            elasticsearch,
            core,
            start_services,
            provider,
            logger,
            field_formats: field_formats.unwrap_or_else(|| Arc::new(FieldFormatsService::default())),
        })
    }

    /// Run setup and start
    pub fn build(self) -> Result<Platform> {
        let platform = self.setup()?;
        platform.start()?;
        Ok(platform)
    }
}

impl Platform {
    /// Bootstrap with the default in-memory collaborators
    pub fn bootstrap(config: &Config) -> Result<Self> {
        PlatformBuilder::new(config.clone()).build()
    }

    /// Run the start phase and publish start services
    pub fn start(&self) -> Result<IndexPatternsServiceStart> {
        let deps = IndexPatternsServiceStartDeps {
            field_formats: Arc::clone(&self.field_formats),
            logger: Arc::clone(&self.logger),
        };
        let contract = self.provider.start(&self.core, &deps);
        self.start_services
            .resolve(self.core.clone(), deps, contract.clone())
            .context("Platform already started")?;
        info!("platform started");
        Ok(contract)
    }

    pub fn logger(&self) -> Arc<dyn Logger> {
        Arc::clone(&self.logger)
    }

    /// Context for usage collection with internal clients
    pub fn collector_fetch_context(&self) -> CollectorFetchContext {
        CollectorFetchContext {
            saved_objects_client: self.core.saved_objects.create_internal_repository(),
            elasticsearch_client: self.core.elasticsearch.internal_client(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::config::ConfigLoader;

    #[test]
    fn test_default_template_is_valid_config() {
        let config: Config = serde_yaml::from_str(DEFAULT_CONFIG_TEMPLATE).unwrap();
        ConfigLoader::validate(&config).unwrap();
        assert_eq!(config.elasticsearch.indices.len(), 2);
    }

    #[test]
    fn test_create_config_file_respects_force() {
        let dir = tempfile::tempdir().unwrap();
        let paths = SetupPaths::in_dir(dir.path());
        assert!(!paths.is_initialized());

        create_config_dir(&paths).unwrap();
        assert!(create_config_file(&paths, false).unwrap());
        assert!(paths.is_initialized());

        fs::write(&paths.config_file, "logging: {}\n").unwrap();
        assert!(!create_config_file(&paths, false).unwrap());
        assert_eq!(fs::read_to_string(&paths.config_file).unwrap(), "logging: {}\n");

        assert!(create_config_file(&paths, true).unwrap());
        assert_eq!(fs::read_to_string(&paths.config_file).unwrap(), DEFAULT_CONFIG_TEMPLATE);
    }

    #[tokio::test]
    async fn test_bootstrap_registers_and_starts() {
        let platform = Platform::bootstrap(&Config::default()).unwrap();
        assert!(platform.start_services.is_resolved());
        assert!(platform.saved_object_types.is_registered("index-pattern"));
        assert!(platform.http.context_names().contains(&"indexPatterns".to_string()));
        assert!(platform.start().is_err(), "second start must fail");
    }

    #[test]
    fn test_usage_collection_disabled() {
        let mut config = Config::default();
        config.usage_collection.enabled = false;
        let platform = PlatformBuilder::new(config).setup().unwrap();
        assert!(platform.usage_collection.is_none());
        assert!(!platform.start_services.is_resolved());
    }
}
