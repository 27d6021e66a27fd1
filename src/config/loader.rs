//! Configuration Loader
//!
//! Environment-aware configuration loading. Handles file discovery,
//! environment detection and merging of the configuration layers.

use super::error::{ConfigResult, ConfigurationError};
use super::TaskerConfig;
use config::{Config, Environment, File, FileFormat};
use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Base file name of configuration files, without extension
const CONFIG_FILE_STEM: &str = "text-tasker";
/// Prefix of environment variable overrides, e.g. `TEXT_TASKER__WORKER__CONCURRENCY`
const ENV_PREFIX: &str = "TEXT_TASKER";
const ENV_SEPARATOR: &str = "__";

/// Validated configuration plus the environment it was resolved for
///
/// Constructed once per process and passed down explicitly.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config: TaskerConfig,
    environment: String,
    config_directory: PathBuf,
}

impl ConfigManager {
    /// Load configuration with environment auto-detection
    pub fn load() -> ConfigResult<Arc<ConfigManager>> {
        Self::load_from_directory(None)
    }

    /// Load configuration from a specific directory
    pub fn load_from_directory(config_dir: Option<PathBuf>) -> ConfigResult<Arc<ConfigManager>> {
        let environment = Self::detect_environment();
        Self::load_from_directory_with_env(config_dir, &environment)
    }

    /// Load configuration from a specific directory with explicit environment
    /// This is useful for testing without modifying global environment variables
    pub fn load_from_directory_with_env(
        config_dir: Option<PathBuf>,
        environment: &str,
    ) -> ConfigResult<Arc<ConfigManager>> {
        let config_directory = config_dir.unwrap_or_else(Self::default_config_directory);

        debug!(
            "Loading configuration for environment '{}' from directory: {}",
            environment,
            config_directory.display()
        );

        let base = config_directory.join(format!("{CONFIG_FILE_STEM}.toml"));
        let overlay = config_directory.join(format!("{CONFIG_FILE_STEM}.{environment}.toml"));

        let builder = Config::builder()
            .add_source(File::from(base).format(FileFormat::Toml).required(false))
            .add_source(File::from(overlay).format(FileFormat::Toml).required(false));

        let config = Self::build(builder, environment)?;
        Ok(Arc::new(Self::finish(config, environment, config_directory)))
    }

    /// Load configuration from one explicit file
    ///
    /// The file must exist. Environment variable overrides still apply.
    pub fn load_from_file(path: &Path) -> ConfigResult<Arc<ConfigManager>> {
        if !path.is_file() {
            return Err(ConfigurationError::file_read_error(
                path.display().to_string(),
                "file does not exist",
            ));
        }

        let environment = Self::detect_environment();
        let builder = Config::builder().add_source(File::from(path).format(FileFormat::Toml));
        let config = Self::build(builder, &environment)?;

        let config_directory = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(Self::default_config_directory);
        Ok(Arc::new(Self::finish(config, &environment, config_directory)))
    }

    /// Wrap an already-built configuration, validating it first
    pub fn from_config(config: TaskerConfig) -> ConfigResult<Arc<ConfigManager>> {
        config.validate()?;
        let environment = config.environment.clone();
        Ok(Arc::new(ConfigManager {
            config,
            environment,
            config_directory: Self::default_config_directory(),
        }))
    }

    fn build(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
        environment: &str,
    ) -> ConfigResult<TaskerConfig> {
        let merged = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator(ENV_SEPARATOR)
                    .separator(ENV_SEPARATOR)
                    .try_parsing(true),
            )
            .set_override("environment", environment)?
            .build()?;

        let config: TaskerConfig = merged.try_deserialize()?;
        config
            .validate()
            .map_err(|e| ConfigurationError::environment_config_error(environment, e))?;
        Ok(config)
    }

    fn finish(config: TaskerConfig, environment: &str, config_directory: PathBuf) -> ConfigManager {
        info!(
            environment = environment,
            concurrency = config.worker.concurrency,
            steps = config.worker.steps.len(),
            backend = ?config.store.backend,
            "Configuration loaded successfully"
        );

        ConfigManager {
            config,
            environment: environment.to_string(),
            config_directory,
        }
    }

    /// Get the loaded configuration
    pub fn config(&self) -> &TaskerConfig {
        &self.config
    }

    pub fn environment(&self) -> &str {
        &self.environment
    }

    pub fn config_directory(&self) -> &Path {
        &self.config_directory
    }

    /// Detect the current environment
    ///
    /// TEXT_TASKER_ENV || APP_ENV || 'development'
    pub fn detect_environment() -> String {
        env::var("TEXT_TASKER_ENV")
            .or_else(|_| env::var("APP_ENV"))
            .ok()
            .map(|e| e.trim().to_lowercase())
            .filter(|e| !e.is_empty())
            .unwrap_or_else(|| "development".to_string())
    }

    /// `TEXT_TASKER_CONFIG_DIR` or `./config`
    fn default_config_directory() -> PathBuf {
        env::var("TEXT_TASKER_CONFIG_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("config"))
    }
}
