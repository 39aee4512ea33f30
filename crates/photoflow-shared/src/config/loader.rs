//! Layered configuration loading.
//!
//! Sources in precedence order (later wins):
//! 1. Built-in defaults (`PhotoflowConfig::default()`)
//! 2. TOML file: explicit path, else `PHOTOFLOW_CONFIG_PATH` when set
//! 3. Environment variables `PHOTOFLOW__<SECTION>__<KEY>`

use std::path::{Path, PathBuf};

use config::{Config, Environment, File, FileFormat};
use tracing::debug;
use validator::Validate;

use super::PhotoflowConfig;
use crate::errors::PhotoflowResult;

/// Environment variable naming the TOML config file
pub const CONFIG_PATH_ENV: &str = "PHOTOFLOW_CONFIG_PATH";
const ENV_PREFIX: &str = "PHOTOFLOW";
const ENV_SEPARATOR: &str = "__";

/// Loads and validates [`PhotoflowConfig`]
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config: PhotoflowConfig,
    source_path: Option<PathBuf>,
}

impl ConfigManager {
    /// Load configuration using `PHOTOFLOW_CONFIG_PATH` when set
    pub fn load() -> PhotoflowResult<Self> {
        let _ = dotenvy::dotenv();
        let path = std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from);
        Self::load_from(path.as_deref())
    }

    /// Load configuration from an explicit file, layered over defaults and
    /// under environment overrides
    pub fn load_from(path: Option<&Path>) -> PhotoflowResult<Self> {
        let mut builder =
            Config::builder().add_source(Config::try_from(&PhotoflowConfig::default())?);

        if let Some(path) = path {
            builder = builder.add_source(File::from(path).format(FileFormat::Toml).required(true));
        }

        let config: PhotoflowConfig = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator(ENV_SEPARATOR)
                    .separator(ENV_SEPARATOR)
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        config.validate()?;

        debug!(
            source = ?path,
            endpoint = %config.remote.endpoint,
            history_path = ?config.store.history_path,
            "Loaded photoflow configuration"
        );

        Ok(Self {
            config,
            source_path: path.map(Path::to_path_buf),
        })
    }

    /// Wrap an already-built configuration after validating it
    pub fn from_config(config: PhotoflowConfig) -> PhotoflowResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            source_path: None,
        })
    }

    pub fn config(&self) -> &PhotoflowConfig {
        &self.config
    }

    pub fn into_config(self) -> PhotoflowConfig {
        self.config
    }

    /// File the configuration was read from, if any
    pub fn source_path(&self) -> Option<&Path> {
        self.source_path.as_deref()
    }
}
