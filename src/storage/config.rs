//! JSON Configuration Loading
//!
//! Reads the client configuration file and layers command line overrides on
//! top of it.

use std::fs;
use std::path::{Path, PathBuf};

use crate::models::settings::{ClientConfig, ConfigOverrides};
use crate::utils::error::{AppError, AppResult};
use crate::utils::paths::default_config_path;

/// Where the configuration came from
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigSource {
    File(PathBuf),
    Defaults,
}

/// Configuration service for client settings
#[derive(Debug)]
pub struct ConfigService {
    source: ConfigSource,
    config: ClientConfig,
}

impl ConfigService {
    /// Load configuration.
    ///
    /// An explicit `path` must exist. Without one, the default location is
    /// used if present, otherwise built-in defaults.
    pub fn load(path: Option<&Path>) -> AppResult<Self> {
        let (source, config) = match path {
            Some(path) => (
                ConfigSource::File(path.to_path_buf()),
                Self::load_from_file(path)?,
            ),
            None => match default_config_path() {
                Ok(default_path) if default_path.exists() => {
                    let config = Self::load_from_file(&default_path)?;
                    (ConfigSource::File(default_path), config)
                }
                _ => (ConfigSource::Defaults, ClientConfig::default()),
            },
        };

        Ok(Self { source, config })
    }

    /// Load configuration from a file
    fn load_from_file(path: &Path) -> AppResult<ClientConfig> {
        let content = fs::read_to_string(path).map_err(|e| {
            AppError::config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let config: ClientConfig = serde_json::from_str(&content)?;
        config.validate().map_err(AppError::config)?;
        Ok(config)
    }

    /// Apply command line overrides and re-validate
    pub fn apply_overrides(&mut self, overrides: ConfigOverrides) -> AppResult<()> {
        let mut updated = self.config.clone();
        updated.apply_update(overrides);
        updated.validate().map_err(AppError::config)?;
        self.config = updated;
        Ok(())
    }

    pub fn source(&self) -> &ConfigSource {
        &self.source
    }

    /// Get the current configuration
    pub fn get_config(&self) -> &ClientConfig {
        &self.config
    }

    /// Consume the service, returning the configuration
    pub fn into_config(self) -> ClientConfig {
        self.config
    }
}
