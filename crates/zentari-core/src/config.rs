//! Configuration loading and typed config structures.
//!
//! The canonical configuration lives in `zentari-config.yaml` at the
//! deployment root. This module defines strongly-typed structs that
//! mirror the YAML structure and provides a loader that reads, parses,
//! and validates the file. Every section defaults to the production
//! values, so an empty file (or no file at all) yields a fully working
//! configuration.

use std::path::Path;

use serde::Deserialize;

use zentari_game::config::{EconomyConfig, EconomyConfigError};

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// The economy tables failed shape validation.
    #[error("invalid economy configuration: {source}")]
    Economy {
        /// The underlying validation error.
        #[from]
        source: EconomyConfigError,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Instance-level settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct InstanceConfig {
    /// Human-readable deployment name, used in log output.
    #[serde(default = "default_instance_name")]
    pub name: String,
}

impl Default for InstanceConfig {
    fn default() -> Self {
        Self {
            name: default_instance_name(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (`trace`, `debug`, `info`, `warn`, `error`).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Top-level application configuration.
///
/// Mirrors the structure of `zentari-config.yaml`. All fields have
/// production defaults.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AppConfig {
    /// Instance-level settings (name).
    #[serde(default)]
    pub instance: InstanceConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// The economy lookup tables.
    #[serde(default)]
    pub economy: EconomyConfig,
}

/// Default configuration file name, resolved against the working
/// directory.
pub const DEFAULT_CONFIG_PATH: &str = "zentari-config.yaml";

impl AppConfig {
    /// Load configuration from the path named by the `ZENTARI_CONFIG`
    /// environment variable, falling back to [`DEFAULT_CONFIG_PATH`].
    ///
    /// A missing file yields the production defaults; a present but
    /// invalid file is an error.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] or [`ConfigError::Economy`] when the
    /// file exists but fails to parse or validate, and
    /// [`ConfigError::Io`] when it exists but cannot be read.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var("ZENTARI_CONFIG")
            .unwrap_or_else(|_| String::from(DEFAULT_CONFIG_PATH));
        let path = Path::new(&path);
        if path.exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a YAML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::Economy`] if the economy tables fail validation.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] or [`ConfigError::Economy`].
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yml::from_str(yaml)?;
        config.economy.validate()?;
        Ok(config)
    }
}

fn default_instance_name() -> String {
    String::from("zentari")
}

fn default_log_level() -> String {
    String::from("info")
}
