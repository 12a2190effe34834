//! `colgrid` Configuration Module
//!
//! Provides configuration file support via `colgrid.toml`, environment variables,
//! and runtime overrides.
//!
//! # Priority (highest to lowest)
//!
//! 1. Runtime overrides (builder methods)
//! 2. Environment variables (`COLGRID_<SECTION>__<KEY>`)
//! 3. Configuration file (`colgrid.toml`)
//! 4. Default values

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::transform::Workload;

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to parse configuration.
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    /// Invalid configuration value.
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue {
        /// Configuration key that failed validation.
        key: String,
        /// Validation error message.
        message: String,
    },

    /// The thread pool could not be started.
    #[error("Failed to build thread pool: {0}")]
    ThreadPool(String),
}

/// Execution context configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionConfig {
    /// Number of worker threads (0 = available cores).
    pub parallelism: usize,
    /// Prefix for worker thread names.
    pub thread_name_prefix: String,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            parallelism: 0,
            thread_name_prefix: "colgrid-worker".to_string(),
        }
    }
}

impl ExecutionConfig {
    /// Returns the effective number of worker threads.
    #[must_use]
    pub fn effective_parallelism(&self) -> usize {
        if self.parallelism > 0 {
            return self.parallelism;
        }
        std::thread::available_parallelism()
            .map(std::num::NonZeroUsize::get)
            .unwrap_or(1)
    }

    /// Validates the execution section.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for a parallelism above 4096 or
    /// a blank thread name prefix.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.parallelism > 4096 {
            return Err(ConfigError::InvalidValue {
                key: "execution.parallelism".to_string(),
                message: format!("value {} is out of range [0, 4096]", self.parallelism),
            });
        }

        if self.thread_name_prefix.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "execution.thread_name_prefix".to_string(),
                message: "value must not be empty".to_string(),
            });
        }

        Ok(())
    }
}

/// Transform configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformConfig {
    /// Workload assumed when a transform does not set one.
    pub default_workload: Workload,
    /// Rows copied per bulk `fill` call inside a chunk.
    pub batch_rows: usize,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            default_workload: Workload::Default,
            batch_rows: 512,
        }
    }
}

/// Main `colgrid` configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct EngineConfig {
    /// Execution context configuration.
    pub execution: ExecutionConfig,
    /// Transform configuration.
    pub transform: TransformConfig,
}

impl EngineConfig {
    /// Loads configuration from default sources.
    ///
    /// Priority: defaults < file < environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration parsing fails.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_path("colgrid.toml")
    }

    /// Loads configuration from a specific file path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration parsing fails.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let figment = Figment::new()
            .merge(Serialized::defaults(Self::default()))
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed("COLGRID_").split("__"));

        figment
            .extract()
            .map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Creates a configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if parsing fails.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let figment = Figment::new()
            .merge(Serialized::defaults(Self::default()))
            .merge(Toml::string(toml_str));

        figment
            .extract()
            .map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.execution.validate()?;

        if !(1..=1_048_576).contains(&self.transform.batch_rows) {
            return Err(ConfigError::InvalidValue {
                key: "transform.batch_rows".to_string(),
                message: format!(
                    "value {} is out of range [1, 1048576]",
                    self.transform.batch_rows
                ),
            });
        }

        Ok(())
    }

    /// Serializes the configuration to TOML.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError(e.to_string()))
    }
}
