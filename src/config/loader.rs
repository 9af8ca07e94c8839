//! Configuration Loader
//!
//! Environment-aware configuration loading. Handles YAML file discovery and
//! environment detection; a missing config file yields the built-in defaults.

use super::TaskLedgerConfig;
use crate::error::{Result, TaskLedgerError};
use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Loaded configuration plus the environment it was resolved for.
#[derive(Debug)]
pub struct ConfigManager {
    config: TaskLedgerConfig,
    environment: String,
}

impl ConfigManager {
    /// Load configuration with environment auto-detection.
    ///
    /// The config file path comes from `TASKLEDGER_CONFIG_PATH`, defaulting to
    /// `config/taskledger.yaml` relative to the working directory. A missing
    /// file is not an error — defaults apply.
    pub fn load() -> Result<Arc<ConfigManager>> {
        let environment = Self::detect_environment();
        let path = env::var("TASKLEDGER_CONFIG_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("config/taskledger.yaml"));
        Self::load_from_path(&path, &environment)
    }

    /// Load configuration from an explicit path with an explicit environment.
    /// Useful for testing without modifying global environment variables.
    pub fn load_from_path(path: &Path, environment: &str) -> Result<Arc<ConfigManager>> {
        let config = if path.exists() {
            let raw = std::fs::read_to_string(path).map_err(|e| {
                TaskLedgerError::Configuration(format!(
                    "failed to read config file {}: {e}",
                    path.display()
                ))
            })?;
            serde_yaml::from_str(&raw).map_err(|e| {
                TaskLedgerError::Configuration(format!(
                    "failed to parse config file {}: {e}",
                    path.display()
                ))
            })?
        } else {
            debug!(
                path = %path.display(),
                "No configuration file found - using defaults"
            );
            TaskLedgerConfig::default()
        };

        debug!(
            environment = %environment,
            active_task_timeout_seconds = config.task.active_task_timeout_seconds,
            pool = config.database.pool,
            "Configuration loaded"
        );

        Ok(Arc::new(ConfigManager {
            config,
            environment: environment.to_string(),
        }))
    }

    /// Get the loaded configuration
    pub fn config(&self) -> &TaskLedgerConfig {
        &self.config
    }

    /// Get the environment this configuration was loaded for
    pub fn environment(&self) -> &str {
        &self.environment
    }

    /// Detect environment from `TASKLEDGER_ENV` / `APP_ENV`, defaulting to
    /// development.
    pub fn detect_environment() -> String {
        env::var("TASKLEDGER_ENV")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string())
    }
}
