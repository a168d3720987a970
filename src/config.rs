//! Service configuration

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::info;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("parse error: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// Semantically invalid configuration
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Writer-lock acquisition timeout before a deadlock is reported
    pub deadlock_timeout_ms: u64,
    /// Hard cap applied to every page size
    pub max_page_size: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        ServiceConfig {
            deadlock_timeout_ms: 10_000,
            max_page_size: 10_000,
        }
    }
}

impl ServiceConfig {
    /// Load from a YAML file and validate
    pub fn from_yaml_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let config: ServiceConfig = serde_yaml::from_str(&raw)?;
        config.validate()?;
        info!("loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> ConfigResult<()> {
        if self.deadlock_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "deadlock_timeout_ms must be greater than zero".to_string(),
            ));
        }
        if self.max_page_size == 0 {
            return Err(ConfigError::Invalid(
                "max_page_size must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
