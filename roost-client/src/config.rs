//! Configuration loading for Roost.
//!
//! Configuration is loaded from a TOML file (default: `roost.toml`). Every
//! section and field is optional.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RoostConfig {
    /// Page sizes.
    #[serde(default)]
    pub paging: PagingConfig,
    /// Update stream settings.
    #[serde(default)]
    pub updates: UpdatesConfig,
    /// Log filter settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Page sizes.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PagingConfig {
    /// Messages per history page (default: 20).
    #[serde(default = "default_messages_page_size")]
    pub messages_page_size: usize,
    /// Results per search page (default: 100).
    #[serde(default = "default_search_page_size")]
    pub search_page_size: usize,
}

/// Update stream settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UpdatesConfig {
    /// Buffered events before producers wait (default: 100).
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

/// Log filter settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LoggingConfig {
    /// Filter used when `RUST_LOG` is unset (default: "info").
    #[serde(default = "default_log_level")]
    pub level: String,
}

// Default value functions
fn default_messages_page_size() -> usize {
    roost_core::MESSAGES_PAGE_SIZE
}

fn default_search_page_size() -> usize {
    roost_core::SEARCH_PAGE_SIZE
}

fn default_channel_capacity() -> usize {
    crate::updates::DEFAULT_CHANNEL_CAPACITY
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for PagingConfig {
    fn default() -> Self {
        Self {
            messages_page_size: default_messages_page_size(),
            search_page_size: default_search_page_size(),
        }
    }
}

impl Default for UpdatesConfig {
    fn default() -> Self {
        Self {
            channel_capacity: default_channel_capacity(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl RoostConfig {
    /// Load and validate configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values no component can run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.paging.messages_page_size == 0 {
            return Err(ConfigError::Invalid(
                "paging.messages_page_size must be at least 1".into(),
            ));
        }
        if self.paging.search_page_size == 0 {
            return Err(ConfigError::Invalid(
                "paging.search_page_size must be at least 1".into(),
            ));
        }
        if self.updates.channel_capacity == 0 {
            return Err(ConfigError::Invalid(
                "updates.channel_capacity must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("failed to read config file {path}: {source}")]
    ReadError {
        /// Path to the configuration file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// Failed to parse configuration file.
    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        /// Path to the configuration file.
        path: PathBuf,
        /// Underlying TOML parse error.
        source: toml::de::Error,
    },
    /// A value is out of range.
    #[error("invalid config: {0}")]
    Invalid(String),
}
