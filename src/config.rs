//! Engine configuration
//!
//! The similarity threshold is an explicit configuration value threaded
//! into the alignment engine's entry point, not a global.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

/// Default similarity below which a best match is discarded.
pub const DEFAULT_ELEMENT_MATCH_THRESHOLD: f64 = 0.85;

/// Result type for configuration loading
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Could not read config file '{path}': {message}")]
    Io { path: String, message: String },

    #[error("Invalid config file '{path}': {message}")]
    Parse { path: String, message: String },

    #[error("element_match_threshold must lie in [0, 1], got {0}")]
    InvalidThreshold(f64),
}

/// Comparison settings, read once and immutable for a run.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CheckConfig {
    /// Minimum similarity for a leaf pairing to count as a match.
    pub element_match_threshold: f64,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            element_match_threshold: DEFAULT_ELEMENT_MATCH_THRESHOLD,
        }
    }
}

impl CheckConfig {
    /// Creates a config with an explicit threshold.
    pub fn with_threshold(element_match_threshold: f64) -> ConfigResult<Self> {
        let config = Self {
            element_match_threshold,
        };
        config.validate()?;
        Ok(config)
    }

    /// Loads and validates a JSON config file.
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let config: Self = serde_json::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Checks field ranges.
    pub fn validate(&self) -> ConfigResult<()> {
        if !(0.0..=1.0).contains(&self.element_match_threshold)
            || !self.element_match_threshold.is_finite()
        {
            return Err(ConfigError::InvalidThreshold(self.element_match_threshold));
        }
        Ok(())
    }
}
