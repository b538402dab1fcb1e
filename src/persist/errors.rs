//! Persistence errors

use std::path::Path;

use thiserror::Error;

/// Result type for persistence operations
pub type PersistResult<T> = Result<T, PersistError>;

/// Errors raised while saving or loading snapshots and reports
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("I/O error on '{path}': {message}")]
    Io { path: String, message: String },

    #[error("Malformed snapshot file '{path}': {message}")]
    Parse { path: String, message: String },

    #[error("Could not serialize to '{path}': {message}")]
    Serialize { path: String, message: String },

    #[error("Snapshot file '{path}' has format version {found}, supported is {supported}")]
    IncompatibleVersion {
        path: String,
        found: u32,
        supported: u32,
    },
}

impl PersistError {
    pub fn io(path: &Path, error: std::io::Error) -> Self {
        Self::Io {
            path: path.display().to_string(),
            message: error.to_string(),
        }
    }

    pub fn parse(path: &Path, error: serde_json::Error) -> Self {
        Self::Parse {
            path: path.display().to_string(),
            message: error.to_string(),
        }
    }

    pub fn serialize(path: &Path, error: serde_json::Error) -> Self {
        Self::Serialize {
            path: path.display().to_string(),
            message: error.to_string(),
        }
    }
}
