//! CLI errors

use thiserror::Error;

use crate::config::ConfigError;
use crate::filter::FilterError;
use crate::persist::PersistError;

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;

/// Errors surfaced to the command line
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Persist(#[from] PersistError),

    #[error(transparent)]
    Filter(#[from] FilterError),

    /// Differences survived filtering; the comparison fails.
    #[error("{0} difference(s) remain after filtering")]
    DifferencesFound(usize),
}
