//! Filter engine errors
//!
//! Rule loading never recovers from malformed configuration by guessing:
//! it fails with the offending line and lets the caller decide fallback
//! policy.

use thiserror::Error;

/// Result type for filter operations
pub type FilterResult<T> = Result<T, FilterError>;

/// Errors raised while loading or saving ignore rules
#[derive(Debug, Error)]
pub enum FilterError {
    /// No loader's recognizer pattern matched the line
    #[error("No filter recognizes the rule line '{line}'")]
    UnrecognizedRule { line: String },

    /// A rule line failed to load, with its position in the rule file
    #[error("Malformed rule at line {line_number}: {source}")]
    RuleLine {
        line_number: usize,
        #[source]
        source: Box<FilterError>,
    },

    /// A matcher expression names a criterion no loader recognizes
    #[error("Couldn't find a filter for the expression '{0}'")]
    NoMatcherFound(String),

    /// A rule contains an invalid regular expression
    #[error("Invalid regex '{pattern}': {source}")]
    InvalidRegex {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// A pixel-diff rule value could not be parsed
    #[error("Invalid pixel-diff value '{0}', expected e.g. '5px' or '2.5%'")]
    InvalidPixelDiff(String),

    /// An imported rule set could not be resolved
    #[error("Could not resolve imported rule set '{name}': {message}")]
    Import { name: String, message: String },

    /// Import chains deeper than the supported limit
    #[error("Import chain too deep while resolving '{name}'")]
    ImportDepthExceeded { name: String },

    /// A rule file could not be read
    #[error("Could not read rule file '{path}': {message}")]
    Io { path: String, message: String },
}
