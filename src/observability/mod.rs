//! Observability
//!
//! Deterministic, synchronous structured logging.

mod logger;

pub use logger::{Logger, Severity};
