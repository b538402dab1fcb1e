//! Persistence boundary
//!
//! Save/load semantics for snapshots and reports. The engine is agnostic
//! to the storage layout; this module provides the JSON file form used by
//! the CLI. Snapshot files carry a format version checked on load.

mod errors;

pub use errors::{PersistError, PersistResult};

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::diff::StateDifference;
use crate::element::State;

/// Current snapshot file format version.
pub const STATE_FORMAT_VERSION: u32 = 1;

#[derive(Serialize, Deserialize)]
struct StateEnvelope {
    format_version: u32,
    state: State,
}

/// Writes a snapshot to a JSON file.
pub fn save_state(path: &Path, state: &State) -> PersistResult<()> {
    let envelope = StateEnvelope {
        format_version: STATE_FORMAT_VERSION,
        state: state.clone(),
    };
    let content = serde_json::to_string_pretty(&envelope)
        .map_err(|e| PersistError::serialize(path, e))?;
    fs::write(path, content).map_err(|e| PersistError::io(path, e))?;
    Ok(())
}

/// Reads a snapshot from a JSON file, rejecting unknown format versions.
pub fn load_state(path: &Path) -> PersistResult<State> {
    let content = fs::read_to_string(path).map_err(|e| PersistError::io(path, e))?;
    let envelope: StateEnvelope =
        serde_json::from_str(&content).map_err(|e| PersistError::parse(path, e))?;
    if envelope.format_version != STATE_FORMAT_VERSION {
        return Err(PersistError::IncompatibleVersion {
            path: path.display().to_string(),
            found: envelope.format_version,
            supported: STATE_FORMAT_VERSION,
        });
    }
    Ok(envelope.state)
}

/// Writes a computed difference report to a JSON file.
pub fn save_report(path: &Path, report: &StateDifference) -> PersistResult<()> {
    let content =
        serde_json::to_string_pretty(report).map_err(|e| PersistError::serialize(path, e))?;
    fs::write(path, content).map_err(|e| PersistError::io(path, e))?;
    Ok(())
}
