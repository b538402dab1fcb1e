//! Snapshot state
//!
//! A `State` is one complete captured snapshot: a set of root element trees
//! (one per independent top-level subject), optional metadata, and an
//! optional screenshot.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::tree::ElementTree;

/// Image encoding of a screenshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageType {
    Png,
    Jpeg,
}

/// Raw screenshot carried alongside a snapshot. The core never inspects the
/// pixels; pixel comparison belongs to an external collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Screenshot {
    pub image_type: ImageType,
    pub bytes: Vec<u8>,
}

/// Free-form snapshot metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StateMetadata {
    /// When the snapshot was captured.
    pub captured_at: Option<DateTime<Utc>>,
    /// Arbitrary key-value metadata, deterministic key order.
    pub entries: BTreeMap<String, String>,
}

/// One complete snapshot: root trees plus metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct State {
    pub roots: Vec<ElementTree>,
    #[serde(default)]
    pub metadata: StateMetadata,
    #[serde(default)]
    pub screenshot: Option<Screenshot>,
}

impl State {
    /// Creates a state from its root trees with empty metadata.
    pub fn new(roots: Vec<ElementTree>) -> Self {
        Self {
            roots,
            metadata: StateMetadata::default(),
            screenshot: None,
        }
    }

    /// Number of root trees in this snapshot.
    pub fn root_count(&self) -> usize {
        self.roots.len()
    }

    /// Total number of elements across all root trees.
    pub fn element_count(&self) -> usize {
        self.roots.iter().map(ElementTree::len).sum()
    }
}
