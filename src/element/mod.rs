//! Element model
//!
//! Arena-backed element trees compared by the alignment, diff, and filter
//! engines. A snapshot (`State`) holds one tree per top-level subject plus
//! optional metadata and a screenshot.

mod attributes;
mod state;
mod tree;

pub use attributes::{Attributes, IdentifyingAttributes, CLASS_KEY, ID_KEY, PATH_KEY, TYPE_KEY};
pub use state::{ImageType, Screenshot, State, StateMetadata};
pub use tree::{ElementTree, ElementTreeBuilder, NodeId};
