//! Difference model
//!
//! Typed representation of everything that disagrees between an expected
//! and an actual snapshot, plus the finder that walks an `Alignment` to
//! produce it.

mod finder;
mod types;

pub use finder::{find_root_difference, find_state_difference};
pub use types::{
    sum_identifier, AttributeDifference, ChangeType, ElementDifference,
    IdentifyingAttributesDifference, LeafDifference, RootElementDifference, StateDifference,
};
