//! Alignment engine
//!
//! Computes a best-effort correspondence between an expected and an actual
//! element tree: leaves are matched by identifying-attribute similarity with
//! eviction of weaker claims, ancestors are aligned by propagation, and
//! pseudo containers are aligned by proxy through their nearest real
//! neighbor.

mod engine;
mod score;

pub use engine::Alignment;
pub use score::{similarity, Match};
