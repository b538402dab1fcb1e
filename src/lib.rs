//! statecheck - A strict, deterministic structural regression-testing engine
//!
//! Captures hierarchical element-tree snapshots, aligns an expected
//! (golden) tree with an actual one even across insertions, deletions, and
//! attribute drift, computes a structured difference report, and prunes it
//! with a human-editable ignore-rule set.

pub mod align;
pub mod cli;
pub mod config;
pub mod diff;
pub mod element;
pub mod filter;
pub mod observability;
pub mod persist;
