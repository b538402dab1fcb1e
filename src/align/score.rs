//! Similarity scoring
//!
//! A symmetric similarity in [0, 1] over identifying attribute sets, with
//! 1.0 reserved for structural identity, plus the transient `Match` value
//! used to rank candidates during alignment.

use crate::element::{IdentifyingAttributes, NodeId};

/// A candidate pairing of one element with a similarity score.
///
/// Only used transiently while aligning; ordering is by descending
/// similarity, established with a stable sort so that equal scores keep
/// their evaluation order (first seen wins).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Match {
    pub similarity: f64,
    pub element: NodeId,
}

impl Match {
    pub fn of(similarity: f64, element: NodeId) -> Self {
        Self {
            similarity,
            element,
        }
    }

    /// An exact, identity-level match.
    pub fn exact(element: NodeId) -> Self {
        Self::of(1.0, element)
    }
}

/// Sorts candidates by descending similarity, keeping evaluation order for
/// equal scores.
pub fn sort_candidates(candidates: &mut Vec<Match>) {
    // Similarities are never NaN, so the partial order is total here.
    candidates.sort_by(|a, b| {
        b.similarity
            .partial_cmp(&a.similarity)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}

/// Symmetric similarity of two identifying attribute sets.
///
/// Structural equality short-circuits to 1.0 before any scan. Otherwise
/// every key in the union contributes equally: equal values score 1, a key
/// present on only one side scores 0, and differing string values earn
/// partial credit for their common prefix and suffix. The result is
/// strictly below 1.0 whenever the sets differ.
pub fn similarity(expected: &IdentifyingAttributes, actual: &IdentifyingAttributes) -> f64 {
    if expected == actual {
        return 1.0;
    }

    let keys = expected.key_union(actual);
    if keys.is_empty() {
        // Both empty would have compared equal above.
        return 0.0;
    }

    let mut sum = 0.0;
    for key in &keys {
        sum += match (expected.get(key), actual.get(key)) {
            (Some(a), Some(b)) if a == b => 1.0,
            (Some(a), Some(b)) => value_similarity(a, b),
            _ => 0.0,
        };
    }
    sum / keys.len() as f64
}

/// Partial credit for two differing values: shared prefix plus shared
/// suffix, relative to the longer value. Always below 1.0 for unequal
/// input.
fn value_similarity(a: &str, b: &str) -> f64 {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let max_len = a_chars.len().max(b_chars.len());
    if max_len == 0 {
        return 0.0;
    }
    let min_len = a_chars.len().min(b_chars.len());

    let prefix = a_chars
        .iter()
        .zip(b_chars.iter())
        .take_while(|(x, y)| x == y)
        .count();
    let suffix = a_chars
        .iter()
        .rev()
        .zip(b_chars.iter().rev())
        .take_while(|(x, y)| x == y)
        .count();

    // Prefix and suffix may overlap when one value contains the other.
    let shared = (prefix + suffix).min(min_len);
    shared as f64 / max_len as f64
}
