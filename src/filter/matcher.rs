//! Element matchers
//!
//! A matcher identifies elements by one identifying-attribute criterion,
//! independent of the suppression semantics the filter layer puts on top.
//! The variant set is closed; each variant owns one textual form.

use std::collections::HashSet;

use crate::element::{IdentifyingAttributes, CLASS_KEY, ID_KEY, TYPE_KEY};

use super::errors::{FilterError, FilterResult};

const TYPE_PREFIX: &str = "type=";
const CLASS_PREFIX: &str = "class=";
const ID_PREFIX: &str = "id=";
/// Canonical line of the always-matching catch-all.
pub const ALL_LINE: &str = "all";

/// Predicate over one element's identifying attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Matcher {
    /// Exact match on the `type` identifying attribute.
    Type(String),
    /// Word-wise match on the `class` identifying attribute: every word of
    /// the matcher value must appear in the element's class value.
    Class(String),
    /// Exact match on the `id` identifying attribute.
    Id(String),
    /// Matches every element.
    Always,
}

impl Matcher {
    /// Tests one element.
    pub fn test(&self, element: &IdentifyingAttributes) -> bool {
        match self {
            Matcher::Type(value) => element.get(TYPE_KEY) == Some(value.as_str()),
            Matcher::Id(value) => element.get(ID_KEY) == Some(value.as_str()),
            Matcher::Class(value) => element.get(CLASS_KEY).is_some_and(|classes| {
                let words: HashSet<&str> = classes.split_whitespace().collect();
                value.split_whitespace().all(|word| words.contains(word))
            }),
            Matcher::Always => true,
        }
    }

    /// Serializes this matcher to its one-line textual form.
    pub fn save(&self) -> String {
        match self {
            Matcher::Type(value) => format!("{}{}", TYPE_PREFIX, value),
            Matcher::Class(value) => format!("{}{}", CLASS_PREFIX, value),
            Matcher::Id(value) => format!("{}{}", ID_PREFIX, value),
            Matcher::Always => ALL_LINE.to_string(),
        }
    }

    /// Parses one matcher expression, failing fast when no variant
    /// recognizes it.
    pub fn load(expression: &str) -> FilterResult<Matcher> {
        if expression == ALL_LINE {
            return Ok(Matcher::Always);
        }
        if let Some(value) = expression.strip_prefix(TYPE_PREFIX) {
            if !value.is_empty() {
                return Ok(Matcher::Type(value.to_string()));
            }
        }
        if let Some(value) = expression.strip_prefix(CLASS_PREFIX) {
            if !value.is_empty() {
                return Ok(Matcher::Class(value.to_string()));
            }
        }
        if let Some(value) = expression.strip_prefix(ID_PREFIX) {
            if !value.is_empty() {
                return Ok(Matcher::Id(value.to_string()));
            }
        }
        Err(FilterError::NoMatcherFound(expression.to_string()))
    }
}
