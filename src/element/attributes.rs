//! Attribute containers
//!
//! Elements carry two attribute maps: identifying attributes (used only for
//! matching/similarity) and plain attributes (descriptive state, used for
//! diff content). Both keep their entries in deterministic key order.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifying attribute key for the element type/tag.
pub const TYPE_KEY: &str = "type";
/// Identifying attribute key for the structural path.
pub const PATH_KEY: &str = "path";
/// Identifying attribute key for the element class.
pub const CLASS_KEY: &str = "class";
/// Identifying attribute key for a stable element id.
pub const ID_KEY: &str = "id";

/// Prefix marking synthetic pseudo containers (e.g. `::before`).
const PSEUDO_TYPE_PREFIX: &str = "::";

/// Descriptive attributes of an element, not used for matching.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Attributes {
    entries: BTreeMap<String, String>,
}

impl Attributes {
    /// Creates an empty attribute map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the value for a key, if present.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Inserts or replaces a value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// Iterates entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if no entries are present.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Identity-relevant attributes of an element, used exclusively by the
/// alignment engine for similarity and equality.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IdentifyingAttributes {
    entries: BTreeMap<String, String>,
}

impl IdentifyingAttributes {
    /// Creates an empty identifying attribute map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates identifying attributes with the two standard keys.
    pub fn of(element_type: impl Into<String>, path: impl Into<String>) -> Self {
        Self::new().with(TYPE_KEY, element_type).with(PATH_KEY, path)
    }

    /// Returns the value for a key, if present.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Inserts or replaces a value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// The element type/tag value, if present.
    pub fn element_type(&self) -> Option<&str> {
        self.get(TYPE_KEY)
    }

    /// The structural path value, if present.
    pub fn path(&self) -> Option<&str> {
        self.get(PATH_KEY)
    }

    /// True for synthetic pseudo containers, which carry no identity of
    /// their own and are aligned by proxy.
    pub fn is_pseudo(&self) -> bool {
        self.element_type()
            .map(|t| t.starts_with(PSEUDO_TYPE_PREFIX))
            .unwrap_or(false)
    }

    /// Iterates entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Union of this key set with another, in key order.
    pub fn key_union<'a>(&'a self, other: &'a IdentifyingAttributes) -> Vec<&'a str> {
        let mut keys: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        for key in other.entries.keys() {
            if !self.entries.contains_key(key) {
                keys.push(key.as_str());
            }
        }
        keys.sort_unstable();
        keys
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if no entries are present.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Display for IdentifyingAttributes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (key, value) in self.iter() {
            if !first {
                write!(f, " ")?;
            }
            write!(f, "{}={}", key, value)?;
            first = false;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifying_equality_is_structural() {
        let a = IdentifyingAttributes::of("button", "window[1]/button[1]");
        let b = IdentifyingAttributes::of("button", "window[1]/button[1]");
        assert_eq!(a, b);

        let c = IdentifyingAttributes::of("button", "window[1]/button[2]");
        assert_ne!(a, c);
    }

    #[test]
    fn test_pseudo_detection() {
        let pseudo = IdentifyingAttributes::of("::before", "window[1]/::before");
        assert!(pseudo.is_pseudo());

        let real = IdentifyingAttributes::of("button", "window[1]/button[1]");
        assert!(!real.is_pseudo());
    }

    #[test]
    fn test_key_union_is_sorted_and_deduplicated() {
        let a = IdentifyingAttributes::of("button", "p").with("id", "save");
        let b = IdentifyingAttributes::of("button", "p").with("class", "primary");
        assert_eq!(a.key_union(&b), vec!["class", "id", "path", "type"]);
    }

    #[test]
    fn test_display_renders_in_key_order() {
        let a = IdentifyingAttributes::of("button", "w[1]/b[1]");
        assert_eq!(a.to_string(), "path=w[1]/b[1] type=button");
    }
}
