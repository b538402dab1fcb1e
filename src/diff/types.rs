//! Difference types
//!
//! A `StateDifference` aggregates one outcome per root-element pair; each
//! outcome is a composite `ElementDifference` tree whose terminal records
//! are `LeafDifference` variants. Size contracts are additive up the tree.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::element::IdentifyingAttributes;

/// Whether an element without a counterpart was inserted or deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChangeType {
    Inserted,
    Deleted,
}

/// One disagreement on a single attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeDifference {
    pub key: String,
    pub expected: Option<String>,
    pub actual: Option<String>,
}

impl AttributeDifference {
    pub fn new(
        key: impl Into<String>,
        expected: Option<String>,
        actual: Option<String>,
    ) -> Self {
        Self {
            key: key.into(),
            expected,
            actual,
        }
    }

    /// Stable text identifying this single difference.
    fn identifier_text(&self) -> String {
        format!(
            "{}|{}|{}",
            self.key,
            self.expected.as_deref().unwrap_or(""),
            self.actual.as_deref().unwrap_or("")
        )
    }
}

/// Stable summary hash over a set of attribute differences, used as the
/// difference id of an `IdentifyingAttributesDifference`.
pub fn sum_identifier(differences: &[AttributeDifference]) -> String {
    let mut hasher = crc32fast::Hasher::new();
    for difference in differences {
        hasher.update(difference.identifier_text().as_bytes());
        hasher.update(b"\n");
    }
    format!("{:08x}", hasher.finalize())
}

/// The identifying attributes of two aligned elements disagree.
///
/// Carries the full identifying attribute set of the expected element plus
/// only the differing attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdentifyingAttributesDifference {
    difference_id: String,
    attributes: IdentifyingAttributes,
    attribute_differences: Vec<AttributeDifference>,
}

impl IdentifyingAttributesDifference {
    pub fn new(
        expected_identifying: IdentifyingAttributes,
        attribute_differences: Vec<AttributeDifference>,
    ) -> Self {
        let difference_id = sum_identifier(&attribute_differences);
        Self {
            difference_id,
            attributes: expected_identifying,
            attribute_differences,
        }
    }

    pub fn difference_id(&self) -> &str {
        &self.difference_id
    }

    /// Full identifying attributes of the expected element.
    pub fn attributes(&self) -> &IdentifyingAttributes {
        &self.attributes
    }

    pub fn attribute_differences(&self) -> &[AttributeDifference] {
        &self.attribute_differences
    }

    /// All expected values, joined as `key=value` pairs.
    pub fn expected(&self) -> String {
        self.joined(|d| d.expected.as_deref())
    }

    /// All actual values, joined as `key=value` pairs.
    pub fn actual(&self) -> String {
        self.joined(|d| d.actual.as_deref())
    }

    fn joined<'a>(&'a self, value: impl Fn(&'a AttributeDifference) -> Option<&'a str>) -> String {
        self.attribute_differences
            .iter()
            .map(|d| format!("{}={}", d.key, value(d).unwrap_or("")))
            .collect::<Vec<_>>()
            .join(" ")
            .trim()
            .to_string()
    }
}

impl fmt::Display for IdentifyingAttributesDifference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut expected = String::new();
        let mut actual = String::new();
        for difference in &self.attribute_differences {
            expected.push_str(&format!(
                " expected {}: {}",
                difference.key,
                difference.expected.as_deref().unwrap_or("")
            ));
            actual.push_str(&format!(
                " actual {}: {}",
                difference.key,
                difference.actual.as_deref().unwrap_or("")
            ));
        }
        write!(f, "{} - {}", expected.trim(), actual.trim())
    }
}

/// A terminal difference record; never carries nested element differences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LeafDifference {
    /// Aligned elements with disagreeing identifying attributes.
    IdentifyingAttributes(IdentifyingAttributesDifference),
    /// An actual element with no expected counterpart.
    Inserted(IdentifyingAttributes),
    /// An expected element with no aligned actual counterpart.
    Deleted(IdentifyingAttributes),
}

impl LeafDifference {
    /// Leaf records always count as one difference.
    pub fn size(&self) -> usize {
        1
    }

    pub fn change_type(&self) -> Option<ChangeType> {
        match self {
            LeafDifference::Inserted(_) => Some(ChangeType::Inserted),
            LeafDifference::Deleted(_) => Some(ChangeType::Deleted),
            LeafDifference::IdentifyingAttributes(_) => None,
        }
    }
}

impl fmt::Display for LeafDifference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LeafDifference::IdentifyingAttributes(difference) => difference.fmt(f),
            LeafDifference::Inserted(identifying) => write!(f, "inserted [{}]", identifying),
            LeafDifference::Deleted(identifying) => write!(f, "deleted [{}]", identifying),
        }
    }
}

/// Composite difference of one expected element: its own records plus the
/// differences of its children.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementDifference {
    /// Identifying attributes of the element this difference describes
    /// (expected side, or actual side for insertions).
    pub identifying: IdentifyingAttributes,
    /// Identity-level difference, if any.
    pub leaf: Option<LeafDifference>,
    /// Disagreements on descriptive attributes.
    pub attribute_differences: Vec<AttributeDifference>,
    /// Differences of child elements.
    pub children: Vec<ElementDifference>,
}

impl ElementDifference {
    /// A difference node with no records of its own.
    pub fn empty(identifying: IdentifyingAttributes) -> Self {
        Self {
            identifying,
            leaf: None,
            attribute_differences: Vec::new(),
            children: Vec::new(),
        }
    }

    /// True if neither this element nor any descendant differs.
    pub fn is_empty(&self) -> bool {
        self.leaf.is_none()
            && self.attribute_differences.is_empty()
            && self.children.iter().all(ElementDifference::is_empty)
    }

    fn own_count(&self) -> usize {
        if self.leaf.is_some() || !self.attribute_differences.is_empty() {
            1
        } else {
            0
        }
    }

    /// Additive size: own record count plus the sum of the children's
    /// sizes.
    pub fn size(&self) -> usize {
        self.own_count() + self.children.iter().map(ElementDifference::size).sum::<usize>()
    }

    /// This element and every descendant that carries a difference of its
    /// own, in depth-first order.
    pub fn element_differences(&self) -> Vec<&ElementDifference> {
        let mut out = Vec::new();
        self.collect(&mut out);
        out
    }

    fn collect<'a>(&'a self, out: &mut Vec<&'a ElementDifference>) {
        if self.own_count() > 0 {
            out.push(self);
        }
        for child in &self.children {
            child.collect(out);
        }
    }
}

impl fmt::Display for ElementDifference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(leaf) = &self.leaf {
            return leaf.fmt(f);
        }
        let mut expected = String::new();
        let mut actual = String::new();
        for difference in &self.attribute_differences {
            expected.push_str(&format!(
                " expected {}: {}",
                difference.key,
                difference.expected.as_deref().unwrap_or("")
            ));
            actual.push_str(&format!(
                " actual {}: {}",
                difference.key,
                difference.actual.as_deref().unwrap_or("")
            ));
        }
        write!(f, "{} - {}", expected.trim(), actual.trim())
    }
}

/// Outcome of comparing one expected root element against its aligned
/// actual root (possibly "no difference").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RootElementDifference {
    pub difference: ElementDifference,
}

impl RootElementDifference {
    pub fn new(difference: ElementDifference) -> Self {
        Self { difference }
    }

    pub fn size(&self) -> usize {
        self.difference.size()
    }

    pub fn is_empty(&self) -> bool {
        self.difference.is_empty()
    }
}

/// Aggregation over a whole snapshot comparison: one outcome per root
/// element pair considered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateDifference {
    root_differences: Vec<RootElementDifference>,
}

impl StateDifference {
    pub fn new(root_differences: Vec<RootElementDifference>) -> Self {
        Self { root_differences }
    }

    /// Number of root element pairs considered.
    pub fn size(&self) -> usize {
        self.root_differences.len()
    }

    pub fn root_differences(&self) -> &[RootElementDifference] {
        &self.root_differences
    }

    /// Only the pairs that actually differ.
    pub fn non_empty_differences(&self) -> Vec<&RootElementDifference> {
        self.root_differences
            .iter()
            .filter(|d| !d.is_empty())
            .collect()
    }

    /// Flattened element differences across all pairs, for reporting.
    pub fn element_differences(&self) -> Vec<&ElementDifference> {
        self.root_differences
            .iter()
            .flat_map(|root| root.difference.element_differences())
            .collect()
    }

    /// Total number of individual difference records.
    pub fn difference_count(&self) -> usize {
        self.root_differences.iter().map(RootElementDifference::size).sum()
    }

    pub fn has_differences(&self) -> bool {
        self.root_differences.iter().any(|d| !d.is_empty())
    }
}
