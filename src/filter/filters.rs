//! Filter variants
//!
//! A filter decides whether a difference touching an element should be
//! suppressed. Chainable filters operate on one (element, attribute
//! difference) pair; exclude filters suppress whole subtrees. The variant
//! set is closed and every dispatch site handles it exhaustively.

use regex::Regex;

use crate::diff::{AttributeDifference, ChangeType};
use crate::element::{ElementTree, IdentifyingAttributes, NodeId};

use super::errors::{FilterError, FilterResult};
use super::matcher::Matcher;

/// One ignore rule.
#[derive(Debug, Clone)]
pub enum Filter {
    /// Suppresses every difference of elements accepted by the matcher,
    /// ancestor-inclusive.
    Matcher(MatcherFilter),
    /// Suppresses differences of one attribute by exact key.
    Attribute(AttributeFilter),
    /// Suppresses differences whose attribute key matches a regex.
    AttributeRegex(AttributeRegexFilter),
    /// Suppresses pixel-valued differences within a tolerance.
    PixelDiff(PixelDiffFilter),
    /// Suppresses differences whose value matches a regex.
    ValueRegex(ValueRegexFilter),
    /// Suppresses "element was inserted" reports.
    Inserted,
    /// Suppresses "element was deleted" reports.
    Deleted,
    /// Suppresses an entire subtree when any wrapped filter matches.
    Exclude(ExcludeFilter),
    /// Rules inlined from an externally defined rule file.
    Import(ImportedFilter),
    /// A chain where every wrapped filter must agree.
    AllMatch(AllMatchFilter),
}

impl PartialEq for Filter {
    fn eq(&self, other: &Self) -> bool {
        // Textual form is the canonical identity of a rule.
        self.save() == other.save()
    }
}

impl Filter {
    /// True if this filter suppresses the element (and thereby its whole
    /// subtree). `ancestors` is the identifying-attribute chain of the
    /// element's ancestors, nearest first.
    pub fn matches_element(
        &self,
        element: &IdentifyingAttributes,
        ancestors: &[&IdentifyingAttributes],
    ) -> bool {
        match self {
            Filter::Matcher(filter) => filter.matches(element, ancestors),
            Filter::Exclude(exclude) => exclude
                .filters
                .iter()
                .any(|f| f.matches_element(element, ancestors)),
            Filter::Import(import) => import
                .rules
                .iter()
                .any(|f| f.matches_element(element, ancestors)),
            Filter::AllMatch(chain) => {
                !chain.filters.is_empty()
                    && chain
                        .filters
                        .iter()
                        .all(|f| f.matches_element(element, ancestors))
            }
            Filter::Attribute(_)
            | Filter::AttributeRegex(_)
            | Filter::PixelDiff(_)
            | Filter::ValueRegex(_)
            | Filter::Inserted
            | Filter::Deleted => false,
        }
    }

    /// True if this filter suppresses one attribute difference of the
    /// element.
    pub fn matches_attribute_difference(
        &self,
        element: &IdentifyingAttributes,
        ancestors: &[&IdentifyingAttributes],
        difference: &AttributeDifference,
    ) -> bool {
        match self {
            Filter::Attribute(filter) => filter.matches(difference),
            Filter::AttributeRegex(filter) => filter.matches(difference),
            Filter::PixelDiff(filter) => filter.matches(difference),
            Filter::ValueRegex(filter) => filter.matches(difference),
            Filter::Matcher(filter) => filter.matches(element, ancestors),
            Filter::Exclude(exclude) => exclude.filters.iter().any(|f| {
                f.matches_element(element, ancestors)
                    || f.matches_attribute_difference(element, ancestors, difference)
            }),
            Filter::Import(import) => import
                .rules
                .iter()
                .any(|f| f.matches_attribute_difference(element, ancestors, difference)),
            Filter::AllMatch(chain) => {
                !chain.filters.is_empty()
                    && chain.filters.iter().all(|f| {
                        f.matches_element(element, ancestors)
                            || f.matches_attribute_difference(element, ancestors, difference)
                    })
            }
            Filter::Inserted | Filter::Deleted => false,
        }
    }

    /// True if this filter suppresses an inserted/deleted report for the
    /// element.
    pub fn matches_change(
        &self,
        element: &IdentifyingAttributes,
        ancestors: &[&IdentifyingAttributes],
        change: ChangeType,
    ) -> bool {
        match self {
            Filter::Inserted => change == ChangeType::Inserted,
            Filter::Deleted => change == ChangeType::Deleted,
            Filter::Matcher(filter) => filter.matches(element, ancestors),
            Filter::Exclude(exclude) => exclude.filters.iter().any(|f| {
                f.matches_element(element, ancestors)
                    || f.matches_change(element, ancestors, change)
            }),
            Filter::Import(import) => import
                .rules
                .iter()
                .any(|f| f.matches_change(element, ancestors, change)),
            Filter::AllMatch(chain) => {
                !chain.filters.is_empty()
                    && chain.filters.iter().all(|f| {
                        f.matches_element(element, ancestors)
                            || f.matches_change(element, ancestors, change)
                    })
            }
            Filter::Attribute(_)
            | Filter::AttributeRegex(_)
            | Filter::PixelDiff(_)
            | Filter::ValueRegex(_) => false,
        }
    }

    /// Convenience over a live tree: builds the ancestor chain of `id` and
    /// delegates to `matches_element`.
    pub fn matches_element_of(&self, tree: &ElementTree, id: NodeId) -> bool {
        let ancestors = tree.ancestor_identifying(id);
        self.matches_element(tree.identifying(id), &ancestors)
    }
}

/// Wraps a matcher; suppression is ancestor-inclusive so that marking a
/// container ignores everything beneath it.
#[derive(Debug, Clone, PartialEq)]
pub struct MatcherFilter {
    pub matcher: Matcher,
    /// Loaded from a bare matcher expression line (older rule files write
    /// e.g. `class=some-class` without the `matcher: ` prefix); preserved
    /// so that saving reproduces the original line.
    pub bare: bool,
}

impl MatcherFilter {
    pub fn new(matcher: Matcher) -> Self {
        Self {
            matcher,
            bare: false,
        }
    }

    pub fn bare(matcher: Matcher) -> Self {
        Self {
            matcher,
            bare: true,
        }
    }

    pub fn matches(
        &self,
        element: &IdentifyingAttributes,
        ancestors: &[&IdentifyingAttributes],
    ) -> bool {
        self.matcher.test(element) || ancestors.iter().any(|a| self.matcher.test(a))
    }
}

/// Suppresses differences of one attribute key.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeFilter {
    pub key: String,
    /// Loaded from the deprecated `attribute=` syntax; preserved so that
    /// saving reproduces the original line.
    pub legacy: bool,
}

impl AttributeFilter {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            legacy: false,
        }
    }

    pub fn legacy(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            legacy: true,
        }
    }

    pub fn matches(&self, difference: &AttributeDifference) -> bool {
        difference.key == self.key
    }
}

/// Suppresses differences whose attribute key matches a regex.
#[derive(Debug, Clone)]
pub struct AttributeRegexFilter {
    pub pattern: String,
    pub legacy: bool,
    regex: Regex,
}

impl AttributeRegexFilter {
    pub fn new(pattern: impl Into<String>) -> FilterResult<Self> {
        Self::build(pattern.into(), false)
    }

    pub fn legacy(pattern: impl Into<String>) -> FilterResult<Self> {
        Self::build(pattern.into(), true)
    }

    fn build(pattern: String, legacy: bool) -> FilterResult<Self> {
        let regex = Regex::new(&pattern).map_err(|source| FilterError::InvalidRegex {
            pattern: pattern.clone(),
            source,
        })?;
        Ok(Self {
            pattern,
            legacy,
            regex,
        })
    }

    pub fn matches(&self, difference: &AttributeDifference) -> bool {
        self.regex.is_match(&difference.key)
    }
}

/// Suppresses differences between pixel values that lie within a
/// tolerance, absolute (`5px`) or relative (`2.5%`).
#[derive(Debug, Clone, PartialEq)]
pub struct PixelDiffFilter {
    /// The textual form as loaded, reproduced on save.
    pub raw: String,
    tolerance: f64,
    percent: bool,
}

impl PixelDiffFilter {
    pub fn new(raw: impl Into<String>) -> FilterResult<Self> {
        let raw = raw.into();
        let (number, percent) = if let Some(number) = raw.strip_suffix('%') {
            (number, true)
        } else if let Some(number) = raw.strip_suffix("px") {
            (number, false)
        } else {
            return Err(FilterError::InvalidPixelDiff(raw));
        };
        let tolerance: f64 = number
            .trim()
            .parse()
            .map_err(|_| FilterError::InvalidPixelDiff(raw.clone()))?;
        if !tolerance.is_finite() || tolerance < 0.0 {
            return Err(FilterError::InvalidPixelDiff(raw));
        }
        Ok(Self {
            raw,
            tolerance,
            percent,
        })
    }

    pub fn matches(&self, difference: &AttributeDifference) -> bool {
        let (Some(expected), Some(actual)) = (
            difference.expected.as_deref().and_then(parse_pixels),
            difference.actual.as_deref().and_then(parse_pixels),
        ) else {
            return false;
        };
        let delta = (expected - actual).abs();
        if self.percent {
            if expected == 0.0 {
                return delta == 0.0;
            }
            delta / expected.abs() * 100.0 <= self.tolerance
        } else {
            delta <= self.tolerance
        }
    }
}

fn parse_pixels(value: &str) -> Option<f64> {
    let number = value.trim().strip_suffix("px").unwrap_or(value.trim());
    number.trim().parse().ok()
}

/// Suppresses differences whose expected or actual value matches a regex.
#[derive(Debug, Clone)]
pub struct ValueRegexFilter {
    pub pattern: String,
    regex: Regex,
}

impl ValueRegexFilter {
    pub fn new(pattern: impl Into<String>) -> FilterResult<Self> {
        let pattern = pattern.into();
        let regex = Regex::new(&pattern).map_err(|source| FilterError::InvalidRegex {
            pattern: pattern.clone(),
            source,
        })?;
        Ok(Self { pattern, regex })
    }

    pub fn matches(&self, difference: &AttributeDifference) -> bool {
        difference
            .expected
            .iter()
            .chain(difference.actual.iter())
            .any(|value| self.regex.is_match(value))
    }
}

/// Wraps an ordered chain of filters and suppresses an entire subtree when
/// any of them matches.
#[derive(Debug, Clone, PartialEq)]
pub struct ExcludeFilter {
    pub filters: Vec<Filter>,
}

impl ExcludeFilter {
    pub fn new(filters: Vec<Filter>) -> Self {
        Self { filters }
    }
}

/// Rules imported from another named rule file, inlined at load time.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportedFilter {
    pub name: String,
    pub rules: Vec<Filter>,
}

/// A chain where every wrapped filter must agree, e.g. a matcher narrowed
/// by an attribute filter.
#[derive(Debug, Clone, PartialEq)]
pub struct AllMatchFilter {
    pub filters: Vec<Filter>,
}

impl AllMatchFilter {
    pub fn new(filters: Vec<Filter>) -> Self {
        Self { filters }
    }
}
