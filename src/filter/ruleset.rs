//! Rule sets
//!
//! A rule set is the parsed content of one ignore-rule file: an ordered
//! list of filters, read-only after load and safe to share across threads.
//! It also implements pruning of a computed `StateDifference`.

use crate::diff::{
    AttributeDifference, ChangeType, ElementDifference, IdentifyingAttributesDifference,
    LeafDifference, RootElementDifference, StateDifference,
};
use crate::element::IdentifyingAttributes;
use crate::observability::{Logger, Severity};

use super::errors::{FilterError, FilterResult};
use super::filters::Filter;
use super::loader::{load_line, LoadContext, RuleSource};

/// An ordered, immutable set of ignore rules.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RuleSet {
    filters: Vec<Filter>,
}

impl RuleSet {
    /// A rule set that suppresses nothing. Missing rule files load as this.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_filters(filters: Vec<Filter>) -> Self {
        Self { filters }
    }

    /// Parses one rule file. Blank lines and `#` comments are skipped;
    /// any unrecognized line fails the whole load with its line number.
    pub fn parse(text: &str, source: &dyn RuleSource) -> FilterResult<Self> {
        let mut context = LoadContext { source, depth: 0 };
        let mut filters = Vec::new();
        for (number, line) in text.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let filter = load_line(trimmed, &mut context).map_err(|source| {
                FilterError::RuleLine {
                    line_number: number + 1,
                    source: Box::new(source),
                }
            })?;
            filters.push(filter);
        }
        Logger::log(
            Severity::Trace,
            "rules_loaded",
            &[("rules", &filters.len().to_string())],
        );
        Ok(Self { filters })
    }

    /// Serializes the rule set back to its textual form, one rule per
    /// line.
    pub fn save(&self) -> String {
        let mut out = String::new();
        for filter in &self.filters {
            out.push_str(&filter.save());
            out.push('\n');
        }
        out
    }

    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// True if any rule suppresses the element as a whole.
    pub fn matches_element(
        &self,
        element: &IdentifyingAttributes,
        ancestors: &[&IdentifyingAttributes],
    ) -> bool {
        self.filters
            .iter()
            .any(|f| f.matches_element(element, ancestors))
    }

    /// True if any rule suppresses this attribute difference.
    pub fn matches_attribute_difference(
        &self,
        element: &IdentifyingAttributes,
        ancestors: &[&IdentifyingAttributes],
        difference: &AttributeDifference,
    ) -> bool {
        self.filters
            .iter()
            .any(|f| f.matches_attribute_difference(element, ancestors, difference))
    }

    /// True if any rule suppresses an inserted/deleted report.
    pub fn matches_change(
        &self,
        element: &IdentifyingAttributes,
        ancestors: &[&IdentifyingAttributes],
        change: ChangeType,
    ) -> bool {
        self.filters
            .iter()
            .any(|f| f.matches_change(element, ancestors, change))
    }

    /// Prunes every suppressed difference from a computed report. The
    /// number of root pairs is preserved; suppressed outcomes become
    /// empty.
    pub fn prune(&self, state: &StateDifference) -> StateDifference {
        let roots = state
            .root_differences()
            .iter()
            .map(|root| {
                let mut ancestors = Vec::new();
                let pruned = self
                    .prune_element(&root.difference, &mut ancestors)
                    .unwrap_or_else(|| {
                        ElementDifference::empty(root.difference.identifying.clone())
                    });
                RootElementDifference::new(pruned)
            })
            .collect();
        StateDifference::new(roots)
    }

    fn prune_element<'a>(
        &self,
        difference: &'a ElementDifference,
        ancestors: &mut Vec<&'a IdentifyingAttributes>,
    ) -> Option<ElementDifference> {
        if self.matches_element(&difference.identifying, ancestors) {
            // The whole subtree is suppressed.
            return None;
        }

        let mut out = ElementDifference::empty(difference.identifying.clone());

        match &difference.leaf {
            Some(LeafDifference::Inserted(identifying)) => {
                if !self.matches_change(&difference.identifying, ancestors, ChangeType::Inserted) {
                    out.leaf = Some(LeafDifference::Inserted(identifying.clone()));
                }
            }
            Some(LeafDifference::Deleted(identifying)) => {
                if !self.matches_change(&difference.identifying, ancestors, ChangeType::Deleted) {
                    out.leaf = Some(LeafDifference::Deleted(identifying.clone()));
                }
            }
            Some(LeafDifference::IdentifyingAttributes(identifying_difference)) => {
                let kept: Vec<AttributeDifference> = identifying_difference
                    .attribute_differences()
                    .iter()
                    .filter(|d| {
                        !self.matches_attribute_difference(&difference.identifying, ancestors, d)
                    })
                    .cloned()
                    .collect();
                if !kept.is_empty() {
                    out.leaf = Some(LeafDifference::IdentifyingAttributes(
                        IdentifyingAttributesDifference::new(
                            identifying_difference.attributes().clone(),
                            kept,
                        ),
                    ));
                }
            }
            None => {}
        }

        out.attribute_differences = difference
            .attribute_differences
            .iter()
            .filter(|d| !self.matches_attribute_difference(&difference.identifying, ancestors, d))
            .cloned()
            .collect();

        ancestors.push(&difference.identifying);
        for child in &difference.children {
            if let Some(pruned) = self.prune_element(child, ancestors) {
                if !pruned.is_empty() {
                    out.children.push(pruned);
                }
            }
        }
        ancestors.pop();

        Some(out)
    }
}
