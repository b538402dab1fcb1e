//! Difference computation
//!
//! Walks an `Alignment` over two trees and produces the difference tree:
//! unmatched expected elements become deletions, unaligned actual elements
//! become insertions, and aligned pairs are compared attribute by
//! attribute.

use std::collections::{BTreeSet, HashSet};

use crate::align::{similarity, Alignment};
use crate::config::CheckConfig;
use crate::element::{Attributes, ElementTree, IdentifyingAttributes, NodeId, State};

use super::types::{
    AttributeDifference, ElementDifference, IdentifyingAttributesDifference, LeafDifference,
    RootElementDifference, StateDifference,
};

/// Compares two snapshots, producing one outcome per root element pair.
///
/// Expected and actual roots are paired greedily by root-level similarity;
/// an expected root with no counterpart is reported deleted, a leftover
/// actual root inserted.
pub fn find_state_difference(
    expected: &State,
    actual: &State,
    config: &CheckConfig,
) -> StateDifference {
    let mut used_actual = vec![false; actual.roots.len()];
    let mut root_differences = Vec::new();

    for expected_tree in &expected.roots {
        let expected_root = expected_tree.identifying(expected_tree.root());
        let mut best: Option<(usize, f64)> = None;
        for (index, actual_tree) in actual.roots.iter().enumerate() {
            if used_actual[index] {
                continue;
            }
            let score = similarity(expected_root, actual_tree.identifying(actual_tree.root()));
            // Strictly-greater keeps first-seen-wins on ties.
            if best.map_or(true, |(_, best_score)| score > best_score) {
                best = Some((index, score));
            }
        }

        match best.filter(|&(_, score)| score > 0.0) {
            Some((index, _)) => {
                used_actual[index] = true;
                root_differences.push(find_root_difference(
                    expected_tree,
                    &actual.roots[index],
                    config,
                ));
            }
            None => {
                let mut difference = ElementDifference::empty(expected_root.clone());
                difference.leaf = Some(LeafDifference::Deleted(expected_root.clone()));
                root_differences.push(RootElementDifference::new(difference));
            }
        }
    }

    for (index, actual_tree) in actual.roots.iter().enumerate() {
        if used_actual[index] {
            continue;
        }
        let actual_root = actual_tree.identifying(actual_tree.root());
        let mut difference = ElementDifference::empty(actual_root.clone());
        difference.leaf = Some(LeafDifference::Inserted(actual_root.clone()));
        root_differences.push(RootElementDifference::new(difference));
    }

    StateDifference::new(root_differences)
}

/// Compares one expected root tree against one actual root tree.
pub fn find_root_difference(
    expected: &ElementTree,
    actual: &ElementTree,
    config: &CheckConfig,
) -> RootElementDifference {
    let alignment = Alignment::create(expected, actual, config);
    let used: HashSet<NodeId> = alignment.pairs().filter_map(|(_, a)| a).collect();
    // The root pair was decided at snapshot level and is not re-subjected
    // to the leaf threshold.
    let difference = walk(expected, actual, &alignment, &used, expected.root(), actual.root());
    RootElementDifference::new(difference)
}

fn walk(
    expected_tree: &ElementTree,
    actual_tree: &ElementTree,
    alignment: &Alignment,
    used: &HashSet<NodeId>,
    expected_id: NodeId,
    actual_id: NodeId,
) -> ElementDifference {
    let expected_identifying = expected_tree.identifying(expected_id);
    let actual_identifying = actual_tree.identifying(actual_id);
    let mut difference = ElementDifference::empty(expected_identifying.clone());

    let identifying_differences =
        compare_identifying(expected_identifying, actual_identifying);
    if !identifying_differences.is_empty() {
        difference.leaf = Some(LeafDifference::IdentifyingAttributes(
            IdentifyingAttributesDifference::new(
                expected_identifying.clone(),
                identifying_differences,
            ),
        ));
    }

    difference.attribute_differences = compare_attributes(
        expected_tree.attributes(expected_id),
        actual_tree.attributes(actual_id),
    );

    for &child in expected_tree.children(expected_id) {
        match alignment.get_actual(child) {
            Some(actual_child) => {
                difference.children.push(walk(
                    expected_tree,
                    actual_tree,
                    alignment,
                    used,
                    child,
                    actual_child,
                ));
            }
            None => {
                // No aligned counterpart: the whole subtree is reported
                // deleted as one record.
                let child_identifying = expected_tree.identifying(child).clone();
                let mut deleted = ElementDifference::empty(child_identifying.clone());
                deleted.leaf = Some(LeafDifference::Deleted(child_identifying));
                difference.children.push(deleted);
            }
        }
    }

    // Actual children nobody aligned to are insertions.
    for &actual_child in actual_tree.children(actual_id) {
        if used.contains(&actual_child) {
            continue;
        }
        let inserted_identifying = actual_tree.identifying(actual_child).clone();
        let mut inserted = ElementDifference::empty(inserted_identifying.clone());
        inserted.leaf = Some(LeafDifference::Inserted(inserted_identifying));
        difference.children.push(inserted);
    }

    difference
}

fn compare_identifying(
    expected: &IdentifyingAttributes,
    actual: &IdentifyingAttributes,
) -> Vec<AttributeDifference> {
    if expected == actual {
        return Vec::new();
    }
    expected
        .key_union(actual)
        .into_iter()
        .filter_map(|key| {
            let expected_value = expected.get(key);
            let actual_value = actual.get(key);
            if expected_value == actual_value {
                None
            } else {
                Some(AttributeDifference::new(
                    key,
                    expected_value.map(str::to_string),
                    actual_value.map(str::to_string),
                ))
            }
        })
        .collect()
}

fn compare_attributes(expected: &Attributes, actual: &Attributes) -> Vec<AttributeDifference> {
    let keys: BTreeSet<&str> = expected
        .iter()
        .map(|(k, _)| k)
        .chain(actual.iter().map(|(k, _)| k))
        .collect();
    keys.into_iter()
        .filter_map(|key| {
            let expected_value = expected.get(key);
            let actual_value = actual.get(key);
            if expected_value == actual_value {
                None
            } else {
                Some(AttributeDifference::new(
                    key,
                    expected_value.map(str::to_string),
                    actual_value.map(str::to_string),
                ))
            }
        })
        .collect()
}
