//! Tree alignment
//!
//! The worklist algorithm: flatten both trees to their leaves, match leaves
//! by similarity with eviction of weaker claims, then propagate matches up
//! the ancestor chains and resolve pseudo containers by proxy.

use std::collections::{HashMap, VecDeque};

use crate::config::CheckConfig;
use crate::element::{ElementTree, IdentifyingAttributes, NodeId};
use crate::observability::{Logger, Severity};

use super::score::{similarity, sort_candidates, Match};

/// An immutable, total mapping from expected-tree elements to their aligned
/// actual-tree counterparts (or no match).
///
/// Built once per (expected, actual) pair; read-only thereafter. Elements
/// never visited by leaf flattening or parent propagation are absent from
/// the mapping and must be treated as unmatched.
#[derive(Debug, Clone, PartialEq)]
pub struct Alignment {
    mapping: HashMap<NodeId, Option<NodeId>>,
}

impl Alignment {
    /// Computes the alignment of two element trees.
    ///
    /// Deterministic given identical inputs; no side effects beyond the
    /// returned value.
    pub fn create(expected: &ElementTree, actual: &ElementTree, config: &CheckConfig) -> Self {
        let expected_flat = flatten_leaves(expected);
        let actual_flat = flatten_leaves(actual);
        Logger::log(
            Severity::Trace,
            "alignment_start",
            &[
                ("actual_leaves", &actual_flat.leaves.len().to_string()),
                ("expected_leaves", &expected_flat.leaves.len().to_string()),
            ],
        );

        let threshold = config.element_match_threshold;
        let mut mapping = align_worklist(
            expected,
            actual,
            &expected_flat.leaves,
            &actual_flat.leaves,
            threshold,
        );
        add_parent_alignment(
            &mut mapping,
            expected,
            actual,
            &expected_flat.parents,
            &actual_flat.parents,
            threshold,
        );
        align_pseudo_elements(&mut mapping, expected, actual, &expected_flat, &actual_flat);

        Self { mapping }
    }

    /// The aligned actual element for an expected element.
    ///
    /// `None` means either "no match" was recorded or the element was never
    /// visited; callers treat both as unmatched.
    pub fn get_actual(&self, expected: NodeId) -> Option<NodeId> {
        self.mapping.get(&expected).copied().flatten()
    }

    /// True if an entry (matched or explicitly unmatched) exists for the
    /// expected element.
    pub fn contains(&self, expected: NodeId) -> bool {
        self.mapping.contains_key(&expected)
    }

    /// All recorded (expected, aligned actual) pairs.
    pub fn pairs(&self) -> impl Iterator<Item = (NodeId, Option<NodeId>)> + '_ {
        self.mapping.iter().map(|(&k, &v)| (k, v))
    }

    /// Number of recorded entries.
    pub fn len(&self) -> usize {
        self.mapping.len()
    }

    /// True if nothing was aligned.
    pub fn is_empty(&self) -> bool {
        self.mapping.is_empty()
    }
}

/// Leaves, child-to-parent edges, and pseudo anchors of one tree.
struct Flattened {
    /// Leaf elements in discovery (depth-first) order.
    leaves: Vec<NodeId>,
    /// Child to parent, for every traversed element.
    parents: HashMap<NodeId, NodeId>,
    /// Pseudo element to its nearest non-pseudo ancestor, discovery order.
    pseudo_anchors: Vec<(NodeId, NodeId)>,
}

fn flatten_leaves(tree: &ElementTree) -> Flattened {
    let mut flat = Flattened {
        leaves: Vec::new(),
        parents: HashMap::new(),
        pseudo_anchors: Vec::new(),
    };
    let root = tree.root();
    if tree.is_leaf(root) {
        flat.leaves.push(root);
    }
    visit(tree, root, root, &mut flat);
    flat
}

fn visit(tree: &ElementTree, node: NodeId, anchor: NodeId, flat: &mut Flattened) {
    for &child in tree.children(node) {
        flat.parents.insert(child, node);
        if tree.is_pseudo(child) {
            flat.pseudo_anchors.push((child, anchor));
            visit(tree, child, anchor, flat);
        } else {
            if tree.is_leaf(child) {
                flat.leaves.push(child);
            }
            visit(tree, child, child, flat);
        }
    }
}

/// Aligns one list of expected elements against one list of actual
/// candidates. Used both for leaves and for the small per-pair ancestor
/// chains during propagation.
fn align_worklist(
    expected_tree: &ElementTree,
    actual_tree: &ElementTree,
    expected_elements: &[NodeId],
    actual_elements: &[NodeId],
    threshold: f64,
) -> HashMap<NodeId, Option<NodeId>> {
    // Identity lookup for the cheap common case; first occurrence wins.
    let mut identity: HashMap<&IdentifyingAttributes, NodeId> = HashMap::new();
    for &actual in actual_elements {
        identity.entry(actual_tree.identifying(actual)).or_insert(actual);
    }

    // Last-discovered elements are aligned first; evicted elements are
    // re-queued at the back and therefore retried next.
    let mut queue: VecDeque<NodeId> = expected_elements.iter().copied().collect();
    let mut claims: HashMap<NodeId, Match> = HashMap::new();
    let mut mapping: HashMap<NodeId, Option<NodeId>> = HashMap::new();

    while let Some(expected) = queue.pop_back() {
        let mut candidates = best_matches(
            expected_tree,
            actual_tree,
            expected,
            actual_elements,
            &identity,
        )
        .into_iter();
        let mut best = candidates.next();

        while let Some(candidate) = best {
            match claims.get(&candidate.element) {
                Some(previous) if candidate.similarity <= previous.similarity => {
                    // Candidate is already taken with an equal or better
                    // claim; this expected element loses the tie.
                    best = candidates.next();
                }
                Some(previous) => {
                    // Weaker claim is evicted and re-queued for re-matching.
                    mapping.remove(&previous.element);
                    queue.push_back(previous.element);
                    break;
                }
                None => break,
            }
        }

        let Some(best) = best else {
            mapping.insert(expected, None);
            continue;
        };

        if best.similarity < threshold {
            Logger::log(
                Severity::Trace,
                "alignment_below_threshold",
                &[
                    ("expected", &expected_tree.identifying(expected).to_string()),
                    ("similarity", &format!("{:.4}", best.similarity)),
                ],
            );
            mapping.insert(expected, None);
            continue;
        }

        mapping.insert(expected, Some(best.element));
        claims.insert(best.element, Match::of(best.similarity, expected));
    }

    mapping
}

/// Candidates for one expected element, ordered by descending similarity.
///
/// Structural identity is an O(1) lookup; otherwise every candidate is
/// scored, stopping early when an exact match turns up. The stable sort
/// keeps evaluation order for equal scores (first seen wins).
fn best_matches(
    expected_tree: &ElementTree,
    actual_tree: &ElementTree,
    expected: NodeId,
    actual_elements: &[NodeId],
    identity: &HashMap<&IdentifyingAttributes, NodeId>,
) -> Vec<Match> {
    let expected_identifying = expected_tree.identifying(expected);
    if let Some(&identical) = identity.get(expected_identifying) {
        return vec![Match::exact(identical)];
    }

    let mut candidates = Vec::with_capacity(actual_elements.len());
    for &actual in actual_elements {
        let score = similarity(expected_identifying, actual_tree.identifying(actual));
        candidates.push(Match::of(score, actual));
        if score == 1.0 {
            break;
        }
    }
    sort_candidates(&mut candidates);
    candidates
}

/// Runs the worklist over the ancestor chains of every resolved pair.
///
/// An ancestor pairing only overrides an existing entry when it scores a
/// strictly higher similarity, or when no match is recorded yet.
fn add_parent_alignment(
    mapping: &mut HashMap<NodeId, Option<NodeId>>,
    expected_tree: &ElementTree,
    actual_tree: &ElementTree,
    expected_parents: &HashMap<NodeId, NodeId>,
    actual_parents: &HashMap<NodeId, NodeId>,
    threshold: f64,
) {
    let mut snapshot: Vec<(NodeId, Option<NodeId>)> =
        mapping.iter().map(|(&k, &v)| (k, v)).collect();
    snapshot.sort_by_key(|&(expected, _)| expected);

    for (expected, actual) in snapshot {
        let expected_chain = parent_chain(expected_parents, expected);
        let actual_chain = actual
            .map(|a| parent_chain(actual_parents, a))
            .unwrap_or_default();

        let parent_alignment = align_worklist(
            expected_tree,
            actual_tree,
            &expected_chain,
            &actual_chain,
            threshold,
        );
        let mut pairs: Vec<(NodeId, Option<NodeId>)> = parent_alignment.into_iter().collect();
        pairs.sort_by_key(|&(expected, _)| expected);

        for (parent_expected, parent_actual) in pairs {
            match mapping.get(&parent_expected).copied() {
                None | Some(None) => {
                    mapping.insert(parent_expected, parent_actual);
                }
                Some(Some(current)) => {
                    let Some(parent_actual) = parent_actual else {
                        continue;
                    };
                    let candidate_score = similarity(
                        expected_tree.identifying(parent_expected),
                        actual_tree.identifying(parent_actual),
                    );
                    let current_score = similarity(
                        expected_tree.identifying(parent_expected),
                        actual_tree.identifying(current),
                    );
                    if candidate_score > current_score {
                        mapping.insert(parent_expected, Some(parent_actual));
                    }
                }
            }
        }
    }
}

fn parent_chain(parents: &HashMap<NodeId, NodeId>, element: NodeId) -> Vec<NodeId> {
    let mut chain = Vec::new();
    let mut current = parents.get(&element);
    while let Some(&parent) = current {
        chain.push(parent);
        current = parents.get(&parent);
    }
    chain
}

/// Pseudo containers have no identity of their own: each one is resolved
/// through its nearest real neighbor, pairing it with the matching pseudo
/// under that neighbor's aligned counterpart.
fn align_pseudo_elements(
    mapping: &mut HashMap<NodeId, Option<NodeId>>,
    expected_tree: &ElementTree,
    actual_tree: &ElementTree,
    expected_flat: &Flattened,
    actual_flat: &Flattened,
) {
    let mut actual_by_anchor: HashMap<NodeId, Vec<NodeId>> = HashMap::new();
    for &(pseudo, anchor) in &actual_flat.pseudo_anchors {
        actual_by_anchor.entry(anchor).or_default().push(pseudo);
    }

    for &(pseudo, anchor) in &expected_flat.pseudo_anchors {
        let expected_identifying = expected_tree.identifying(pseudo);
        let aligned = mapping
            .get(&anchor)
            .copied()
            .flatten()
            .and_then(|actual_anchor| {
                let candidates = actual_by_anchor.get(&actual_anchor)?;
                candidates
                    .iter()
                    .copied()
                    .find(|&c| actual_tree.identifying(c) == expected_identifying)
                    .or_else(|| {
                        candidates.iter().copied().find(|&c| {
                            actual_tree.identifying(c).element_type()
                                == expected_identifying.element_type()
                        })
                    })
            });
        mapping.insert(pseudo, aligned);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{Attributes, ElementTreeBuilder, IdentifyingAttributes};

    fn ident(element_type: &str, path: &str) -> IdentifyingAttributes {
        IdentifyingAttributes::of(element_type, path)
    }

    fn two_leaf_tree(paths: &[&str]) -> ElementTree {
        let mut builder = ElementTreeBuilder::new(ident("window", "w[1]"), Attributes::new());
        let root = builder.root();
        for path in paths {
            builder.add_child(root, ident("button", path), Attributes::new());
        }
        builder.build()
    }

    #[test]
    fn test_identical_trees_align_completely() {
        let expected = two_leaf_tree(&["w[1]/b[1]", "w[1]/b[2]"]);
        let actual = two_leaf_tree(&["w[1]/b[1]", "w[1]/b[2]"]);
        let alignment = Alignment::create(&expected, &actual, &CheckConfig::default());

        for id in expected.node_ids() {
            assert_eq!(alignment.get_actual(id), Some(id));
        }
    }

    #[test]
    fn test_deleted_leaf_is_unmatched() {
        let expected = two_leaf_tree(&["w[1]/b[1]", "w[1]/b[2]"]);
        let actual = two_leaf_tree(&["w[1]/b[2]"]);
        let alignment = Alignment::create(&expected, &actual, &CheckConfig::default());

        let expected_ids: Vec<NodeId> = expected.node_ids().collect();
        let b1 = expected_ids[1];
        let b2 = expected_ids[2];
        assert_eq!(alignment.get_actual(b1), None);
        assert!(alignment.contains(b1));
        let actual_ids: Vec<NodeId> = actual.node_ids().collect();
        assert_eq!(alignment.get_actual(b2), Some(actual_ids[1]));
    }

    #[test]
    fn test_single_node_trees_align() {
        let expected = ElementTree::single(ident("button", "b[1]"), Attributes::new());
        let actual = ElementTree::single(ident("button", "b[1]"), Attributes::new());
        let alignment = Alignment::create(&expected, &actual, &CheckConfig::default());

        assert_eq!(alignment.get_actual(expected.root()), Some(actual.root()));
    }

    #[test]
    fn test_parent_chain_reaches_root() {
        let mut builder = ElementTreeBuilder::new(ident("window", "w[1]"), Attributes::new());
        let root = builder.root();
        let panel = builder.add_child(root, ident("panel", "w[1]/p[1]"), Attributes::new());
        let button = builder.add_child(panel, ident("button", "w[1]/p[1]/b[1]"), Attributes::new());
        let tree = builder.build();

        let flat = flatten_leaves(&tree);
        assert_eq!(flat.leaves, vec![button]);
        assert_eq!(parent_chain(&flat.parents, button), vec![panel, root]);
    }

    #[test]
    fn test_identical_claim_is_never_displaced() {
        // Expected has two buttons; actual has one that is identical to the
        // second. The identical claim is processed first and a weaker
        // contender cannot take the candidate from it.
        let expected = two_leaf_tree(&["w[1]/b[1]", "w[1]/b[2]"]);
        let actual = two_leaf_tree(&["w[1]/b[2]"]);
        let alignment = Alignment::create(&expected, &actual, &CheckConfig::default());

        let expected_ids: Vec<NodeId> = expected.node_ids().collect();
        let actual_ids: Vec<NodeId> = actual.node_ids().collect();
        assert_eq!(alignment.get_actual(expected_ids[2]), Some(actual_ids[1]));
        assert_eq!(alignment.get_actual(expected_ids[1]), None);
    }

    #[test]
    fn test_weaker_claim_is_evicted_and_rematched() {
        // The worklist processes b[1] first (last discovered), which claims
        // the sole candidate. b[12x] then scores strictly higher and must
        // displace that claim; the evicted b[1] is re-queued and ends up
        // unmatched.
        let expected = two_leaf_tree(&["w[1]/b[12x]", "w[1]/b[1]"]);
        let actual = two_leaf_tree(&["w[1]/b[12]"]);
        let alignment = Alignment::create(&expected, &actual, &CheckConfig::default());

        let expected_ids: Vec<NodeId> = expected.node_ids().collect();
        let actual_ids: Vec<NodeId> = actual.node_ids().collect();
        assert_eq!(alignment.get_actual(expected_ids[1]), Some(actual_ids[1]));
        assert_eq!(alignment.get_actual(expected_ids[2]), None);
        assert!(alignment.contains(expected_ids[2]));
    }
}
