//! Difference model invariant tests
//!
//! End-to-end properties of `find_state_difference` and the difference
//! tree it produces:
//! - an attribute change on one deep element yields exactly one record
//! - a removed subtree collapses into a single deleted record
//! - an added element is reported inserted with the actual-side identity
//! - size is additive over children
//! - the report keeps one outcome per root pair

use statecheck::config::CheckConfig;
use statecheck::diff::{find_state_difference, AttributeDifference, LeafDifference};
use statecheck::element::{Attributes, ElementTree, ElementTreeBuilder, IdentifyingAttributes, State};

fn ident(element_type: &str, path: &str) -> IdentifyingAttributes {
    IdentifyingAttributes::of(element_type, path)
}

/// window > panel > (button, label), with a configurable button label.
fn form_tree(button_label: &str) -> ElementTree {
    let mut builder = ElementTreeBuilder::new(ident("window", "w[1]"), Attributes::new());
    let root = builder.root();
    let panel = builder.add_child(root, ident("panel", "w[1]/p[1]"), Attributes::new());
    builder.add_child(
        panel,
        ident("button", "w[1]/p[1]/b[1]"),
        Attributes::new().with("label", button_label),
    );
    builder.add_child(
        panel,
        ident("label", "w[1]/p[1]/l[1]"),
        Attributes::new().with("text", "Name:"),
    );
    builder.build()
}

// =============================================================================
// Attribute changes
// =============================================================================

/// One changed attribute on one deep element: exactly one attribute
/// difference, on the right element, with both values.
#[test]
fn test_deep_attribute_change_yields_one_record() {
    let expected = State::new(vec![form_tree("Save")]);
    let actual = State::new(vec![form_tree("Submit")]);

    let difference = find_state_difference(&expected, &actual, &CheckConfig::default());
    assert!(difference.has_differences());
    assert_eq!(difference.difference_count(), 1);

    let elements = difference.element_differences();
    assert_eq!(elements.len(), 1);
    assert_eq!(elements[0].identifying.element_type(), Some("button"));
    assert_eq!(
        elements[0].attribute_differences,
        vec![AttributeDifference::new(
            "label",
            Some("Save".into()),
            Some("Submit".into())
        )]
    );
}

/// Identical snapshots produce an outcome per root pair but no
/// differences.
#[test]
fn test_identical_snapshots_report_nothing() {
    let expected = State::new(vec![form_tree("Save")]);
    let actual = State::new(vec![form_tree("Save")]);

    let difference = find_state_difference(&expected, &actual, &CheckConfig::default());
    assert_eq!(difference.size(), 1);
    assert!(!difference.has_differences());
    assert!(difference.non_empty_differences().is_empty());
}

// =============================================================================
// Deletions
// =============================================================================

/// A subtree present only on the expected side is reported as one deleted
/// record; its descendants are not reported separately.
#[test]
fn test_removed_subtree_collapses_into_one_deleted_record() {
    let mut builder = ElementTreeBuilder::new(ident("window", "w[1]"), Attributes::new());
    let root = builder.root();
    let panel = builder.add_child(root, ident("panel", "w[1]/p[1]"), Attributes::new());
    builder.add_child(panel, ident("button", "w[1]/p[1]/b[1]"), Attributes::new());
    builder.add_child(panel, ident("button", "w[1]/p[1]/b[2]"), Attributes::new());
    let sidebar = builder.add_child(root, ident("sidebar", "w[1]/s[1]"), Attributes::new());
    builder.add_child(sidebar, ident("link", "w[1]/s[1]/a[1]"), Attributes::new());
    builder.add_child(sidebar, ident("link", "w[1]/s[1]/a[2]"), Attributes::new());
    let expected_tree = builder.build();

    let mut builder = ElementTreeBuilder::new(ident("window", "w[1]"), Attributes::new());
    let root = builder.root();
    let panel = builder.add_child(root, ident("panel", "w[1]/p[1]"), Attributes::new());
    builder.add_child(panel, ident("button", "w[1]/p[1]/b[1]"), Attributes::new());
    builder.add_child(panel, ident("button", "w[1]/p[1]/b[2]"), Attributes::new());
    let actual_tree = builder.build();

    let expected = State::new(vec![expected_tree]);
    let actual = State::new(vec![actual_tree]);
    let difference = find_state_difference(&expected, &actual, &CheckConfig::default());

    let deleted: Vec<_> = difference
        .element_differences()
        .into_iter()
        .filter(|d| matches!(d.leaf, Some(LeafDifference::Deleted(_))))
        .collect();
    assert_eq!(deleted.len(), 1);
    assert_eq!(deleted[0].identifying.element_type(), Some("sidebar"));
    // The collapsed record carries no child records of its own.
    assert!(deleted[0].children.is_empty());
}

// =============================================================================
// Insertions
// =============================================================================

/// An element present only on the actual side is reported inserted, under
/// the parent it appeared in.
#[test]
fn test_added_element_is_reported_inserted() {
    let mut builder = ElementTreeBuilder::new(ident("window", "w[1]"), Attributes::new());
    let root = builder.root();
    builder.add_child(root, ident("button", "w[1]/b[1]"), Attributes::new());
    let expected_tree = builder.build();

    let mut builder = ElementTreeBuilder::new(ident("window", "w[1]"), Attributes::new());
    let root = builder.root();
    builder.add_child(root, ident("button", "w[1]/b[1]"), Attributes::new());
    builder.add_child(root, ident("toast", "w[1]/t[1]"), Attributes::new());
    let actual_tree = builder.build();

    let expected = State::new(vec![expected_tree]);
    let actual = State::new(vec![actual_tree]);
    let difference = find_state_difference(&expected, &actual, &CheckConfig::default());

    let inserted: Vec<_> = difference
        .element_differences()
        .into_iter()
        .filter(|d| matches!(d.leaf, Some(LeafDifference::Inserted(_))))
        .collect();
    assert_eq!(inserted.len(), 1);
    assert_eq!(inserted[0].identifying.element_type(), Some("toast"));
    let Some(LeafDifference::Inserted(identifying)) = &inserted[0].leaf else {
        panic!("expected an inserted record");
    };
    assert_eq!(identifying.path(), Some("w[1]/t[1]"));
}

// =============================================================================
// Size and root pairing
// =============================================================================

/// The difference count is the sum of all leaf records and attribute
/// differences across the whole tree.
#[test]
fn test_difference_count_is_additive() {
    let mut builder = ElementTreeBuilder::new(ident("window", "w[1]"), Attributes::new());
    let root = builder.root();
    builder.add_child(
        root,
        ident("button", "w[1]/b[1]"),
        Attributes::new().with("label", "Save").with("enabled", "true"),
    );
    builder.add_child(root, ident("label", "w[1]/l[1]"), Attributes::new());
    let expected_tree = builder.build();

    let mut builder = ElementTreeBuilder::new(ident("window", "w[1]"), Attributes::new());
    let root = builder.root();
    builder.add_child(
        root,
        ident("button", "w[1]/b[1]"),
        Attributes::new().with("label", "Submit").with("enabled", "false"),
    );
    builder.add_child(root, ident("toast", "w[1]/t[1]"), Attributes::new());
    let actual_tree = builder.build();

    let expected = State::new(vec![expected_tree]);
    let actual = State::new(vec![actual_tree]);
    let difference = find_state_difference(&expected, &actual, &CheckConfig::default());

    // One changed button + one deleted label + one inserted toast.
    assert_eq!(difference.difference_count(), 3);
    assert_eq!(difference.element_differences().len(), 3);
}

/// Every expected root gets an outcome: pairs where a counterpart exists,
/// deleted/inserted records for leftovers.
#[test]
fn test_report_keeps_one_outcome_per_root_pair() {
    let expected = State::new(vec![
        ElementTree::single(ident("window", "w[1]"), Attributes::new()),
        ElementTree::single(ident("dialog", "dlg"), Attributes::new()),
    ]);
    let actual = State::new(vec![
        ElementTree::single(ident("window", "w[1]"), Attributes::new()),
        ElementTree::single(ident("toast", "toast"), Attributes::new()),
    ]);

    let difference = find_state_difference(&expected, &actual, &CheckConfig::default());
    // w[1] pairs with w[1]; the dialog and the toast share nothing at all,
    // so each becomes its own outcome.
    assert_eq!(difference.size(), 3);
    assert_eq!(difference.difference_count(), 2);
}

/// Roots that changed type but kept their place still pair up, reporting
/// the type change instead of a delete/insert pair.
#[test]
fn test_changed_root_type_pairs_instead_of_delete_insert() {
    let expected = State::new(vec![ElementTree::single(
        ident("window", "w[1]"),
        Attributes::new(),
    )]);
    let actual = State::new(vec![ElementTree::single(
        ident("dialog", "w[1]"),
        Attributes::new(),
    )]);

    let difference = find_state_difference(&expected, &actual, &CheckConfig::default());
    assert_eq!(difference.size(), 1);

    let elements = difference.element_differences();
    assert_eq!(elements.len(), 1);
    let Some(LeafDifference::IdentifyingAttributes(identifying_difference)) = &elements[0].leaf
    else {
        panic!("expected an identifying-attributes difference");
    };
    assert_eq!(identifying_difference.attribute_differences().len(), 1);
    assert_eq!(identifying_difference.attribute_differences()[0].key, "type");
}
