//! Filter engine end-to-end tests
//!
//! Rule files survive a load/save cycle byte for byte (deprecated
//! syntaxes included), imports inline the referenced file while saving
//! only the reference, and pruning a computed report honors
//! ancestor-inclusive suppression.

use std::fs;

use statecheck::config::CheckConfig;
use statecheck::diff::find_state_difference;
use statecheck::element::{Attributes, ElementTreeBuilder, IdentifyingAttributes, State};
use statecheck::filter::{load_rules_file, FilterError, NoImports, RuleSet, RuleSetLocator};
use tempfile::TempDir;

// =============================================================================
// Round trips
// =============================================================================

/// A rule file containing every rule variant saves back to its exact
/// original text.
#[test]
fn test_rule_file_round_trips_byte_for_byte() {
    let text = "\
matcher: type=button
matcher: class=debug-panel, attribute: label
matcher: id=save, exclude(change=inserted)
matcher: all, attribute: label
attribute: outline
attribute-regex: data-.*
pixel-diff: 5px
pixel-diff: 2.5%
value-regex: cache-[0-9]+
change=inserted
change=deleted
exclude(matcher: class=debug-panel; attribute: outline)
all
";
    let rules = RuleSet::parse(text, &NoImports).unwrap();
    assert_eq!(rules.save(), text);
}

/// Deprecated syntaxes load, keep their behavior, and are written back
/// unchanged instead of being rewritten to the current form.
#[test]
fn test_deprecated_syntaxes_survive_unchanged() {
    let text = "attribute=outline\nattribute-regex=data-.*\nclass=some-class\n";
    let rules = RuleSet::parse(text, &NoImports).unwrap();
    assert_eq!(rules.save(), text);

    let element = IdentifyingAttributes::of("div", "w[1]/div[1]").with("class", "some-class");
    assert!(rules.matches_element(&element, &[]));
}

// =============================================================================
// Error reporting
// =============================================================================

/// A misspelled rule fails the whole load and names the offending line.
#[test]
fn test_misspelled_rule_fails_with_line_number() {
    let text = "attribute: outline\nattrbute: label\n";
    let err = RuleSet::parse(text, &NoImports).unwrap_err();
    let FilterError::RuleLine { line_number, source } = err else {
        panic!("expected a rule line error");
    };
    assert_eq!(line_number, 2);
    assert!(matches!(*source, FilterError::UnrecognizedRule { .. }));
}

/// An invalid regex in a rule is rejected at load time, not at match
/// time.
#[test]
fn test_invalid_regex_is_rejected_at_load_time() {
    let err = RuleSet::parse("attribute-regex: [unclosed\n", &NoImports).unwrap_err();
    let FilterError::RuleLine { source, .. } = err else {
        panic!("expected a rule line error");
    };
    assert!(matches!(*source, FilterError::InvalidRegex { .. }));
}

// =============================================================================
// Imports
// =============================================================================

/// An import inlines the referenced file's rules for matching but saves
/// as the single `import:` reference.
#[test]
fn test_import_inlines_rules_but_saves_the_reference() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(
        temp_dir.path().join("web.filter"),
        "attribute: outline\nattribute-regex: data-.*\n",
    )
    .unwrap();
    let rules_path = temp_dir.path().join("ignore.filter");
    fs::write(&rules_path, "import: web.filter\nattribute: title\n").unwrap();

    let rules = load_rules_file(&rules_path).unwrap();
    assert_eq!(rules.len(), 2);
    assert_eq!(rules.save(), "import: web.filter\nattribute: title\n");

    let element = IdentifyingAttributes::of("div", "w[1]/div[1]");
    let outline = statecheck::diff::AttributeDifference::new(
        "outline",
        Some("1px".into()),
        Some("2px".into()),
    );
    assert!(rules.matches_attribute_difference(&element, &[], &outline));
}

/// A missing import target fails the load with the reference name.
#[test]
fn test_missing_import_target_fails_the_load() {
    let temp_dir = TempDir::new().unwrap();
    let rules_path = temp_dir.path().join("ignore.filter");
    fs::write(&rules_path, "import: nowhere.filter\n").unwrap();

    let err = load_rules_file(&rules_path).unwrap_err();
    let FilterError::RuleLine { source, .. } = err else {
        panic!("expected a rule line error");
    };
    let FilterError::Import { name, .. } = *source else {
        panic!("expected an import error");
    };
    assert_eq!(name, "nowhere.filter");
}

/// Self-referential imports stop at the depth limit instead of looping.
#[test]
fn test_circular_import_is_cut_off() {
    let temp_dir = TempDir::new().unwrap();
    let rules_path = temp_dir.path().join("loop.filter");
    fs::write(&rules_path, "import: loop.filter\n").unwrap();

    let err = load_rules_file(&rules_path).unwrap_err();
    fn innermost(err: FilterError) -> FilterError {
        match err {
            FilterError::RuleLine { source, .. } => innermost(*source),
            other => other,
        }
    }
    assert!(matches!(
        innermost(err),
        FilterError::ImportDepthExceeded { .. }
    ));
}

// =============================================================================
// Locator
// =============================================================================

/// A project without a rule file gets the empty rule set, which
/// suppresses nothing.
#[test]
fn test_project_without_rules_suppresses_nothing() {
    let temp_dir = TempDir::new().unwrap();
    let rules = RuleSetLocator::new(temp_dir.path()).load().unwrap();
    assert!(rules.is_empty());

    let element = IdentifyingAttributes::of("div", "w[1]/div[1]");
    assert!(!rules.matches_element(&element, &[]));
}

// =============================================================================
// Pruning a computed report
// =============================================================================

fn form_state(timestamp: &str, debug_text: &str) -> State {
    let mut builder = ElementTreeBuilder::new(
        IdentifyingAttributes::of("window", "w[1]"),
        Attributes::new(),
    );
    let root = builder.root();
    builder.add_child(
        root,
        IdentifyingAttributes::of("button", "w[1]/b[1]"),
        Attributes::new().with("label", "Save"),
    );
    let panel = builder.add_child(
        root,
        IdentifyingAttributes::of("div", "w[1]/div[1]").with("class", "debug-panel"),
        Attributes::new(),
    );
    builder.add_child(
        panel,
        IdentifyingAttributes::of("span", "w[1]/div[1]/span[1]"),
        Attributes::new()
            .with("text", debug_text)
            .with("timestamp", timestamp),
    );
    State::new(vec![builder.build()])
}

/// Marking a container class suppresses every difference beneath it,
/// including descendants that do not carry the class themselves.
#[test]
fn test_container_rule_suppresses_descendant_differences() {
    let expected = form_state("12:00:01", "42 queries");
    let actual = form_state("12:00:02", "57 queries");

    let difference = find_state_difference(&expected, &actual, &CheckConfig::default());
    assert!(difference.has_differences());

    let rules = RuleSet::parse("matcher: class=debug-panel\n", &NoImports).unwrap();
    let pruned = rules.prune(&difference);
    assert!(!pruned.has_differences());
    // The outcome per root pair is preserved even when fully suppressed.
    assert_eq!(pruned.size(), difference.size());
}

/// An attribute rule suppresses only that attribute; other differences of
/// the same element survive.
#[test]
fn test_attribute_rule_is_narrower_than_container_rule() {
    let expected = form_state("12:00:01", "42 queries");
    let actual = form_state("12:00:02", "57 queries");

    let difference = find_state_difference(&expected, &actual, &CheckConfig::default());
    let rules = RuleSet::parse("attribute: timestamp\n", &NoImports).unwrap();
    let pruned = rules.prune(&difference);

    assert!(pruned.has_differences());
    let elements = pruned.element_differences();
    assert_eq!(elements.len(), 1);
    assert_eq!(elements[0].attribute_differences.len(), 1);
    assert_eq!(elements[0].attribute_differences[0].key, "text");
}

/// The original report is untouched by pruning.
#[test]
fn test_pruning_does_not_mutate_the_original() {
    let expected = form_state("12:00:01", "42 queries");
    let actual = form_state("12:00:02", "57 queries");

    let difference = find_state_difference(&expected, &actual, &CheckConfig::default());
    let count_before = difference.difference_count();
    let rules = RuleSet::parse("all\n", &NoImports).unwrap();
    let pruned = rules.prune(&difference);

    assert!(!pruned.has_differences());
    assert_eq!(difference.difference_count(), count_before);
}
