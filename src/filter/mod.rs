//! Matcher/filter engine
//!
//! Decides whether differences should be suppressed from the final report,
//! and persists that decision set as human-editable text, one rule per
//! line. Rule sets are read-only after load and safe to share across
//! threads.

mod errors;
mod filters;
mod loader;
mod locator;
mod matcher;
mod ruleset;

pub use errors::{FilterError, FilterResult};
pub use filters::{
    AllMatchFilter, AttributeFilter, AttributeRegexFilter, ExcludeFilter, Filter, ImportedFilter,
    MatcherFilter, PixelDiffFilter, ValueRegexFilter,
};
pub use loader::{load_rule_line, NoImports, RuleSource};
pub use locator::{
    load_rules_file, FileRuleSource, RuleSetLocator, RULES_DIR_NAME, RULES_FILE_NAME,
};
pub use matcher::Matcher;
pub use ruleset::RuleSet;
