//! Rule line grammar
//!
//! Each filter variant owns one textual form; loading tries the variant
//! recognizers in a fixed priority order and commits to the first match.
//! `load(save(f))` is behaviorally equivalent to `f`, and `save(load(line))`
//! reproduces `line` byte for byte for every well-formed line, deprecated
//! syntaxes included.

use super::errors::{FilterError, FilterResult};
use super::filters::{
    AllMatchFilter, AttributeFilter, AttributeRegexFilter, ExcludeFilter, Filter, ImportedFilter,
    MatcherFilter, PixelDiffFilter, ValueRegexFilter,
};
use super::matcher::{Matcher, ALL_LINE};

pub const MATCHER_PREFIX: &str = "matcher: ";
pub const ATTRIBUTE_PREFIX: &str = "attribute: ";
/// Deprecated single-attribute syntax, still accepted.
pub const LEGACY_ATTRIBUTE_PREFIX: &str = "attribute=";
pub const ATTRIBUTE_REGEX_PREFIX: &str = "attribute-regex: ";
/// Deprecated attribute-regex syntax, still accepted.
pub const LEGACY_ATTRIBUTE_REGEX_PREFIX: &str = "attribute-regex=";
pub const PIXEL_DIFF_PREFIX: &str = "pixel-diff: ";
pub const VALUE_REGEX_PREFIX: &str = "value-regex: ";
pub const INSERTED_LINE: &str = "change=inserted";
pub const DELETED_LINE: &str = "change=deleted";
pub const EXCLUDE_PREFIX: &str = "exclude(";
pub const EXCLUDE_SUFFIX: &str = ")";
/// Separates filters wrapped by one exclude rule.
pub const EXCLUDE_SEPARATOR: &str = "; ";
pub const IMPORT_PREFIX: &str = "import: ";
/// Separates the chained parts of a `matcher:` rule.
pub const CHAIN_SEPARATOR: &str = ", ";

/// Imports may nest, but not unboundedly.
const MAX_IMPORT_DEPTH: usize = 16;

/// Resolves `import:` references to the referenced rule file's text.
pub trait RuleSource {
    fn resolve(&self, name: &str) -> Result<String, String>;
}

/// A source that refuses every import.
pub struct NoImports;

impl RuleSource for NoImports {
    fn resolve(&self, _name: &str) -> Result<String, String> {
        Err("imports are not available in this context".to_string())
    }
}

pub(super) struct LoadContext<'a> {
    pub source: &'a dyn RuleSource,
    pub depth: usize,
}

/// Loads one rule line, trying variant loaders in declared priority order:
/// exclude wrapping chainables first, then the current forms, then the
/// deprecated compatibility syntaxes.
pub fn load_rule_line(line: &str, source: &dyn RuleSource) -> FilterResult<Filter> {
    let mut context = LoadContext { source, depth: 0 };
    load_line(line, &mut context)
}

pub(super) fn load_line(line: &str, context: &mut LoadContext<'_>) -> FilterResult<Filter> {
    if let Some(result) = try_exclude(line, context) {
        return result;
    }
    if let Some(result) = try_matcher(line, context) {
        return result;
    }
    if line == ALL_LINE {
        return Ok(Filter::Matcher(MatcherFilter::new(Matcher::Always)));
    }
    if let Some(result) = try_chainable(line) {
        return result;
    }
    if let Some(name) = line.strip_prefix(IMPORT_PREFIX) {
        return load_import(name, context);
    }
    // Compatibility: older rule files write bare matcher expressions
    // without the `matcher: ` prefix.
    if let Ok(matcher) = Matcher::load(line) {
        return Ok(Filter::Matcher(MatcherFilter::bare(matcher)));
    }
    Err(FilterError::UnrecognizedRule {
        line: line.to_string(),
    })
}

/// The chainable subset: every variant allowed after a `matcher:` chain
/// separator or inside an `exclude(...)`.
fn try_chainable(line: &str) -> Option<FilterResult<Filter>> {
    if let Some(key) = line.strip_prefix(ATTRIBUTE_REGEX_PREFIX) {
        return Some(AttributeRegexFilter::new(key).map(Filter::AttributeRegex));
    }
    if let Some(key) = line.strip_prefix(LEGACY_ATTRIBUTE_REGEX_PREFIX) {
        return Some(AttributeRegexFilter::legacy(key).map(Filter::AttributeRegex));
    }
    if let Some(key) = line.strip_prefix(ATTRIBUTE_PREFIX) {
        return Some(Ok(Filter::Attribute(AttributeFilter::new(key))));
    }
    if let Some(key) = line.strip_prefix(LEGACY_ATTRIBUTE_PREFIX) {
        return Some(Ok(Filter::Attribute(AttributeFilter::legacy(key))));
    }
    if let Some(value) = line.strip_prefix(PIXEL_DIFF_PREFIX) {
        return Some(PixelDiffFilter::new(value).map(Filter::PixelDiff));
    }
    if let Some(pattern) = line.strip_prefix(VALUE_REGEX_PREFIX) {
        return Some(ValueRegexFilter::new(pattern).map(Filter::ValueRegex));
    }
    if line == INSERTED_LINE {
        return Some(Ok(Filter::Inserted));
    }
    if line == DELETED_LINE {
        return Some(Ok(Filter::Deleted));
    }
    None
}

fn try_exclude(line: &str, context: &mut LoadContext<'_>) -> Option<FilterResult<Filter>> {
    let inner = line
        .strip_prefix(EXCLUDE_PREFIX)?
        .strip_suffix(EXCLUDE_SUFFIX)?;
    Some(load_exclude(inner, context))
}

fn load_exclude(inner: &str, context: &mut LoadContext<'_>) -> FilterResult<Filter> {
    let mut filters = Vec::new();
    for part in inner.split(EXCLUDE_SEPARATOR) {
        filters.push(load_line(part, context)?);
    }
    Ok(Filter::Exclude(ExcludeFilter::new(filters)))
}

fn try_matcher(line: &str, context: &mut LoadContext<'_>) -> Option<FilterResult<Filter>> {
    let expression = line.strip_prefix(MATCHER_PREFIX)?;
    Some(load_matcher(expression, context))
}

fn load_matcher(expression: &str, context: &mut LoadContext<'_>) -> FilterResult<Filter> {
    let mut parts = expression.split(CHAIN_SEPARATOR);
    // The first part is always the matcher expression itself.
    let matcher = Matcher::load(parts.next().unwrap_or_default())?;
    let matcher_filter = Filter::Matcher(MatcherFilter::new(matcher));

    let mut chained = Vec::new();
    for part in parts {
        match try_chainable(part).or_else(|| try_exclude(part, context)) {
            Some(filter) => chained.push(filter?),
            None => {
                return Err(FilterError::NoMatcherFound(part.to_string()));
            }
        }
    }

    if chained.is_empty() {
        Ok(matcher_filter)
    } else {
        let mut filters = vec![matcher_filter];
        filters.append(&mut chained);
        Ok(Filter::AllMatch(AllMatchFilter::new(filters)))
    }
}

fn load_import(name: &str, context: &mut LoadContext<'_>) -> FilterResult<Filter> {
    if context.depth >= MAX_IMPORT_DEPTH {
        return Err(FilterError::ImportDepthExceeded {
            name: name.to_string(),
        });
    }
    let text = context
        .source
        .resolve(name)
        .map_err(|message| FilterError::Import {
            name: name.to_string(),
            message,
        })?;

    context.depth += 1;
    let mut rules = Vec::new();
    for (number, line) in text.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        match load_line(trimmed, context) {
            Ok(filter) => rules.push(filter),
            Err(source) => {
                context.depth -= 1;
                return Err(FilterError::RuleLine {
                    line_number: number + 1,
                    source: Box::new(source),
                });
            }
        }
    }
    context.depth -= 1;

    Ok(Filter::Import(ImportedFilter {
        name: name.to_string(),
        rules,
    }))
}

impl Filter {
    /// Serializes this filter to its one-line textual form.
    ///
    /// A matcher filter around the always-matching catch-all emits the
    /// catch-all's own canonical line instead of the `matcher:` form.
    pub fn save(&self) -> String {
        match self {
            Filter::Matcher(filter) => match filter.matcher {
                Matcher::Always => ALL_LINE.to_string(),
                _ if filter.bare => filter.matcher.save(),
                _ => format!("{}{}", MATCHER_PREFIX, filter.matcher.save()),
            },
            Filter::Attribute(filter) => {
                if filter.legacy {
                    format!("{}{}", LEGACY_ATTRIBUTE_PREFIX, filter.key)
                } else {
                    format!("{}{}", ATTRIBUTE_PREFIX, filter.key)
                }
            }
            Filter::AttributeRegex(filter) => {
                if filter.legacy {
                    format!("{}{}", LEGACY_ATTRIBUTE_REGEX_PREFIX, filter.pattern)
                } else {
                    format!("{}{}", ATTRIBUTE_REGEX_PREFIX, filter.pattern)
                }
            }
            Filter::PixelDiff(filter) => format!("{}{}", PIXEL_DIFF_PREFIX, filter.raw),
            Filter::ValueRegex(filter) => format!("{}{}", VALUE_REGEX_PREFIX, filter.pattern),
            Filter::Inserted => INSERTED_LINE.to_string(),
            Filter::Deleted => DELETED_LINE.to_string(),
            Filter::Exclude(exclude) => {
                let inner: Vec<String> = exclude.filters.iter().map(Filter::save).collect();
                format!(
                    "{}{}{}",
                    EXCLUDE_PREFIX,
                    inner.join(EXCLUDE_SEPARATOR),
                    EXCLUDE_SUFFIX
                )
            }
            Filter::Import(import) => format!("{}{}", IMPORT_PREFIX, import.name),
            Filter::AllMatch(chain) => {
                let parts: Vec<String> = chain
                    .filters
                    .iter()
                    .enumerate()
                    .map(|(index, filter)| match filter {
                        // The chain's leading matcher keeps its prefix even
                        // for the catch-all; `all` is canonical only as a
                        // standalone line.
                        Filter::Matcher(leading) if index == 0 => {
                            format!("{}{}", MATCHER_PREFIX, leading.matcher.save())
                        }
                        other => other.save(),
                    })
                    .collect();
                parts.join(CHAIN_SEPARATOR)
            }
        }
    }
}
