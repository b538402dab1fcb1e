//! Rule file location
//!
//! Finds the project's ignore-rule file and loads it. A missing or absent
//! rule file is "no rules", not an error; a present but malformed file
//! fails the load.

use std::fs;
use std::path::{Path, PathBuf};

use super::errors::{FilterError, FilterResult};
use super::loader::RuleSource;
use super::ruleset::RuleSet;

/// Directory holding project configuration and rules.
pub const RULES_DIR_NAME: &str = ".statecheck";
/// Default ignore-rule file name.
pub const RULES_FILE_NAME: &str = "ignore.filter";

/// Resolves `import:` references against a base directory.
pub struct FileRuleSource {
    base: PathBuf,
}

impl FileRuleSource {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }
}

impl RuleSource for FileRuleSource {
    fn resolve(&self, name: &str) -> Result<String, String> {
        let path = self.base.join(name);
        fs::read_to_string(&path).map_err(|e| format!("{}: {}", path.display(), e))
    }
}

/// Locates and loads the ignore rules of one project.
pub struct RuleSetLocator {
    project_root: PathBuf,
}

impl RuleSetLocator {
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
        }
    }

    /// Path of the project's rule file, whether or not it exists.
    pub fn rules_file(&self) -> PathBuf {
        self.project_root.join(RULES_DIR_NAME).join(RULES_FILE_NAME)
    }

    /// Loads the project rules; an absent file yields the empty rule set.
    pub fn load(&self) -> FilterResult<RuleSet> {
        let path = self.rules_file();
        if !path.exists() {
            return Ok(RuleSet::empty());
        }
        load_rules_file(&path)
    }
}

/// Loads an explicitly named rule file, which must exist. Imports resolve
/// relative to the file's directory.
pub fn load_rules_file(path: &Path) -> FilterResult<RuleSet> {
    let text = fs::read_to_string(path).map_err(|e| FilterError::Io {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    let base = path.parent().unwrap_or_else(|| Path::new("."));
    let source = FileRuleSource::new(base);
    RuleSet::parse(&text, &source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_rule_file_is_empty_rule_set() {
        let temp_dir = TempDir::new().unwrap();
        let locator = RuleSetLocator::new(temp_dir.path());
        let rules = locator.load().unwrap();
        assert!(rules.is_empty());
    }

    #[test]
    fn test_present_rule_file_is_loaded() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join(RULES_DIR_NAME);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(RULES_FILE_NAME), "attribute: outline\n").unwrap();

        let rules = RuleSetLocator::new(temp_dir.path()).load().unwrap();
        assert_eq!(rules.len(), 1);
    }

    #[test]
    fn test_malformed_rule_file_fails_the_load() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join(RULES_DIR_NAME);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(RULES_FILE_NAME), "gibberish\n").unwrap();

        let err = RuleSetLocator::new(temp_dir.path()).load().unwrap_err();
        assert!(matches!(err, FilterError::RuleLine { .. }));
    }

    #[test]
    fn test_imports_resolve_relative_to_the_rule_file() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join(RULES_DIR_NAME);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("web.filter"), "attribute: outline\nchange=inserted\n").unwrap();
        fs::write(dir.join(RULES_FILE_NAME), "import: web.filter\n").unwrap();

        let rules = RuleSetLocator::new(temp_dir.path()).load().unwrap();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules.save(), "import: web.filter\n");

        let difference = crate::diff::AttributeDifference::new(
            "outline",
            Some("1px".into()),
            Some("2px".into()),
        );
        let element = crate::element::IdentifyingAttributes::of("div", "w[1]/div[1]");
        assert!(rules.matches_attribute_difference(&element, &[], &difference));
    }
}
