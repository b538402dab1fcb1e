//! CLI command implementations

use std::path::{Path, PathBuf};

use crate::config::CheckConfig;
use crate::diff::find_state_difference;
use crate::filter::{load_rules_file, RuleSet, RuleSetLocator};
use crate::observability::{Logger, Severity};
use crate::persist;

use super::args::{Command, RulesCommand};
use super::errors::CliResult;

/// Dispatches one parsed command.
pub fn run_command(command: Command) -> CliResult<()> {
    match command {
        Command::Compare {
            expected,
            actual,
            rules,
            config,
            report,
        } => compare(&expected, &actual, rules, config, report),
        Command::Rules {
            command: RulesCommand::Check { file },
        } => check_rules(&file),
    }
}

fn compare(
    expected_path: &Path,
    actual_path: &Path,
    rules_path: Option<PathBuf>,
    config_path: Option<PathBuf>,
    report_path: Option<PathBuf>,
) -> CliResult<()> {
    let config = match config_path {
        Some(path) => CheckConfig::from_file(&path)?,
        None => CheckConfig::default(),
    };
    let rules = load_rules(rules_path)?;

    let expected = persist::load_state(expected_path)?;
    let actual = persist::load_state(actual_path)?;

    let raw = find_state_difference(&expected, &actual, &config);
    let filtered = rules.prune(&raw);

    if let Some(path) = report_path {
        persist::save_report(&path, &filtered)?;
    }

    let remaining = filtered.difference_count();
    Logger::log(
        Severity::Info,
        "compare_finished",
        &[
            ("filtered", &remaining.to_string()),
            ("raw", &raw.difference_count().to_string()),
            ("root_pairs", &filtered.size().to_string()),
        ],
    );

    if remaining > 0 {
        for difference in filtered.element_differences() {
            println!("{}", difference);
        }
        return Err(super::errors::CliError::DifferencesFound(remaining));
    }

    println!("no differences");
    Ok(())
}

fn load_rules(rules_path: Option<PathBuf>) -> CliResult<RuleSet> {
    match rules_path {
        // An explicitly named rule file must exist and parse.
        Some(path) => Ok(load_rules_file(&path)?),
        // The project rule file is optional.
        None => {
            let root = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
            Ok(RuleSetLocator::new(root).load()?)
        }
    }
}

fn check_rules(file: &Path) -> CliResult<()> {
    let rules = load_rules_file(file)?;
    println!("{}: {} rule(s)", file.display(), rules.len());
    Ok(())
}
