//! CLI argument definitions using clap
//!
//! Commands:
//! - statecheck compare --expected <path> --actual <path> [--rules <path>] [--config <path>]
//! - statecheck rules check <path>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// statecheck - A strict, deterministic structural regression-testing engine
#[derive(Parser, Debug)]
#[command(name = "statecheck")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compare an expected snapshot against an actual one
    Compare {
        /// Path to the expected (golden) snapshot file
        #[arg(long)]
        expected: PathBuf,

        /// Path to the actual snapshot file
        #[arg(long)]
        actual: PathBuf,

        /// Path to an ignore-rule file; defaults to the project rules
        /// under ./.statecheck/ignore.filter
        #[arg(long)]
        rules: Option<PathBuf>,

        /// Path to a JSON configuration file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Write the filtered difference report to this file
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// Inspect ignore-rule files
    Rules {
        #[command(subcommand)]
        command: RulesCommand,
    },
}

#[derive(Subcommand, Debug)]
pub enum RulesCommand {
    /// Parse a rule file and report how many rules it defines
    Check {
        /// Path to the rule file
        file: PathBuf,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
