//! CLI module
//!
//! Provides the command-line interface:
//! - compare: diff two snapshot files, exit non-zero on differences
//! - rules check: validate a rule file

mod args;
mod commands;
mod errors;

pub use args::{Cli, Command, RulesCommand};
pub use commands::run_command;
pub use errors::{CliError, CliResult};

/// Parses arguments and runs the selected command.
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    run_command(cli.command)
}
