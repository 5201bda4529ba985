//! CLI command definitions and handlers.

pub mod check;
pub mod lines;

use clap::{Parser, Subcommand};

/// Visa QA - Visa photo compliance checker
#[derive(Parser)]
#[command(name = "visa-qa")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Shared check arguments (paths, strategies, flags).
    #[command(flatten)]
    pub check: check::CheckArgs,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand)]
pub enum Commands {
    /// Check photos against the compliance rules
    Check(check::CheckArgs),
    /// Print the guide lines seeded from face detection
    Lines(lines::LinesArgs),
}

/// Process exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// Every rule passed for every photo.
    Success = 0,
    /// At least one rule failed.
    RulesFailed = 1,
    /// Usage or runtime error.
    Error = 2,
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> Self {
        Self::from(code as u8)
    }
}
