//! CLI interface using clap
//!
//! Provides the command-line interface for DocGuard

mod commands;

pub use commands::audit;

use clap::Parser;
use std::path::PathBuf;

/// DocGuard - CI documentation drift auditor
#[derive(Parser, Debug)]
#[command(name = "docguard")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Code file to audit, or AUTO to analyze the current pull-request diff
    pub code_path: String,

    /// Documentation file to audit the code against
    pub doc_path: PathBuf,

    /// Emit one strict JSON document instead of the decorated report
    #[arg(long)]
    pub json: bool,

    /// Exit non-zero when drift is detected
    #[arg(
        long,
        value_name = "BOOL",
        default_value_t = true,
        action = clap::ArgAction::Set
    )]
    pub fail_on_drift: bool,

    /// Interactively apply the suggested fix to the documentation file
    #[arg(long)]
    pub fix: bool,

    /// Post the audit report as a pull-request comment
    #[arg(long)]
    pub comment: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
