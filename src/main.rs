//! DocGuard - CI documentation drift auditor
//!
//! Compares documentation against code (or a pull-request diff) using a
//! hosted model, reports the verdict, and fails the build on drift.

use docguard::cli::{audit, Cli};
use std::process::ExitCode;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> ExitCode {
    // Parse CLI arguments
    let cli = Cli::parse_args();

    // Setup logging; diagnostics go to stderr so stdout stays
    // machine-readable under --json
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    ExitCode::from(audit(&cli).await)
}
