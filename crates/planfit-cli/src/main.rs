//! Planfit CLI application
//!
//! Computes tool-planning metrics for benchmark simulation logs.
//!
//! # Installation
//!
//! ```bash
//! cargo install --path crates/planfit-cli
//! ```
//!
//! # Commands
//!
//! - `planfit analyze --input-dir results/` prepares every simulation file in
//!   the directory, computes all metrics and prints the requested reports.
//!   With `--output-dir` the CSV tables, a summary and `metrics.json` are
//!   written as well.
//! - `planfit report metrics.json` re-renders saved results.
//! - `planfit schemas` lists the tools and significant argument keys of every
//!   benchmark domain.

mod args;
mod commands;
mod router;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use args::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set RUST_LOG=debug for verbose logging, or pass --verbose
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    router::route(cli).await
}
