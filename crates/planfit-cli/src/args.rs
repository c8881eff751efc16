//! CLI argument definitions using clap
//!
//! - planfit analyze --input-dir DIR     # Compute metrics for simulation logs
//! - planfit report metrics.json         # Re-render saved results
//! - planfit schemas                     # List domain tool schemas

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Default benchmark checkout location
pub const DEFAULT_TAU2_PATH: &str = "tau2-bench";

#[derive(Parser)]
#[command(name = "planfit")]
#[command(about = "Planfit - tool-planning metrics for agent conversation logs")]
#[command(version)]
pub struct Cli {
    /// Enable verbose output
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compute metrics for a directory of simulation result files
    Analyze(AnalyzeArgs),

    /// Render a saved metrics.json file
    Report {
        /// Path to a metrics.json file
        file: PathBuf,

        /// Report formats (table, json, markdown, csv)
        #[arg(long, short, default_value = "table")]
        format: Vec<String>,

        /// Number of tools shown in the criticality ranking
        #[arg(long, default_value_t = 5)]
        top_k: usize,
    },

    /// List domains, their tools and significant argument keys
    Schemas {
        /// Root of the benchmark checkout
        #[arg(long, env = "PLANFIT_TAU2_PATH", default_value = DEFAULT_TAU2_PATH)]
        tau2_path: PathBuf,

        /// Only show this domain
        #[arg(long)]
        domain: Option<String>,
    },
}

#[derive(clap::Args, Clone, Debug, Default)]
pub struct AnalyzeArgs {
    /// Directory containing simulation result files
    #[arg(long)]
    pub input_dir: Option<PathBuf>,

    /// Directory to write CSV tables, summary and metrics.json to
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Root of the benchmark checkout
    #[arg(long)]
    pub tau2_path: Option<PathBuf>,

    /// Configuration file (TOML, YAML or JSON)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Report formats printed to stdout (table, json, markdown, csv)
    #[arg(long, short)]
    pub format: Vec<String>,

    /// Compute Wilson confidence intervals
    #[arg(long)]
    pub confidence_intervals: bool,

    /// z value for confidence intervals
    #[arg(long)]
    pub z: Option<f64>,

    /// Also analyze each domain separately
    #[arg(long)]
    pub per_domain: bool,

    /// Number of tools shown in the criticality ranking
    #[arg(long)]
    pub top_k: Option<usize>,
}
