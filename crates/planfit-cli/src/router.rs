//! Command routing logic for CLI

use anyhow::Result;

use crate::args::{Cli, Commands};
use crate::commands;

/// Route CLI commands to their respective handlers
pub async fn route(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Analyze(args) => commands::analyze::run(args).await,
        Commands::Report {
            file,
            format,
            top_k,
        } => commands::report::render(&file, &format, top_k).await,
        Commands::Schemas { tau2_path, domain } => {
            commands::schemas::list(&tau2_path, domain.as_deref()).await
        }
    }
}
