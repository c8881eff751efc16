//! Re-rendering of saved results

use std::path::Path;

use anyhow::{Context, Result};
use planfit_eval::report::{JsonReporter, ReportFormat, ReportOptions, generate_report};

/// Render a saved metrics.json file in each requested format
pub async fn render(file: &Path, formats: &[String], top_k: usize) -> Result<()> {
    let formats = formats
        .iter()
        .map(|f| ReportFormat::from_str(f).with_context(|| format!("Unknown report format '{}'", f)))
        .collect::<Result<Vec<_>>>()?;

    let content = tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("Failed to read results file: {:?}", file))?;
    let results = JsonReporter::parse(&content)
        .with_context(|| format!("Failed to parse results file: {:?}", file))?;

    let options = ReportOptions::default().with_top_k(top_k);
    for format in formats {
        println!("{}", generate_report(&results, format, &options)?);
    }

    Ok(())
}
