//! JSON report generation

use anyhow::Result;
use planfit_core::MetricResults;

/// JSON report generator
pub struct JsonReporter;

impl JsonReporter {
    /// Generate a JSON report
    pub fn generate(results: &MetricResults) -> Result<String> {
        let json = serde_json::to_string_pretty(results)?;
        Ok(json)
    }

    /// Parse a previously generated report
    pub fn parse(json: &str) -> Result<MetricResults> {
        let results = serde_json::from_str(json)?;
        Ok(results)
    }
}
