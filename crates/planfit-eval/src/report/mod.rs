//! Report generation for metric results
//!
//! Renders a `MetricResults` bundle as a terminal table, JSON, Markdown, or
//! CSV tables. Undefined values render as `n/a` in text reports, `null` in
//! JSON and an empty cell in CSV.

mod csv;
mod json;
mod markdown;

pub use csv::CsvExporter;
pub use json::JsonReporter;
pub use markdown::MarkdownReporter;

use anyhow::Result;
use chrono::{DateTime, Utc};
use planfit_core::{MetricResults, Z_95};

/// Report format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Table,
    Json,
    Markdown,
    Csv,
}

impl ReportFormat {
    /// Parse from string
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "table" => Some(ReportFormat::Table),
            "json" => Some(ReportFormat::Json),
            "markdown" | "md" => Some(ReportFormat::Markdown),
            "csv" => Some(ReportFormat::Csv),
            _ => None,
        }
    }
}

/// Presentation options shared by every format
#[derive(Debug, Clone)]
pub struct ReportOptions {
    /// Rows of the criticality ranking
    pub top_k: usize,
    /// Heading shown above the report
    pub title: String,
    /// Generation time shown in text reports
    pub generated_at: Option<DateTime<Utc>>,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            top_k: 5,
            title: "Planfit Metrics".to_string(),
            generated_at: None,
        }
    }
}

impl ReportOptions {
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Stamp the report with the current time
    pub fn timestamped(mut self) -> Self {
        self.generated_at = Some(Utc::now());
        self
    }
}

/// Generate a report in the specified format
pub fn generate_report(
    results: &MetricResults,
    format: ReportFormat,
    options: &ReportOptions,
) -> Result<String> {
    match format {
        ReportFormat::Json => JsonReporter::generate(results),
        ReportFormat::Markdown => MarkdownReporter::generate(results, options),
        ReportFormat::Csv => CsvExporter::render_all(results),
        ReportFormat::Table => generate_table(results, options),
    }
}

/// Format an optional value, `n/a` when undefined
pub(crate) fn fmt_opt(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{:.3}", v))
}

/// Format an optional rate as a percentage, `n/a` when undefined
pub(crate) fn fmt_pct(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{:.1}%", v * 100.0))
}

/// Format an optional interval, empty when undefined
pub(crate) fn fmt_interval(lower: Option<f64>, upper: Option<f64>) -> String {
    match (lower, upper) {
        (Some(lo), Some(hi)) => format!("[{:.3}, {:.3}]", lo, hi),
        _ => String::new(),
    }
}

/// Column label for intervals computed with `z`
pub(crate) fn ci_label(z: f64) -> String {
    if (z - Z_95).abs() < 1e-9 {
        "95% CI".to_string()
    } else {
        format!("CI (z={})", z)
    }
}

fn truncate(name: &str, width: usize) -> String {
    if name.chars().count() > width {
        let head: String = name.chars().take(width.saturating_sub(3)).collect();
        format!("{}...", head)
    } else {
        name.to_string()
    }
}

/// Generate a simple table report for terminal output
fn generate_table(results: &MetricResults, options: &ReportOptions) -> Result<String> {
    let mut output = String::new();
    let summary = &results.summary;

    // Header
    output.push_str(&format!("\n{:=<78}\n", format!("= {} ", options.title)));
    if let Some(at) = options.generated_at {
        output.push_str(&format!("Generated: {}\n", at.format("%Y-%m-%d %H:%M:%S UTC")));
    }
    output.push_str(&format!("{:=<78}\n\n", ""));

    // Summary
    output.push_str("SUMMARY\n");
    output.push_str(&format!("{:-<78}\n", ""));
    if !summary.source_files.is_empty() {
        output.push_str(&format!("Files analyzed: {}\n", summary.source_files.len()));
    }
    output.push_str(&format!("Conversations: {}\n", summary.conversations));
    output.push_str(&format!(
        "Success rate: {} ({}/{})\n",
        fmt_pct(summary.success_rate),
        summary.successes,
        summary.conversations
    ));
    output.push_str(&format!(
        "Mean plan length: {}\n",
        summary
            .mean_plan_length
            .map_or_else(|| "n/a".to_string(), |v| format!("{:.2}", v))
    ));
    output.push_str(&format!("Domains: {}\n", summary.domains.join(", ")));
    output.push_str(&format!(
        "Complexity-weighted pass@1: {:.3}\n\n",
        results.complexity_weighted_pass1
    ));

    // Per-tool PRF
    output.push_str("PER-TOOL PRECISION / RECALL\n");
    output.push_str(&format!("{:-<78}\n", ""));
    output.push_str(&format!(
        "{:<30} {:>5} {:>5} {:>5} {:>7} {:>7} {:>7} {:>7}\n",
        "Tool", "TP", "FP", "FN", "P", "R", "F1", "Omit"
    ));
    output.push_str(&format!("{:-<78}\n", ""));
    for row in &results.per_tool_prf.rows {
        output.push_str(&format!(
            "{:<30} {:>5} {:>5} {:>5} {:>7} {:>7} {:>7} {:>7}\n",
            truncate(&row.tool, 30),
            row.tp,
            row.fp,
            row.fn_,
            fmt_opt(row.precision),
            fmt_opt(row.recall),
            fmt_opt(row.f1),
            fmt_opt(row.omission_rate)
        ));
    }
    output.push_str(&format!("{:-<78}\n\n", ""));

    // Criticality ranking
    output.push_str(&format!("TOP {} CRITICAL TOOLS (TCI)\n", options.top_k));
    output.push_str(&format!("{:-<78}\n", ""));
    output.push_str(&format!(
        "{:<30} {:>7} {:>8} {:>8} {:>5} {:>5}  {}\n",
        "Tool", "TCI", "P(ok)", "P(miss)", "n_ok", "n_miss", "CI"
    ));
    output.push_str(&format!("{:-<78}\n", ""));
    for row in results.tool_criticality.top_k(options.top_k) {
        output.push_str(&format!(
            "{:<30} {:>7.3} {:>8.3} {:>8.3} {:>5} {:>5}  {}\n",
            truncate(&row.tool, 30),
            row.tci,
            row.p_correct,
            row.p_incorrect,
            row.n_correct,
            row.n_incorrect,
            fmt_interval(row.ci_lower, row.ci_upper)
        ));
    }
    output.push_str(&format!("{:-<78}\n\n", ""));

    // Sequence compliance
    output.push_str("SEQUENCE COMPLIANCE\n");
    output.push_str(&format!("{:-<78}\n", ""));
    output.push_str(&format!(
        "{:<20} {:>8} {:>8} {:>10} {:>12} {:>10}\n",
        "Domain", "Outcome", "Convs", "Mean nPED", "Median nPED", "Mean PD"
    ));
    output.push_str(&format!("{:-<78}\n", ""));
    for group in results.sequence_compliance.summarize_by_domain_outcome() {
        output.push_str(&format!(
            "{:<20} {:>8} {:>8} {:>10} {:>12} {:>10}\n",
            truncate(&group.domain, 20),
            if group.success { "success" } else { "failure" },
            group.conversations,
            fmt_opt(group.mean_nped),
            fmt_opt(group.median_nped),
            fmt_opt(group.mean_pd)
        ));
    }
    output.push_str(&format!("{:-<78}\n\n", ""));

    // Buckets
    output.push_str("PASS@1 BY COMPLEXITY\n");
    output.push_str(&format!("{:-<78}\n", ""));
    output.push_str(&format!(
        "{:<10} {:>8} {:>10} {:>10}  {}\n",
        "Bucket", "Convs", "Successes", "Pass@1", "CI"
    ));
    output.push_str(&format!("{:-<78}\n", ""));
    for row in &results.bucket_pass1 {
        output.push_str(&format!(
            "{:<10} {:>8} {:>10} {:>10}  {}\n",
            row.bucket.label(),
            row.conversations,
            row.successes,
            fmt_opt(row.pass_at_1),
            fmt_interval(row.ci_lower, row.ci_upper)
        ));
    }

    output.push_str(&format!("{:=<78}\n", ""));

    Ok(output)
}

#[cfg(test)]
pub(crate) mod test_support {
    use planfit_core::{
        ConversationRecord, EngineOptions, MetricResults, MetricsEngine, StaticSchemaCatalog,
        ToolInvocation,
    };

    /// A small result bundle with defined and undefined values
    pub fn sample_results() -> MetricResults {
        let catalog = StaticSchemaCatalog::new()
            .with_tool("retail", "get_order_details", ["order_id"]);
        let details = |o: &str| ToolInvocation::new("get_order_details").with_arg("order_id", o);

        let mut first = ConversationRecord::new("c1", "1", "retail", true)
            .with_expected(vec![details("#1")])
            .with_executed(vec![details("#1"), ToolInvocation::new("think, then act")]);
        first.source_file = Some("20250801_retail_run.json".to_string());
        let second = ConversationRecord::new("c2", "2", "retail", false)
            .with_expected(vec![details("#2")])
            .with_executed(vec![details("#3")])
            .with_trial("1");

        let options = EngineOptions::default().with_confidence_intervals(true);
        MetricsEngine::new(&catalog, options).analyze(&[first, second])
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::sample_results;
    use super::*;

    #[test]
    fn test_format_parsing() {
        assert_eq!(ReportFormat::from_str("TABLE"), Some(ReportFormat::Table));
        assert_eq!(ReportFormat::from_str("md"), Some(ReportFormat::Markdown));
        assert_eq!(ReportFormat::from_str("csv"), Some(ReportFormat::Csv));
        assert_eq!(ReportFormat::from_str("html"), None);
    }

    #[test]
    fn test_table_report() {
        let results = sample_results();
        let options = ReportOptions::default().with_top_k(3).timestamped();
        let table = generate_report(&results, ReportFormat::Table, &options).unwrap();

        assert!(table.contains("= Planfit Metrics"));
        assert!(table.contains("Generated: "));
        assert!(table.contains("Conversations: 2"));
        assert!(table.contains("get_order_details"));
        assert!(table.contains("TOP 3 CRITICAL TOOLS"));
        assert!(table.contains("simple"));
        // the unplanned tool has no recall
        assert!(table.contains("n/a"));
    }

    #[test]
    fn test_formatting_helpers() {
        assert_eq!(fmt_opt(None), "n/a");
        assert_eq!(fmt_opt(Some(0.5)), "0.500");
        assert_eq!(fmt_pct(Some(0.25)), "25.0%");
        assert_eq!(fmt_interval(Some(0.1), None), "");
        assert_eq!(ci_label(1.96), "95% CI");
        assert_eq!(ci_label(2.58), "CI (z=2.58)");
        assert_eq!(truncate("abcdef", 5), "ab...");
        assert_eq!(truncate("abc", 5), "abc");
    }
}
