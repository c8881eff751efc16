//! Markdown report generation

use anyhow::Result;
use planfit_core::MetricResults;

use super::{ReportOptions, ci_label, fmt_interval, fmt_opt, fmt_pct};

/// Markdown report generator
pub struct MarkdownReporter;

impl MarkdownReporter {
    /// Generate a Markdown report
    pub fn generate(results: &MetricResults, options: &ReportOptions) -> Result<String> {
        let mut md = String::new();
        let summary = &results.summary;

        // Title
        md.push_str(&format!("# {}\n\n", options.title));

        // Overview
        md.push_str("## Overview\n\n");
        if let Some(at) = options.generated_at {
            md.push_str(&format!(
                "- **Generated**: {}\n",
                at.format("%Y-%m-%d %H:%M:%S UTC")
            ));
        }
        md.push_str(&format!("- **Domains**: {}\n", summary.domains.join(", ")));
        if !summary.source_files.is_empty() {
            md.push_str(&format!("- **Files analyzed**: {}\n", summary.source_files.len()));
        }
        md.push('\n');

        // Summary
        md.push_str("## Summary\n\n");
        md.push_str("| Metric | Value |\n|--------|-------|\n");
        md.push_str(&format!("| Conversations | {} |\n", summary.conversations));
        md.push_str(&format!(
            "| Success rate | {}/{} ({}) |\n",
            summary.successes,
            summary.conversations,
            fmt_pct(summary.success_rate)
        ));
        md.push_str(&format!(
            "| Mean plan length | {} |\n",
            fmt_opt(summary.mean_plan_length)
        ));
        md.push_str(&format!(
            "| Complexity-weighted pass@1 | {:.3} |\n\n",
            results.complexity_weighted_pass1
        ));

        // Per-tool PRF
        md.push_str("## Per-Tool Precision and Recall\n\n");
        md.push_str("| Tool | TP | FP | FN | Precision | Recall | F1 | Omission |\n");
        md.push_str("|------|----|----|----|-----------|--------|----|----------|\n");
        for row in &results.per_tool_prf.rows {
            md.push_str(&format!(
                "| `{}` | {} | {} | {} | {} | {} | {} | {} |\n",
                row.tool,
                row.tp,
                row.fp,
                row.fn_,
                fmt_opt(row.precision),
                fmt_opt(row.recall),
                fmt_opt(row.f1),
                fmt_opt(row.omission_rate)
            ));
        }
        md.push('\n');

        // Criticality
        md.push_str(&format!("## Top {} Critical Tools\n\n", options.top_k));
        if results.tool_criticality.is_empty() {
            md.push_str("No planned tools.\n\n");
        } else {
            md.push_str(&format!(
                "| Tool | TCI | P(success \\| correct) | P(success \\| incorrect) | n correct | n incorrect | {} |\n",
                ci_label(results.options.z)
            ));
            md.push_str("|------|-----|----------------------|------------------------|-----------|-------------|--------|\n");
            for row in results.tool_criticality.top_k(options.top_k) {
                md.push_str(&format!(
                    "| `{}` | {:.3} | {:.3} | {:.3} | {} | {} | {} |\n",
                    row.tool,
                    row.tci,
                    row.p_correct,
                    row.p_incorrect,
                    row.n_correct,
                    row.n_incorrect,
                    fmt_interval(row.ci_lower, row.ci_upper)
                ));
            }
            md.push('\n');
        }

        // Sequence compliance
        md.push_str("## Sequence Compliance\n\n");
        md.push_str("| Domain | Outcome | Conversations | Mean nPED | Median nPED | Mean PD |\n");
        md.push_str("|--------|---------|---------------|-----------|-------------|---------|\n");
        for group in results.sequence_compliance.summarize_by_domain_outcome() {
            md.push_str(&format!(
                "| {} | {} | {} | {} | {} | {} |\n",
                group.domain,
                if group.success { "success" } else { "failure" },
                group.conversations,
                fmt_opt(group.mean_nped),
                fmt_opt(group.median_nped),
                fmt_opt(group.mean_pd)
            ));
        }
        md.push('\n');

        // Buckets
        md.push_str("## Pass@1 by Complexity\n\n");
        md.push_str(&format!(
            "| Bucket | Conversations | Successes | Pass@1 | {} |\n",
            ci_label(results.options.z)
        ));
        md.push_str("|--------|---------------|-----------|--------|--------|\n");
        for row in &results.bucket_pass1 {
            md.push_str(&format!(
                "| {} | {} | {} | {} | {} |\n",
                row.bucket,
                row.conversations,
                row.successes,
                fmt_opt(row.pass_at_1),
                fmt_interval(row.ci_lower, row.ci_upper)
            ));
        }

        Ok(md)
    }
}
