//! CSV export
//!
//! Each result table is written to its own file with a fixed header. Undefined
//! values are written as empty cells.

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use planfit_core::MetricResults;

use super::fmt_pct;

pub const PER_TOOL_PRF_FILE: &str = "per_tool_prf.csv";
pub const TOOL_CRITICALITY_FILE: &str = "tool_criticality.csv";
pub const SEQUENCE_COMPLIANCE_FILE: &str = "sequence_compliance.csv";
pub const BUCKET_PASS1_FILE: &str = "bucket_pass1.csv";
pub const SUMMARY_FILE: &str = "summary.txt";

/// Quote a field when it contains a delimiter, quote, or line break
fn escape(field: &str) -> Cow<'_, str> {
    if field.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}

fn cell(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn push_row(out: &mut String, fields: &[String]) {
    let line: Vec<Cow<'_, str>> = fields.iter().map(|f| escape(f)).collect();
    out.push_str(&line.join(","));
    out.push('\n');
}

/// CSV exporter for metric results
pub struct CsvExporter;

impl CsvExporter {
    /// Per-tool precision / recall table
    pub fn per_tool_prf(results: &MetricResults) -> String {
        let mut out = String::from("tool,tp,fp,fn,precision,recall,f1,omission_rate\n");
        for row in &results.per_tool_prf.rows {
            push_row(
                &mut out,
                &[
                    row.tool.clone(),
                    row.tp.to_string(),
                    row.fp.to_string(),
                    row.fn_.to_string(),
                    cell(row.precision),
                    cell(row.recall),
                    cell(row.f1),
                    cell(row.omission_rate),
                ],
            );
        }
        out
    }

    /// Tool criticality table; interval columns only when intervals were computed
    pub fn tool_criticality(results: &MetricResults) -> String {
        let rows = &results.tool_criticality.rows;
        let with_ci = results.options.confidence_intervals;

        let mut out = String::from("tool,TCI,p_correct,p_incorrect,n_correct,n_incorrect");
        if with_ci {
            out.push_str(",TCI_ci_lower,TCI_ci_upper");
        }
        out.push('\n');

        for row in rows {
            let mut fields = vec![
                row.tool.clone(),
                row.tci.to_string(),
                row.p_correct.to_string(),
                row.p_incorrect.to_string(),
                row.n_correct.to_string(),
                row.n_incorrect.to_string(),
            ];
            if with_ci {
                fields.push(cell(row.ci_lower));
                fields.push(cell(row.ci_upper));
            }
            push_row(&mut out, &fields);
        }
        out
    }

    /// Per-conversation sequence compliance table
    pub fn sequence_compliance(results: &MetricResults) -> String {
        let mut out = String::from("task_id,trial_id,success,nPED,PD,expected_plan_length,domain\n");
        for row in &results.sequence_compliance.rows {
            push_row(
                &mut out,
                &[
                    row.task_id.clone(),
                    row.trial_id.clone(),
                    u8::from(row.success).to_string(),
                    row.nped.to_string(),
                    cell(row.pd),
                    row.expected_plan_length.to_string(),
                    row.domain.clone(),
                ],
            );
        }
        out
    }

    /// pass@1 per complexity bucket
    pub fn bucket_pass1(results: &MetricResults) -> String {
        let rows = &results.bucket_pass1;
        let with_ci = results.options.confidence_intervals;

        let mut out = String::from("bucket,pass@1");
        if with_ci {
            out.push_str(",pass@1_ci_lower,pass@1_ci_upper");
        }
        out.push('\n');

        for row in rows {
            let mut fields = vec![row.bucket.label().to_string(), cell(row.pass_at_1)];
            if with_ci {
                fields.push(cell(row.ci_lower));
                fields.push(cell(row.ci_upper));
            }
            push_row(&mut out, &fields);
        }
        out
    }

    /// Plain-text run summary
    pub fn summary(results: &MetricResults) -> String {
        let summary = &results.summary;
        let mut out = String::new();
        out.push_str(&format!(
            "Generated: {}\n",
            Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
        ));
        out.push_str(&format!("Files analyzed: {}\n", summary.source_files.len()));
        for file in &summary.source_files {
            out.push_str(&format!("  - {}\n", file));
        }
        out.push_str(&format!("Total conversations: {}\n", summary.conversations));
        out.push_str(&format!(
            "Success rate: {} ({}/{})\n",
            fmt_pct(summary.success_rate),
            summary.successes,
            summary.conversations
        ));
        out.push_str(&format!(
            "Complexity-weighted pass@1: {:.3}\n",
            results.complexity_weighted_pass1
        ));
        out.push_str(&format!("Domains: {}\n", summary.domains.join(", ")));
        out
    }

    /// Every table, each preceded by the name of the file it is exported to
    pub fn render_all(results: &MetricResults) -> Result<String> {
        let sections = [
            (PER_TOOL_PRF_FILE, Self::per_tool_prf(results)),
            (TOOL_CRITICALITY_FILE, Self::tool_criticality(results)),
            (SEQUENCE_COMPLIANCE_FILE, Self::sequence_compliance(results)),
            (BUCKET_PASS1_FILE, Self::bucket_pass1(results)),
        ];

        let mut out = String::new();
        for (i, (name, table)) in sections.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            out.push_str(&format!("# {}\n", name));
            out.push_str(table);
        }
        Ok(out)
    }

    /// Write every table and the summary into `dir`, returning the written paths
    pub fn write_all(results: &MetricResults, dir: &Path) -> Result<Vec<PathBuf>> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create output directory: {:?}", dir))?;

        let files = [
            (PER_TOOL_PRF_FILE, Self::per_tool_prf(results)),
            (TOOL_CRITICALITY_FILE, Self::tool_criticality(results)),
            (SEQUENCE_COMPLIANCE_FILE, Self::sequence_compliance(results)),
            (BUCKET_PASS1_FILE, Self::bucket_pass1(results)),
            (SUMMARY_FILE, Self::summary(results)),
        ];

        let mut written = Vec::with_capacity(files.len());
        for (name, content) in files {
            let path = dir.join(name);
            std::fs::write(&path, content)
                .with_context(|| format!("Failed to write {:?}", path))?;
            tracing::debug!("Wrote {}", path.display());
            written.push(path);
        }

        tracing::info!("Exported {} files to {}", written.len(), dir.display());
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::test_support::sample_results;

    #[test]
    fn test_escape() {
        assert_eq!(escape("plain"), "plain");
        assert_eq!(escape("a,b"), "\"a,b\"");
        assert_eq!(escape("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn test_per_tool_prf_csv() {
        let csv = CsvExporter::per_tool_prf(&sample_results());
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines[0], "tool,tp,fp,fn,precision,recall,f1,omission_rate");
        assert_eq!(lines[1], "get_order_details,1,1,1,0.5,0.5,0.5,0.5");
        // quoted name, undefined recall, F1 and omission rate
        assert_eq!(lines[2], "\"think, then act\",0,1,0,0,,,");
    }

    #[test]
    fn test_criticality_csv_has_interval_columns() {
        let csv = CsvExporter::tool_criticality(&sample_results());
        let header = csv.lines().next().unwrap();
        assert!(header.ends_with(",TCI_ci_lower,TCI_ci_upper"));
        assert!(csv.contains("\nget_order_details,1,1,0,1,1,"));
    }

    #[test]
    fn test_sequence_and_bucket_csv() {
        let results = sample_results();
        let sequence = CsvExporter::sequence_compliance(&results);
        assert_eq!(
            sequence.lines().next().unwrap(),
            "task_id,trial_id,success,nPED,PD,expected_plan_length,domain"
        );
        assert!(sequence.contains("\n1,,1,1,0,1,retail\n"));

        let buckets = CsvExporter::bucket_pass1(&results);
        let lines: Vec<&str> = buckets.lines().collect();
        assert_eq!(lines[0], "bucket,pass@1,pass@1_ci_lower,pass@1_ci_upper");
        assert!(lines[1].starts_with("simple,0.5,"));
        assert_eq!(lines[2], "medium,,,");
        assert_eq!(lines.len(), 4);
    }

    #[test]
    fn test_render_all_sections() {
        let csv = CsvExporter::render_all(&sample_results()).unwrap();
        assert!(csv.starts_with("# per_tool_prf.csv\n"));
        assert!(csv.contains("\n# bucket_pass1.csv\n"));
    }
}
