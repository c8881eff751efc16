//! Metric computation for a directory of simulation logs

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use planfit_core::{MetricResults, MetricsEngine};
use planfit_eval::report::{CsvExporter, JsonReporter, ReportFormat, ReportOptions, generate_report};
use planfit_eval::{AnalysisConfig, ConfigLoader, DomainTaskLoader, SimulationPreparer, discover};

use crate::args::AnalyzeArgs;

/// Output of one analysis run
struct Analysis {
    overall: MetricResults,
    by_domain: BTreeMap<String, MetricResults>,
}

/// Run an analysis and print the requested reports
pub async fn run(args: AnalyzeArgs) -> Result<()> {
    let config = resolve_config(&args)?;
    execute(config).await
}

async fn execute(config: AnalysisConfig) -> Result<()> {
    let formats = config.report_formats()?;

    let input_dir = config
        .input_dir
        .clone()
        .context("No input directory given (use --input-dir or PLANFIT_INPUT_DIR)")?;
    let files = discover(&input_dir)?;
    if files.is_empty() {
        anyhow::bail!("No JSON result files found in {}", input_dir.display());
    }
    tracing::info!("Found {} result files in {}", files.len(), input_dir.display());

    let pipeline_config = config.clone();
    let analysis = tokio::task::spawn_blocking(move || analyze_files(&pipeline_config, &files))
        .await
        .context("Analysis task failed")??;

    let Some(analysis) = analysis else {
        println!("No conversations could be prepared from {}", input_dir.display());
        return Ok(());
    };

    let options = ReportOptions::default()
        .with_top_k(config.top_k)
        .timestamped();
    for format in &formats {
        println!("{}", generate_report(&analysis.overall, *format, &options)?);
    }
    for (domain, results) in &analysis.by_domain {
        let domain_options = options
            .clone()
            .with_title(format!("Planfit Metrics: {}", domain));
        for format in formats.iter().filter(|f| **f != ReportFormat::Csv) {
            println!("{}", generate_report(results, *format, &domain_options)?);
        }
    }

    if let Some(output_dir) = &config.output_dir {
        export(&analysis, output_dir).await?;
        println!("\nResults written to {}", output_dir.display());
    }

    println!(
        "\nAnalysis complete: {} conversations, complexity-weighted pass@1 {:.3}",
        analysis.overall.summary.conversations, analysis.overall.complexity_weighted_pass1
    );

    Ok(())
}

/// Load the layered configuration and apply command-line overrides
fn resolve_config(args: &AnalyzeArgs) -> Result<AnalysisConfig> {
    let config = config_loader(args).with_env().load()?;
    apply_args(config, args)
}

fn config_loader(args: &AnalyzeArgs) -> ConfigLoader {
    let loader = ConfigLoader::new().with_defaults();
    match &args.config {
        Some(path) => loader.with_file(path),
        None => loader,
    }
}

fn apply_args(mut config: AnalysisConfig, args: &AnalyzeArgs) -> Result<AnalysisConfig> {
    if let Some(dir) = &args.input_dir {
        config = config.with_input_dir(dir);
    }
    if let Some(dir) = &args.output_dir {
        config = config.with_output_dir(dir);
    }
    if let Some(path) = &args.tau2_path {
        config = config.with_tau2_path(path);
    }
    if !args.format.is_empty() {
        config = config.with_formats(args.format.clone());
    }
    if args.confidence_intervals {
        config = config.with_confidence_intervals();
    }
    if let Some(z) = args.z {
        config = config.with_z(z);
    }
    if args.per_domain {
        config = config.per_domain();
    }
    if let Some(top_k) = args.top_k {
        config.top_k = top_k;
    }

    config.validate()?;
    Ok(config)
}

/// Load tasks, prepare records and compute metrics; `None` for an empty dataset
fn analyze_files(config: &AnalysisConfig, files: &[PathBuf]) -> Result<Option<Analysis>> {
    let tasks = DomainTaskLoader::new(&config.tau2_path).load_all();
    if tasks.total_tasks() == 0 {
        tracing::warn!(
            "No domain tasks loaded from {}; every expected plan will be empty",
            config.tau2_path.display()
        );
    }

    let records = SimulationPreparer::new(&tasks).prepare_files(files)?;
    if records.is_empty() {
        return Ok(None);
    }

    let engine = MetricsEngine::new(tasks.catalog(), config.engine_options());
    let mut overall = engine.analyze(&records);
    overall.summary.add_source_files(
        files
            .iter()
            .filter_map(|p| p.file_name().and_then(|n| n.to_str())),
    );
    let by_domain = if config.per_domain {
        engine.analyze_by_domain(&records)
    } else {
        BTreeMap::new()
    };

    Ok(Some(Analysis { overall, by_domain }))
}

/// Write CSV tables, the summary and JSON results
async fn export(analysis: &Analysis, output_dir: &Path) -> Result<()> {
    tokio::fs::create_dir_all(output_dir)
        .await
        .with_context(|| format!("Failed to create output directory: {:?}", output_dir))?;

    CsvExporter::write_all(&analysis.overall, output_dir)?;
    write_json(&analysis.overall, &output_dir.join("metrics.json")).await?;
    for (domain, results) in &analysis.by_domain {
        write_json(results, &output_dir.join(format!("metrics_{}.json", domain))).await?;
    }
    Ok(())
}

async fn write_json(results: &MetricResults, path: &Path) -> Result<()> {
    let json = JsonReporter::generate(results)?;
    tokio::fs::write(path, json)
        .await
        .with_context(|| format!("Failed to write {:?}", path))?;
    tracing::debug!("Wrote {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::fs;
    use tempfile::TempDir;

    /// Resolve with explicit variables in place of the process environment
    fn resolve(args: &AnalyzeArgs, vars: &[(&str, &str)]) -> Result<AnalysisConfig> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        apply_args(config_loader(args).with_vars(vars).load()?, args)
    }

    fn write(path: &Path, content: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn fixture(root: &Path) -> AnalyzeArgs {
        write(
            &root.join("tau2/data/tau2/domains/retail/tasks.json"),
            r##"[{"id": "0", "evaluation_criteria": {"actions": [
                {"name": "get_order_details", "arguments": {"order_id": "#W1"}}
            ]}}]"##,
        );
        write(
            &root.join("results/20250801_retail_agent.json"),
            r##"{"simulations": [{"id": "s0", "task_id": "0", "reward_info": {"reward": 1},
                "messages": [{"role": "assistant", "tool_calls": [
                    {"name": "get_order_details", "arguments": {"order_id": "#W1"}}
                ]}]}]}"##,
        );

        AnalyzeArgs {
            input_dir: Some(root.join("results")),
            output_dir: Some(root.join("out")),
            tau2_path: Some(root.join("tau2")),
            format: vec!["json".to_string()],
            per_domain: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_cli_overrides_config() {
        let temp_dir = TempDir::new().unwrap();
        let mut args = fixture(temp_dir.path());
        args.z = Some(2.58);
        args.top_k = Some(3);

        let vars = [("PLANFIT_Z", "3.0"), ("PLANFIT_FORMATS", "markdown")];
        let config = resolve(&args, &vars).unwrap();
        assert_eq!(config.formats, vec!["json"]);
        assert_eq!(config.z, 2.58);
        assert_eq!(config.top_k, 3);
        assert!(config.per_domain);

        args.z = Some(-1.0);
        assert!(resolve(&args, &[]).is_err());
    }

    #[test]
    fn test_variables_apply_without_flags() {
        let temp_dir = TempDir::new().unwrap();
        let mut args = fixture(temp_dir.path());
        args.format.clear();

        let config = resolve(&args, &[("PLANFIT_Z", "2.58"), ("PLANFIT_FORMATS", "csv")]).unwrap();
        assert_eq!(config.formats, vec!["csv"]);
        assert_eq!(config.z, 2.58);
    }

    #[tokio::test]
    async fn test_analyze_writes_outputs() {
        let temp_dir = TempDir::new().unwrap();
        let args = fixture(temp_dir.path());
        write(
            &temp_dir.path().join("results/20250801_retail_empty.json"),
            r#"{"simulations": []}"#,
        );
        execute(resolve(&args, &[]).unwrap()).await.unwrap();

        let out = temp_dir.path().join("out");
        for name in [
            "metrics.json",
            "metrics_retail.json",
            "per_tool_prf.csv",
            "tool_criticality.csv",
            "sequence_compliance.csv",
            "bucket_pass1.csv",
            "summary.txt",
        ] {
            assert!(out.join(name).is_file(), "missing {}", name);
        }

        let saved = fs::read_to_string(out.join("metrics.json")).unwrap();
        let results = JsonReporter::parse(&saved).unwrap();
        assert_eq!(results.summary.conversations, 1);
        assert_eq!(results.complexity_weighted_pass1, 1.0);

        // a file without usable simulations still counts as analyzed
        let summary = fs::read_to_string(out.join("summary.txt")).unwrap();
        assert!(summary.contains("Files analyzed: 2"));
    }

    #[tokio::test]
    async fn test_empty_input_dir_is_error() {
        let temp_dir = TempDir::new().unwrap();
        let mut args = fixture(temp_dir.path());
        args.input_dir = Some(temp_dir.path().join("tau2"));

        let err = execute(resolve(&args, &[]).unwrap()).await.unwrap_err();
        assert!(err.to_string().contains("No JSON result files"));
    }

    #[tokio::test]
    async fn test_empty_dataset_is_not_error() {
        let temp_dir = TempDir::new().unwrap();
        let args = fixture(temp_dir.path());
        write(
            &temp_dir.path().join("results/20250801_retail_agent.json"),
            r#"{"simulations": [{"id": "no-task"}]}"#,
        );

        execute(resolve(&args, &[]).unwrap()).await.unwrap();
        assert!(!temp_dir.path().join("out").exists());
    }
}
