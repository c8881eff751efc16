//! Analysis configuration
//!
//! Options controlling where benchmark data is read from, how the metrics
//! engine runs, and which reports are produced.

use planfit_core::{EngineOptions, Z_95};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{DataError, DataResult};
use crate::report::ReportFormat;

/// Configuration for an analysis run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Root of the benchmark checkout holding the domain task definitions
    #[serde(default = "default_tau2_path")]
    pub tau2_path: PathBuf,

    /// Directory containing simulation result files
    #[serde(default)]
    pub input_dir: Option<PathBuf>,

    /// Directory to export CSV tables and JSON results to
    #[serde(default)]
    pub output_dir: Option<PathBuf>,

    /// Report formats printed to stdout
    #[serde(default = "default_formats")]
    pub formats: Vec<String>,

    /// Whether to compute Wilson confidence intervals
    #[serde(default)]
    pub confidence_intervals: bool,

    /// z value for confidence intervals
    #[serde(default = "default_z")]
    pub z: f64,

    /// Whether to also analyze each domain separately
    #[serde(default)]
    pub per_domain: bool,

    /// Number of tools shown in the criticality ranking
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

fn default_tau2_path() -> PathBuf {
    PathBuf::from("tau2-bench")
}

fn default_formats() -> Vec<String> {
    vec!["table".to_string()]
}

fn default_z() -> f64 {
    Z_95
}

fn default_top_k() -> usize {
    5
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            tau2_path: default_tau2_path(),
            input_dir: None,
            output_dir: None,
            formats: default_formats(),
            confidence_intervals: false,
            z: default_z(),
            per_domain: false,
            top_k: default_top_k(),
        }
    }
}

impl AnalysisConfig {
    /// Set the directory holding simulation result files
    pub fn with_input_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.input_dir = Some(dir.into());
        self
    }

    /// Set the benchmark checkout path
    pub fn with_tau2_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.tau2_path = path.into();
        self
    }

    /// Set output directory
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    /// Set report formats
    pub fn with_formats(mut self, formats: Vec<String>) -> Self {
        self.formats = formats;
        self
    }

    /// Enable confidence intervals
    pub fn with_confidence_intervals(mut self) -> Self {
        self.confidence_intervals = true;
        self
    }

    /// Set the z value for confidence intervals
    pub fn with_z(mut self, z: f64) -> Self {
        self.z = z;
        self
    }

    /// Enable per-domain analysis
    pub fn per_domain(mut self) -> Self {
        self.per_domain = true;
        self
    }

    /// Engine options derived from this config
    pub fn engine_options(&self) -> EngineOptions {
        EngineOptions::default()
            .with_confidence_intervals(self.confidence_intervals)
            .with_z(self.z)
    }

    /// Parsed report formats
    pub fn report_formats(&self) -> DataResult<Vec<ReportFormat>> {
        self.formats
            .iter()
            .map(|f| {
                ReportFormat::from_str(f)
                    .ok_or_else(|| DataError::invalid_config(format!("Unknown report format '{}'", f)))
            })
            .collect()
    }

    /// Validate the configuration
    pub fn validate(&self) -> DataResult<()> {
        if !self.z.is_finite() || self.z <= 0.0 {
            return Err(DataError::invalid_config(format!(
                "z must be a positive number, got {}",
                self.z
            )));
        }

        if self.formats.is_empty() {
            return Err(DataError::invalid_config("At least one report format is required"));
        }
        self.report_formats()?;

        if self.top_k == 0 {
            return Err(DataError::invalid_config("top_k must be greater than 0"));
        }

        Ok(())
    }
}
