//! Metrics engine
//!
//! Runs every analyzer over one dataset and bundles the results.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::complexity::{BucketPassRow, ComplexityBucketAnalyzer};
use crate::criticality::{ToolCriticalityAnalyzer, ToolCriticalityTable};
use crate::matcher::ToolCallMatcher;
use crate::prf::{PerToolPrfAggregator, PerToolPrfTable};
use crate::schema::ToolSchemaCatalog;
use crate::sequence::{SequenceComplianceAnalyzer, SequenceComplianceTable};
use crate::stats::Z_95;
use crate::types::{ConversationRecord, DatasetSummary};

/// Engine-level options
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EngineOptions {
    /// Attach Wilson-based intervals to TCI and bucket rows
    pub confidence_intervals: bool,
    /// z value used for every interval
    pub z: f64,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            confidence_intervals: false,
            z: Z_95,
        }
    }
}

impl EngineOptions {
    pub fn with_confidence_intervals(mut self, enabled: bool) -> Self {
        self.confidence_intervals = enabled;
        self
    }

    pub fn with_z(mut self, z: f64) -> Self {
        self.z = z;
        self
    }

    fn interval_z(&self) -> Option<f64> {
        self.confidence_intervals.then_some(self.z)
    }
}

/// Every metric computed for one dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricResults {
    /// Options the results were computed with
    #[serde(default)]
    pub options: EngineOptions,
    pub summary: DatasetSummary,
    pub per_tool_prf: PerToolPrfTable,
    pub tool_criticality: ToolCriticalityTable,
    pub sequence_compliance: SequenceComplianceTable,
    pub complexity_weighted_pass1: f64,
    pub bucket_pass1: Vec<BucketPassRow>,
}

/// Orchestrates the analyzers over a dataset
pub struct MetricsEngine<'a> {
    catalog: &'a dyn ToolSchemaCatalog,
    options: EngineOptions,
}

impl<'a> MetricsEngine<'a> {
    pub fn new(catalog: &'a dyn ToolSchemaCatalog, options: EngineOptions) -> Self {
        Self { catalog, options }
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    /// Compute all metrics. Never fails; an empty dataset yields empty tables.
    pub fn analyze(&self, records: &[ConversationRecord]) -> MetricResults {
        let matcher = ToolCallMatcher::new(self.catalog);

        let mut criticality = ToolCriticalityAnalyzer::new(matcher);
        let mut complexity = ComplexityBucketAnalyzer::new();
        if let Some(z) = self.options.interval_z() {
            criticality = criticality.with_confidence_intervals(z);
            complexity = complexity.with_confidence_intervals(z);
        }

        let ((per_tool_prf, tool_criticality), sequence_compliance) = rayon::join(
            || {
                rayon::join(
                    || PerToolPrfAggregator::new(matcher).compute(records),
                    || criticality.compute(records),
                )
            },
            || SequenceComplianceAnalyzer::new().compute(records),
        );

        let results = MetricResults {
            options: self.options,
            summary: DatasetSummary::from_records(records),
            per_tool_prf,
            tool_criticality,
            sequence_compliance,
            complexity_weighted_pass1: complexity.weighted_pass1(records),
            bucket_pass1: complexity.bucket_pass1(records),
        };

        tracing::info!(
            "Analyzed {} conversations: {} tools, weighted pass@1 {:.3}",
            results.summary.conversations,
            results.per_tool_prf.len(),
            results.complexity_weighted_pass1
        );
        results
    }

    /// Compute all metrics separately for each domain
    pub fn analyze_by_domain(
        &self,
        records: &[ConversationRecord],
    ) -> BTreeMap<String, MetricResults> {
        let mut by_domain: BTreeMap<&str, Vec<ConversationRecord>> = BTreeMap::new();
        for record in records {
            by_domain
                .entry(record.domain.as_str())
                .or_default()
                .push(record.clone());
        }

        by_domain
            .into_iter()
            .map(|(domain, subset)| {
                tracing::debug!("Analyzing domain {} ({} conversations)", domain, subset.len());
                (domain.to_string(), self.analyze(&subset))
            })
            .collect()
    }
}
