//! Planfit conversation metrics engine
//!
//! Compares an agent's executed tool calls against a ground-truth plan for
//! each completed conversation, and aggregates that comparison into
//! dataset-level quality metrics.
//!
//! # Metrics
//!
//! - **Per-tool PRF**: precision, recall, F1 and omission rate per tool name,
//!   from greedily matched calls under the tool's argument schema
//! - **Tool Criticality Index**: success rate when a tool is used correctly
//!   minus the rate when it is not, with optional Wilson intervals
//! - **Sequence compliance**: normalized plan edit distance (nPED) and
//!   position deviation (PD) between tool-name sequences
//! - **Complexity**: plan-length weighted pass@1 and pass@1 per complexity bucket
//!
//! Undefined ratios (zero denominators) are `None`, never `0.0`.
//!
//! # Example
//!
//! ```rust
//! use planfit_core::{ConversationRecord, EngineOptions, MetricsEngine, StaticSchemaCatalog, ToolInvocation};
//!
//! let catalog = StaticSchemaCatalog::new().with_tool("retail", "get_order_details", ["order_id"]);
//! let call = ToolInvocation::new("get_order_details").with_arg("order_id", "#W1");
//! let record = ConversationRecord::new("c1", "1", "retail", true)
//!     .with_expected(vec![call.clone()])
//!     .with_executed(vec![call]);
//!
//! let results = MetricsEngine::new(&catalog, EngineOptions::default()).analyze(&[record]);
//! assert_eq!(results.per_tool_prf.rows[0].recall, Some(1.0));
//! ```

pub mod complexity;
pub mod criticality;
pub mod engine;
pub mod error;
pub mod matcher;
pub mod prf;
pub mod schema;
pub mod sequence;
pub mod stats;
pub mod types;

// Re-exports for convenience
pub use complexity::{Bucket, BucketPassRow, ComplexityBucketAnalyzer, complexity_weighted_pass1};
pub use criticality::{ToolCriticalityAnalyzer, ToolCriticalityRow, ToolCriticalityTable};
pub use engine::{EngineOptions, MetricResults, MetricsEngine};
pub use error::{RecordError, RecordResult};
pub use matcher::{ToolCallMatcher, args_match};
pub use prf::{ContingencyCounts, PerToolPrfAggregator, PerToolPrfTable, ToolPrfRow};
pub use schema::{StaticSchemaCatalog, ToolSchemaCatalog};
pub use sequence::{
    ComplianceGroupSummary, SequenceComplianceAnalyzer, SequenceComplianceRow,
    SequenceComplianceTable, levenshtein,
};
pub use stats::{WilsonInterval, Z_95, wilson_interval};
pub use types::{ConversationRecord, DatasetSummary, ToolInvocation};
