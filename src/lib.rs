//! Planfit
//!
//! Tool-planning metrics for LLM agent conversation logs. This crate bundles
//! the metric engine (`planfit-core`) and the benchmark integration
//! (`planfit-eval`) behind one dependency.
//!
//! # Example
//!
//! ```rust,ignore
//! use planfit::{DomainTaskLoader, MetricsEngine, SimulationPreparer, discover};
//!
//! let tasks = DomainTaskLoader::new("tau2-bench").load_all();
//! let records = SimulationPreparer::new(&tasks).prepare_files(&discover(dir)?)?;
//! let results = MetricsEngine::new(tasks.catalog(), Default::default()).analyze(&records);
//! ```

pub use planfit_core::{
    ConversationRecord, EngineOptions, MetricResults, MetricsEngine, StaticSchemaCatalog,
    ToolInvocation, ToolSchemaCatalog,
};
pub use planfit_eval::{
    AnalysisConfig, ConfigLoader, CsvExporter, DomainTaskLoader, DomainTasks, JsonReporter,
    ReportFormat, ReportOptions, SimulationPreparer, discover, generate_report,
};
