//! Planfit benchmark integration
//!
//! This crate connects the metric engine in `planfit-core` to benchmark output
//! on disk.
//!
//! # Features
//!
//! - **Domain Tasks**: Ground-truth plans and tool schemas from each domain's
//!   `tasks.json`
//! - **Simulation Preparation**: Conversation records from simulation result
//!   files, skipping malformed entries
//! - **Configuration**: Layered file / environment configuration for analysis runs
//! - **Report Generation**: Table, JSON, Markdown and CSV output
//!
//! # Example
//!
//! ```rust,ignore
//! use planfit_core::MetricsEngine;
//! use planfit_eval::{DomainTaskLoader, SimulationPreparer, discover};
//!
//! let tasks = DomainTaskLoader::new("tau2-bench").load_all();
//! let files = discover(Path::new("results"))?;
//! let records = SimulationPreparer::new(&tasks).prepare_files(&files)?;
//! let results = MetricsEngine::new(tasks.catalog(), Default::default()).analyze(&records);
//! ```

pub mod config;
pub mod dataset;
pub mod error;
pub mod report;
pub mod tasks;

// Re-exports for convenience
pub use config::{AnalysisConfig, ConfigLoader, ConfigSource};
pub use dataset::{SimulationPreparer, discover};
pub use error::{DataError, DataResult};
pub use report::{
    CsvExporter, JsonReporter, MarkdownReporter, ReportFormat, ReportOptions, generate_report,
};
pub use tasks::{DomainSchemaCatalog, DomainTaskLoader, DomainTasks, TaskDefinition};
