//! Configuration for analysis runs

mod loader;
mod model;

pub use loader::{ConfigLoader, ConfigSource, ENV_PREFIX, load_from_file};
pub use model::AnalysisConfig;
