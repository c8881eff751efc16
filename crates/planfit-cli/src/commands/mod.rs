//! CLI commands

pub mod analyze;
pub mod report;
pub mod schemas;
