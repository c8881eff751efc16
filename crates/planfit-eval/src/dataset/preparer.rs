//! Simulation preparation
//!
//! Turns benchmark simulation result files into conversation records. A
//! simulation that cannot be turned into a valid record is skipped with a
//! warning; the rest of the file is still prepared.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use planfit_core::ConversationRecord;
use serde::Deserialize;
use serde_json::Value;
use walkdir::WalkDir;

use super::extract::{
    as_number, count_messages, domain_from_filename, extract_executed_tools, extract_success,
    messages, number_field,
};
use crate::error::{DataError, DataResult};
use crate::tasks::{DomainTasks, value_to_id};

/// Top-level layout of a simulation result file
#[derive(Debug, Default, Deserialize)]
struct SimulationFile {
    #[serde(default)]
    simulations: Vec<Value>,
}

/// Prepares conversation records from simulation logs
pub struct SimulationPreparer<'a> {
    tasks: &'a DomainTasks,
}

impl<'a> SimulationPreparer<'a> {
    /// Create a preparer resolving expected plans from `tasks`
    pub fn new(tasks: &'a DomainTasks) -> Self {
        Self { tasks }
    }

    /// Prepare one simulation entry
    pub fn prepare_simulation(&self, sim: &Value, domain: &str) -> DataResult<ConversationRecord> {
        if domain.trim().is_empty() {
            return Err(DataError::MissingDomain(
                sim.get("id").map(value_to_id).unwrap_or_default(),
            ));
        }

        let task_id = match sim.get("task_id") {
            None | Some(Value::Null) => return Err(DataError::missing_field("task_id")),
            Some(id) => value_to_id(id),
        };

        if !self.tasks.has_task(domain, &task_id) {
            tracing::debug!("No ground truth for task {} in domain {}", task_id, domain);
        }
        let gt_tools = self.tasks.task_tools(domain, &task_id).to_vec();

        let messages = messages(sim);
        let counts = count_messages(messages);
        let agent_cost = number_field(sim, "agent_cost");
        let user_cost = number_field(sim, "user_cost");
        let total_cost = sim
            .get("total_cost")
            .and_then(as_number)
            .unwrap_or(agent_cost + user_cost);

        let conversation_id = sim
            .get("conversation_id")
            .or_else(|| sim.get("id"))
            .map(value_to_id)
            .unwrap_or_default();

        let success = extract_success(sim);
        let mut record = ConversationRecord::new(conversation_id, task_id, domain, success)
            .with_expected(gt_tools)
            .with_executed(extract_executed_tools(messages));
        if let Some(trial) = sim.get("trial").filter(|t| !t.is_null()) {
            record = record.with_trial(value_to_id(trial));
        }
        record.n_turns = counts.n_turns;
        record.n_tool_calls = counts.n_tool_calls;
        record.n_tool_errors = counts.n_tool_errors;
        record.duration_secs = number_field(sim, "duration");
        record.agent_cost = agent_cost;
        record.user_cost = user_cost;
        record.total_cost = total_cost;

        record.validate()?;
        Ok(record)
    }

    /// Prepare every simulation of a result file
    pub fn prepare_file(&self, path: &Path) -> Result<Vec<ConversationRecord>> {
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| DataError::MissingDomain(path.display().to_string()))?;
        let domain = domain_from_filename(filename);

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read simulation file: {:?}", path))?;
        let file: SimulationFile = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse simulation file: {:?}", path))?;

        let mut records = Vec::with_capacity(file.simulations.len());
        for (i, sim) in file.simulations.iter().enumerate() {
            match self.prepare_simulation(sim, &domain) {
                Ok(mut record) => {
                    record.source_file = Some(filename.to_string());
                    records.push(record);
                }
                Err(e) => {
                    tracing::warn!("Skipping simulation {} in {}: {}", i, filename, e);
                }
            }
        }

        tracing::info!(
            "Prepared {}/{} simulations from {} (domain: {})",
            records.len(),
            file.simulations.len(),
            filename,
            domain
        );
        Ok(records)
    }

    /// Prepare several result files, concatenating their records in order
    pub fn prepare_files(&self, paths: &[PathBuf]) -> Result<Vec<ConversationRecord>> {
        let mut records = Vec::new();
        for path in paths {
            records.extend(self.prepare_file(path)?);
        }
        Ok(records)
    }
}

/// Simulation result files (`*.json`) directly inside `input_dir`, sorted
pub fn discover(input_dir: &Path) -> Result<Vec<PathBuf>> {
    if !input_dir.is_dir() {
        anyhow::bail!("Input directory not found: {}", input_dir.display());
    }

    let mut files: Vec<PathBuf> = WalkDir::new(input_dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .map(|e| e.into_path())
        .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "json"))
        .collect();
    files.sort();
    Ok(files)
}
