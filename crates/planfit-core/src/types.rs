//! Core data types for conversation analysis
//!
//! Defines tool invocations and the completed-trial records every analyzer
//! consumes read-only.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};

use crate::error::{RecordError, RecordResult};
use crate::stats::{mean, ratio};

/// A single tool call, either planned or observed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolInvocation {
    /// Tool name (empty means the entry carried no usable name)
    #[serde(default)]
    pub name: String,

    /// Argument mapping
    #[serde(default)]
    pub arguments: Map<String, Value>,
}

impl ToolInvocation {
    /// Create an invocation without arguments
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            arguments: Map::new(),
        }
    }

    /// Create an invocation with the given arguments
    pub fn with_arguments(name: impl Into<String>, arguments: Map<String, Value>) -> Self {
        Self {
            name: name.into(),
            arguments,
        }
    }

    /// Add a single argument
    pub fn with_arg(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.arguments.insert(key.into(), value.into());
        self
    }

    /// Whether this invocation takes part in tool-keyed analyses
    pub fn has_name(&self) -> bool {
        !self.name.is_empty()
    }
}

/// One completed trial of a conversational task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationRecord {
    /// Conversation identifier (may be empty when the log carries none)
    #[serde(default)]
    pub conversation_id: String,

    /// Task identifier
    pub task_id: String,

    /// Trial identifier (empty when unknown)
    #[serde(default)]
    pub trial_id: String,

    /// Domain the task belongs to
    pub domain: String,

    /// Whether the trial succeeded
    pub success: bool,

    /// Number of ground-truth invocations
    #[serde(default)]
    pub expected_plan_length: usize,

    /// Ground-truth plan, in order
    #[serde(default)]
    pub gt_tools: Vec<ToolInvocation>,

    /// Observed trace, in order
    #[serde(default)]
    pub executed_tools: Vec<ToolInvocation>,

    /// Simulation file the record came from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_file: Option<String>,

    /// Number of messages in the transcript
    #[serde(default)]
    pub n_turns: u32,

    /// Number of tool calls issued by the agent
    #[serde(default)]
    pub n_tool_calls: u32,

    /// Number of tool calls that returned an error
    #[serde(default)]
    pub n_tool_errors: u32,

    /// Wall-clock duration in seconds
    #[serde(default)]
    pub duration_secs: f64,

    /// Total cost (USD)
    #[serde(default)]
    pub total_cost: f64,

    /// Agent-side cost (USD)
    #[serde(default)]
    pub agent_cost: f64,

    /// User-simulator cost (USD)
    #[serde(default)]
    pub user_cost: f64,
}

impl ConversationRecord {
    /// Create a record with an empty plan and trace
    pub fn new(
        conversation_id: impl Into<String>,
        task_id: impl Into<String>,
        domain: impl Into<String>,
        success: bool,
    ) -> Self {
        Self {
            conversation_id: conversation_id.into(),
            task_id: task_id.into(),
            trial_id: String::new(),
            domain: domain.into(),
            success,
            expected_plan_length: 0,
            gt_tools: Vec::new(),
            executed_tools: Vec::new(),
            source_file: None,
            n_turns: 0,
            n_tool_calls: 0,
            n_tool_errors: 0,
            duration_secs: 0.0,
            total_cost: 0.0,
            agent_cost: 0.0,
            user_cost: 0.0,
        }
    }

    /// Set the ground-truth plan; the plan length follows it
    pub fn with_expected(mut self, gt_tools: Vec<ToolInvocation>) -> Self {
        self.expected_plan_length = gt_tools.len();
        self.gt_tools = gt_tools;
        self
    }

    /// Set the observed trace
    pub fn with_executed(mut self, executed_tools: Vec<ToolInvocation>) -> Self {
        self.executed_tools = executed_tools;
        self
    }

    /// Set the trial identifier
    pub fn with_trial(mut self, trial_id: impl Into<String>) -> Self {
        self.trial_id = trial_id.into();
        self
    }

    /// Check the invariants a record must satisfy to enter a dataset
    pub fn validate(&self) -> RecordResult<()> {
        if self.task_id.trim().is_empty() {
            return Err(RecordError::missing_field("task_id"));
        }
        if self.domain.trim().is_empty() {
            return Err(RecordError::missing_field("domain"));
        }
        if self.expected_plan_length != self.gt_tools.len() {
            return Err(RecordError::InvalidPlanLength {
                declared: self.expected_plan_length,
                actual: self.gt_tools.len(),
            });
        }
        Ok(())
    }
}

/// Group invocations by tool name, dropping unnamed entries
pub fn group_by_name(tools: &[ToolInvocation]) -> BTreeMap<&str, Vec<&ToolInvocation>> {
    let mut grouped: BTreeMap<&str, Vec<&ToolInvocation>> = BTreeMap::new();
    for tool in tools.iter().filter(|t| t.has_name()) {
        grouped.entry(tool.name.as_str()).or_default().push(tool);
    }
    grouped
}

/// Ordered tool names, dropping unnamed entries
pub fn tool_names(tools: &[ToolInvocation]) -> Vec<&str> {
    tools
        .iter()
        .filter(|t| t.has_name())
        .map(|t| t.name.as_str())
        .collect()
}

/// Dataset-level counts printed before the metrics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetSummary {
    /// Number of conversations
    pub conversations: usize,

    /// Number of successful conversations
    pub successes: usize,

    /// Fraction of successful conversations
    pub success_rate: Option<f64>,

    /// Mean expected plan length
    pub mean_plan_length: Option<f64>,

    /// Distinct domains, sorted
    pub domains: Vec<String>,

    /// Distinct input files, sorted; includes files that yielded no records
    /// once they are added with [`add_source_files`](Self::add_source_files)
    #[serde(default)]
    pub source_files: Vec<String>,
}

impl DatasetSummary {
    /// Summarize a dataset
    pub fn from_records(records: &[ConversationRecord]) -> Self {
        let conversations = records.len();
        let successes = records.iter().filter(|r| r.success).count();
        let plan_lengths: Vec<f64> = records
            .iter()
            .map(|r| r.expected_plan_length as f64)
            .collect();

        let domains: BTreeSet<&str> = records.iter().map(|r| r.domain.as_str()).collect();
        let source_files: BTreeSet<&str> = records
            .iter()
            .filter_map(|r| r.source_file.as_deref())
            .collect();

        Self {
            conversations,
            successes,
            success_rate: ratio(successes as f64, conversations as f64),
            mean_plan_length: mean(&plan_lengths),
            domains: domains.into_iter().map(String::from).collect(),
            source_files: source_files.into_iter().map(String::from).collect(),
        }
    }

    /// Count input files alongside those seen on records
    pub fn add_source_files<I, S>(&mut self, files: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut merged: BTreeSet<String> = self.source_files.drain(..).collect();
        merged.extend(files.into_iter().map(Into::into));
        self.source_files = merged.into_iter().collect();
    }
}
