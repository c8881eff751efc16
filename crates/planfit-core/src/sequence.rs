//! Sequence compliance
//!
//! Scores ordering fidelity between the planned and executed tool-name
//! sequences, ignoring arguments. Unnamed entries are dropped before
//! sequencing.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::stats::{mean, median};
use crate::types::{ConversationRecord, tool_names};

/// Unit-cost edit distance between two sequences
pub fn levenshtein<T: PartialEq>(a: &[T], b: &[T]) -> usize {
    // Single rolling row of the DP table
    let mut row: Vec<usize> = (0..=b.len()).collect();

    for (i, x) in a.iter().enumerate() {
        let mut diag = row[0];
        row[0] = i + 1;
        for (j, y) in b.iter().enumerate() {
            let cost = usize::from(x != y);
            let next = (row[j + 1] + 1).min(row[j] + 1).min(diag + cost);
            diag = row[j + 1];
            row[j + 1] = next;
        }
    }
    row[b.len()]
}

/// Edit distance normalized by the planned length (at least 1)
pub fn normalized_edit_distance(expected: &[&str], executed: &[&str]) -> f64 {
    levenshtein(expected, executed) as f64 / expected.len().max(1) as f64
}

/// Mean offset between each planned position and the first executed
/// occurrence of the same name; `None` when no planned name was executed
pub fn position_deviation(expected: &[&str], executed: &[&str]) -> Option<f64> {
    let mut first_seen: HashMap<&str, usize> = HashMap::new();
    for (i, name) in executed.iter().enumerate() {
        first_seen.entry(*name).or_insert(i);
    }

    let deviations: Vec<f64> = expected
        .iter()
        .enumerate()
        .filter_map(|(i, name)| first_seen.get(name).map(|&j| j.abs_diff(i) as f64))
        .collect();
    mean(&deviations)
}

/// Compliance scores for one conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequenceComplianceRow {
    pub task_id: String,
    pub trial_id: String,
    pub success: bool,
    pub nped: f64,
    pub pd: Option<f64>,
    pub expected_plan_length: usize,
    pub domain: String,
}

impl SequenceComplianceRow {
    pub fn from_record(record: &ConversationRecord) -> Self {
        let expected = tool_names(&record.gt_tools);
        let executed = tool_names(&record.executed_tools);

        Self {
            task_id: record.task_id.clone(),
            trial_id: record.trial_id.clone(),
            success: record.success,
            nped: normalized_edit_distance(&expected, &executed),
            pd: position_deviation(&expected, &executed),
            expected_plan_length: record.expected_plan_length,
            domain: record.domain.clone(),
        }
    }
}

/// Compliance grouped by domain and outcome
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceGroupSummary {
    pub domain: String,
    pub success: bool,
    pub conversations: usize,
    pub mean_nped: Option<f64>,
    pub median_nped: Option<f64>,
    /// Mean over conversations with a defined PD
    pub mean_pd: Option<f64>,
}

/// One row per conversation, in input order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SequenceComplianceTable {
    pub rows: Vec<SequenceComplianceRow>,
}

impl SequenceComplianceTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Group rows by (domain, success), sorted by domain then failures first
    pub fn summarize_by_domain_outcome(&self) -> Vec<ComplianceGroupSummary> {
        let mut groups: BTreeMap<(&str, bool), Vec<&SequenceComplianceRow>> = BTreeMap::new();
        for row in &self.rows {
            groups
                .entry((row.domain.as_str(), row.success))
                .or_default()
                .push(row);
        }

        groups
            .into_iter()
            .map(|((domain, success), rows)| {
                let nped: Vec<f64> = rows.iter().map(|r| r.nped).collect();
                let pd: Vec<f64> = rows.iter().filter_map(|r| r.pd).collect();
                ComplianceGroupSummary {
                    domain: domain.to_string(),
                    success,
                    conversations: rows.len(),
                    mean_nped: mean(&nped),
                    median_nped: median(&nped),
                    mean_pd: mean(&pd),
                }
            })
            .collect()
    }
}

/// Computes per-conversation sequence compliance
#[derive(Debug, Clone, Copy, Default)]
pub struct SequenceComplianceAnalyzer;

impl SequenceComplianceAnalyzer {
    pub fn new() -> Self {
        Self
    }

    pub fn compute(&self, records: &[ConversationRecord]) -> SequenceComplianceTable {
        SequenceComplianceTable {
            rows: records
                .par_iter()
                .map(SequenceComplianceRow::from_record)
                .collect(),
        }
    }
}
