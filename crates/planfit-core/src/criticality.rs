//! Tool Criticality Index (TCI)
//!
//! For every distinct tool in a conversation's plan, the conversation is
//! flagged "correct" when at least one expected call of that tool has a
//! matching executed call. TCI is the success rate of correct conversations
//! minus the success rate of the rest.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::ops::AddAssign;

use crate::matcher::ToolCallMatcher;
use crate::stats::wilson_interval;
use crate::types::{ConversationRecord, group_by_name};

/// Per-conversation flag for one planned tool
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CriticalityFlag {
    pub tool: String,
    pub correct: bool,
    pub success: bool,
}

/// Partition counts for one tool
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PartitionCounts {
    pub n_correct: usize,
    pub successes_correct: usize,
    pub n_incorrect: usize,
    pub successes_incorrect: usize,
}

impl PartitionCounts {
    fn from_flag(flag: &CriticalityFlag) -> Self {
        let success = usize::from(flag.success);
        if flag.correct {
            Self {
                n_correct: 1,
                successes_correct: success,
                ..Self::default()
            }
        } else {
            Self {
                n_incorrect: 1,
                successes_incorrect: success,
                ..Self::default()
            }
        }
    }
}

impl AddAssign for PartitionCounts {
    fn add_assign(&mut self, other: Self) {
        self.n_correct += other.n_correct;
        self.successes_correct += other.successes_correct;
        self.n_incorrect += other.n_incorrect;
        self.successes_incorrect += other.successes_incorrect;
    }
}

/// One row of the criticality table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCriticalityRow {
    pub tool: String,
    pub tci: f64,
    pub p_correct: f64,
    pub p_incorrect: f64,
    pub n_correct: usize,
    pub n_incorrect: usize,
    /// Lower TCI bound; only set when both partitions are non-empty
    #[serde(default)]
    pub ci_lower: Option<f64>,
    #[serde(default)]
    pub ci_upper: Option<f64>,
}

impl ToolCriticalityRow {
    /// Derive rates (and optionally an interval) from partition counts.
    ///
    /// An empty partition reports a rate of 0.0. The TCI interval adds the
    /// Wilson variances of both proportions, treating them as independent.
    pub fn from_counts(tool: impl Into<String>, counts: PartitionCounts, ci_z: Option<f64>) -> Self {
        let rate = |k: usize, n: usize| if n == 0 { 0.0 } else { k as f64 / n as f64 };
        let p_correct = rate(counts.successes_correct, counts.n_correct);
        let p_incorrect = rate(counts.successes_incorrect, counts.n_incorrect);
        let tci = p_correct - p_incorrect;

        let interval = ci_z.and_then(|z| {
            let correct = wilson_interval(counts.successes_correct, counts.n_correct, z)?;
            let incorrect = wilson_interval(counts.successes_incorrect, counts.n_incorrect, z)?;
            let spread = z * (correct.variance(z) + incorrect.variance(z)).sqrt();
            Some((tci - spread, tci + spread))
        });

        Self {
            tool: tool.into(),
            tci,
            p_correct,
            p_incorrect,
            n_correct: counts.n_correct,
            n_incorrect: counts.n_incorrect,
            ci_lower: interval.map(|(lo, _)| lo),
            ci_upper: interval.map(|(_, hi)| hi),
        }
    }
}

/// Criticality table, sorted by tool name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolCriticalityTable {
    pub rows: Vec<ToolCriticalityRow>,
}

impl ToolCriticalityTable {
    pub fn get(&self, tool: &str) -> Option<&ToolCriticalityRow> {
        self.rows.iter().find(|r| r.tool == tool)
    }

    /// The `k` most critical tools, by TCI descending then tool name
    pub fn top_k(&self, k: usize) -> Vec<&ToolCriticalityRow> {
        let mut ranked: Vec<&ToolCriticalityRow> = self.rows.iter().collect();
        ranked.sort_by(|a, b| b.tci.total_cmp(&a.tci).then_with(|| a.tool.cmp(&b.tool)));
        ranked.truncate(k);
        ranked
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Computes the Tool Criticality Index per planned tool
pub struct ToolCriticalityAnalyzer<'a> {
    matcher: ToolCallMatcher<'a>,
    ci_z: Option<f64>,
}

impl<'a> ToolCriticalityAnalyzer<'a> {
    pub fn new(matcher: ToolCallMatcher<'a>) -> Self {
        Self { matcher, ci_z: None }
    }

    /// Also report TCI intervals at the given z value
    pub fn with_confidence_intervals(mut self, z: f64) -> Self {
        self.ci_z = Some(z);
        self
    }

    /// One flag per distinct planned tool in a conversation
    pub fn conversation_flags(&self, record: &ConversationRecord) -> Vec<CriticalityFlag> {
        let expected = group_by_name(&record.gt_tools);
        let executed = group_by_name(&record.executed_tools);
        let planned: BTreeSet<&str> = expected.keys().copied().collect();

        planned
            .into_iter()
            .map(|tool| {
                let candidates = executed.get(tool).map(Vec::as_slice).unwrap_or(&[]);
                let correct = expected[tool]
                    .iter()
                    .any(|exp| self.matcher.any_match(exp, candidates, tool, &record.domain));
                CriticalityFlag {
                    tool: tool.to_string(),
                    correct,
                    success: record.success,
                }
            })
            .collect()
    }

    /// Partition counts per tool over the dataset
    pub fn aggregate(&self, records: &[ConversationRecord]) -> BTreeMap<String, PartitionCounts> {
        records
            .par_iter()
            .map(|record| {
                let mut counts: BTreeMap<String, PartitionCounts> = BTreeMap::new();
                for flag in self.conversation_flags(record) {
                    *counts.entry(flag.tool.clone()).or_default() +=
                        PartitionCounts::from_flag(&flag);
                }
                counts
            })
            .reduce(BTreeMap::new, |mut left, right| {
                for (tool, counts) in right {
                    *left.entry(tool).or_default() += counts;
                }
                left
            })
    }

    /// Criticality table for the dataset
    pub fn compute(&self, records: &[ConversationRecord]) -> ToolCriticalityTable {
        let rows: Vec<ToolCriticalityRow> = self
            .aggregate(records)
            .into_iter()
            .filter(|(_, c)| c.n_correct + c.n_incorrect > 0)
            .map(|(tool, counts)| ToolCriticalityRow::from_counts(tool, counts, self.ci_z))
            .collect();

        for row in &rows {
            tracing::debug!(
                "TCI {}: {:.3} ({} correct, {} incorrect)",
                row.tool,
                row.tci,
                row.n_correct,
                row.n_incorrect
            );
        }
        ToolCriticalityTable { rows }
    }
}
