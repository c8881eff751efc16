//! Per-tool precision / recall / F1 / omission
//!
//! Each conversation contributes contingency counts per tool name; counts are
//! summed across the dataset and the ratios derived once at the end. The
//! reduction is a plain integer sum, so partial results from parallel shards
//! merge in any order.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::ops::AddAssign;

use crate::matcher::ToolCallMatcher;
use crate::stats::ratio;
use crate::types::{ConversationRecord, group_by_name};

/// Summed contingency counts for one tool
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContingencyCounts {
    /// Expected calls matched by an executed call
    pub tp: u64,
    /// Executed calls left unmatched
    pub fp: u64,
    /// Expected calls left unmatched
    #[serde(rename = "fn")]
    pub fn_: u64,
    /// Conversations whose plan includes the tool
    pub requires_tool: u64,
}

impl ContingencyCounts {
    /// Counts for one tool in one conversation
    pub fn from_match(n_expected: usize, n_executed: usize, matched: usize) -> Self {
        Self {
            tp: matched as u64,
            fp: n_executed.saturating_sub(matched) as u64,
            fn_: n_expected.saturating_sub(matched) as u64,
            requires_tool: u64::from(n_expected > 0),
        }
    }

    /// tp / (tp + fp)
    pub fn precision(&self) -> Option<f64> {
        ratio(self.tp as f64, (self.tp + self.fp) as f64)
    }

    /// tp / (tp + fn)
    pub fn recall(&self) -> Option<f64> {
        ratio(self.tp as f64, (self.tp + self.fn_) as f64)
    }

    /// Harmonic mean of precision and recall
    pub fn f1(&self) -> Option<f64> {
        let (p, r) = (self.precision()?, self.recall()?);
        ratio(2.0 * p * r, p + r)
    }

    /// fn / requires_tool
    pub fn omission_rate(&self) -> Option<f64> {
        ratio(self.fn_ as f64, self.requires_tool as f64)
    }
}

impl AddAssign for ContingencyCounts {
    fn add_assign(&mut self, other: Self) {
        self.tp += other.tp;
        self.fp += other.fp;
        self.fn_ += other.fn_;
        self.requires_tool += other.requires_tool;
    }
}

/// Counts keyed by tool name
pub type ToolCounts = BTreeMap<String, ContingencyCounts>;

/// Merge two partial count maps
pub fn merge_counts(mut left: ToolCounts, right: ToolCounts) -> ToolCounts {
    for (tool, counts) in right {
        *left.entry(tool).or_default() += counts;
    }
    left
}

/// One row of the PRF table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolPrfRow {
    pub tool: String,
    pub tp: u64,
    pub fp: u64,
    #[serde(rename = "fn")]
    pub fn_: u64,
    pub requires_tool: u64,
    pub precision: Option<f64>,
    pub recall: Option<f64>,
    pub f1: Option<f64>,
    pub omission_rate: Option<f64>,
}

impl ToolPrfRow {
    /// Derive the ratios for a tool's summed counts
    pub fn from_counts(tool: impl Into<String>, counts: ContingencyCounts) -> Self {
        Self {
            tool: tool.into(),
            tp: counts.tp,
            fp: counts.fp,
            fn_: counts.fn_,
            requires_tool: counts.requires_tool,
            precision: counts.precision(),
            recall: counts.recall(),
            f1: counts.f1(),
            omission_rate: counts.omission_rate(),
        }
    }
}

/// Per-tool PRF table, sorted by tool name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerToolPrfTable {
    pub rows: Vec<ToolPrfRow>,
}

impl PerToolPrfTable {
    /// Build the table from summed counts
    pub fn from_counts(counts: ToolCounts) -> Self {
        Self {
            rows: counts
                .into_iter()
                .map(|(tool, c)| ToolPrfRow::from_counts(tool, c))
                .collect(),
        }
    }

    /// Row for a tool
    pub fn get(&self, tool: &str) -> Option<&ToolPrfRow> {
        self.rows.iter().find(|r| r.tool == tool)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Aggregates contingency counts per tool across a dataset
pub struct PerToolPrfAggregator<'a> {
    matcher: ToolCallMatcher<'a>,
}

impl<'a> PerToolPrfAggregator<'a> {
    pub fn new(matcher: ToolCallMatcher<'a>) -> Self {
        Self { matcher }
    }

    /// Counts contributed by a single conversation
    pub fn conversation_counts(&self, record: &ConversationRecord) -> ToolCounts {
        let expected = group_by_name(&record.gt_tools);
        let executed = group_by_name(&record.executed_tools);
        let names: BTreeSet<&str> = expected.keys().chain(executed.keys()).copied().collect();

        names
            .into_iter()
            .map(|tool| {
                let exp = expected.get(tool).map(Vec::as_slice).unwrap_or(&[]);
                let exe = executed.get(tool).map(Vec::as_slice).unwrap_or(&[]);
                let matched = self.matcher.match_count(exp, exe, tool, &record.domain);
                (
                    tool.to_string(),
                    ContingencyCounts::from_match(exp.len(), exe.len(), matched),
                )
            })
            .collect()
    }

    /// Summed counts over the dataset
    pub fn aggregate(&self, records: &[ConversationRecord]) -> ToolCounts {
        records
            .par_iter()
            .map(|record| self.conversation_counts(record))
            .reduce(ToolCounts::new, merge_counts)
    }

    /// Per-tool PRF table for the dataset
    pub fn compute(&self, records: &[ConversationRecord]) -> PerToolPrfTable {
        let table = PerToolPrfTable::from_counts(self.aggregate(records));
        tracing::debug!("per-tool PRF computed for {} tools", table.len());
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::StaticSchemaCatalog;
    use crate::types::ToolInvocation;

    fn catalog() -> StaticSchemaCatalog {
        StaticSchemaCatalog::new()
            .with_tool("retail", "get_order_details", ["order_id"])
            .with_tool("retail", "cancel_pending_order", ["order_id", "reason"])
    }

    fn details(order: &str) -> ToolInvocation {
        ToolInvocation::new("get_order_details").with_arg("order_id", order)
    }

    fn cancel(order: &str, reason: &str) -> ToolInvocation {
        ToolInvocation::new("cancel_pending_order")
            .with_arg("order_id", order)
            .with_arg("reason", reason)
    }

    #[test]
    fn test_counts_from_match() {
        let c = ContingencyCounts::from_match(3, 1, 1);
        assert_eq!((c.tp, c.fp, c.fn_, c.requires_tool), (1, 0, 2, 1));

        let c = ContingencyCounts::from_match(0, 2, 0);
        assert_eq!((c.tp, c.fp, c.fn_, c.requires_tool), (0, 2, 0, 0));
    }

    #[test]
    fn test_ratios_undefined_on_zero_denominator() {
        let executed_only = ContingencyCounts::from_match(0, 2, 0);
        assert_eq!(executed_only.precision(), Some(0.0));
        assert_eq!(executed_only.recall(), None);
        assert_eq!(executed_only.f1(), None);
        assert_eq!(executed_only.omission_rate(), None);

        let missed = ContingencyCounts::from_match(1, 1, 0);
        assert_eq!(missed.precision(), Some(0.0));
        assert_eq!(missed.recall(), Some(0.0));
        assert_eq!(missed.f1(), None);
        assert_eq!(missed.omission_rate(), Some(1.0));
    }

    #[test]
    fn test_conversation_counts() {
        let catalog = catalog();
        let agg = PerToolPrfAggregator::new(ToolCallMatcher::new(&catalog));
        let record = ConversationRecord::new("c1", "1", "retail", true)
            .with_expected(vec![details("#1"), cancel("#1", "no longer needed")])
            .with_executed(vec![
                details("#1"),
                details("#2"),
                cancel("#1", "ordered by mistake"),
                ToolInvocation::new(""),
            ]);

        let counts = agg.conversation_counts(&record);
        assert_eq!(counts.len(), 2);
        let d = counts["get_order_details"];
        assert_eq!((d.tp, d.fp, d.fn_, d.requires_tool), (1, 1, 0, 1));
        let c = counts["cancel_pending_order"];
        assert_eq!((c.tp, c.fp, c.fn_, c.requires_tool), (0, 1, 1, 1));
    }

    #[test]
    fn test_compute_sums_across_conversations() {
        let catalog = catalog();
        let agg = PerToolPrfAggregator::new(ToolCallMatcher::new(&catalog));
        let records = vec![
            ConversationRecord::new("c1", "1", "retail", true)
                .with_expected(vec![details("#1")])
                .with_executed(vec![details("#1")]),
            ConversationRecord::new("c2", "2", "retail", false)
                .with_expected(vec![details("#2")])
                .with_executed(vec![details("#3"), ToolInvocation::new("think")]),
        ];

        let table = agg.compute(&records);
        let row = table.get("get_order_details").unwrap();
        assert_eq!((row.tp, row.fp, row.fn_, row.requires_tool), (1, 1, 1, 2));
        assert_eq!(row.precision, Some(0.5));
        assert_eq!(row.recall, Some(0.5));
        assert_eq!(row.f1, Some(0.5));
        assert_eq!(row.omission_rate, Some(0.5));

        let think = table.get("think").unwrap();
        assert_eq!(think.requires_tool, 0);
        assert_eq!(think.recall, None);
        assert_eq!(think.omission_rate, None);

        assert!(table.get("cancel_pending_order").is_none());
        let tools: Vec<&str> = table.rows.iter().map(|r| r.tool.as_str()).collect();
        assert_eq!(tools, vec!["get_order_details", "think"]);
    }

    #[test]
    fn test_empty_dataset() {
        let catalog = catalog();
        let agg = PerToolPrfAggregator::new(ToolCallMatcher::new(&catalog));
        assert!(agg.compute(&[]).is_empty());
    }

    #[test]
    fn test_merge_is_order_independent() {
        let mut a = ToolCounts::new();
        a.insert("x".into(), ContingencyCounts::from_match(2, 1, 1));
        let mut b = ToolCounts::new();
        b.insert("x".into(), ContingencyCounts::from_match(1, 3, 1));
        b.insert("y".into(), ContingencyCounts::from_match(0, 1, 0));

        let ab = merge_counts(a.clone(), b.clone());
        let ba = merge_counts(b, a);
        assert_eq!(ab, ba);
        assert_eq!(ab["x"].tp, 2);
        assert_eq!(ab["x"].requires_tool, 2);
    }

    #[test]
    fn test_serialized_column_names() {
        let row = ToolPrfRow::from_counts("t", ContingencyCounts::from_match(0, 1, 0));
        let json = serde_json::to_value(&row).unwrap();
        assert!(json.get("fn").is_some());
        assert!(json["recall"].is_null());
    }
}
