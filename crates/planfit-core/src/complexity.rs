//! Complexity-weighted and bucketed pass@1

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::stats::{ratio, wilson_interval};
use crate::types::ConversationRecord;

/// Complexity tier derived from expected plan length
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Bucket {
    /// Up to 2 planned calls
    Simple,
    /// 3 to 5 planned calls
    Medium,
    /// More than 5 planned calls
    Complex,
}

impl Bucket {
    /// All buckets, in reporting order
    pub const ALL: [Bucket; 3] = [Bucket::Simple, Bucket::Medium, Bucket::Complex];

    pub fn for_length(expected_plan_length: usize) -> Self {
        match expected_plan_length {
            0..=2 => Bucket::Simple,
            3..=5 => Bucket::Medium,
            _ => Bucket::Complex,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Bucket::Simple => "simple",
            Bucket::Medium => "medium",
            Bucket::Complex => "complex",
        }
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// pass@1 for one bucket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BucketPassRow {
    pub bucket: Bucket,
    pub conversations: usize,
    pub successes: usize,
    /// Undefined for an empty bucket
    pub pass_at_1: Option<f64>,
    #[serde(default)]
    pub ci_lower: Option<f64>,
    #[serde(default)]
    pub ci_upper: Option<f64>,
}

/// Plan-length weighted success rate, guarded against a zero total length
pub fn complexity_weighted_pass1(records: &[ConversationRecord]) -> f64 {
    let weighted: usize = records
        .iter()
        .filter(|r| r.success)
        .map(|r| r.expected_plan_length)
        .sum();
    let total: usize = records.iter().map(|r| r.expected_plan_length).sum();
    weighted as f64 / total.max(1) as f64
}

/// Computes complexity-aware pass rates
#[derive(Debug, Clone, Copy, Default)]
pub struct ComplexityBucketAnalyzer {
    ci_z: Option<f64>,
}

impl ComplexityBucketAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach Wilson intervals to non-empty buckets
    pub fn with_confidence_intervals(mut self, z: f64) -> Self {
        self.ci_z = Some(z);
        self
    }

    pub fn weighted_pass1(&self, records: &[ConversationRecord]) -> f64 {
        complexity_weighted_pass1(records)
    }

    /// One row per bucket, always all three in order
    pub fn bucket_pass1(&self, records: &[ConversationRecord]) -> Vec<BucketPassRow> {
        let mut tallies = [(0usize, 0usize); 3];
        for record in records {
            let slot = &mut tallies[Bucket::for_length(record.expected_plan_length) as usize];
            slot.0 += 1;
            slot.1 += usize::from(record.success);
        }

        Bucket::ALL
            .iter()
            .zip(tallies)
            .map(|(&bucket, (conversations, successes))| {
                let ci = self
                    .ci_z
                    .and_then(|z| wilson_interval(successes, conversations, z));
                BucketPassRow {
                    bucket,
                    conversations,
                    successes,
                    pass_at_1: ratio(successes as f64, conversations as f64),
                    ci_lower: ci.map(|c| c.lower),
                    ci_upper: ci.map(|c| c.upper),
                }
            })
            .collect()
    }
}
