//! Error types for conversation records
//!
//! The analyzers themselves never fail: undefined ratios are modelled as
//! `Option<f64>`. These errors are raised when a record is checked before it
//! enters a dataset.

use thiserror::Error;

/// Result type alias for record validation
pub type RecordResult<T> = Result<T, RecordError>;

/// Reasons a conversation record is rejected before analysis
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    /// A required identifier is empty or could not be derived
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    /// The declared plan length disagrees with the expected plan
    #[error("Invalid plan length: declared {declared}, expected plan has {actual} invocations")]
    InvalidPlanLength { declared: usize, actual: usize },
}

impl RecordError {
    /// Create a missing field error
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }
}
