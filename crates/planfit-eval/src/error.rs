//! Error types for loading benchmark data

use planfit_core::RecordError;
use thiserror::Error;

/// Result type alias for data loading operations
pub type DataResult<T> = Result<T, DataError>;

/// Errors raised while reading configuration, tasks and simulation logs
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DataError {
    /// IO errors
    #[error("IO error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// A required field is absent from a simulation entry
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    /// A domain could not be derived
    #[error("Cannot determine domain for {0}")]
    MissingDomain(String),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A prepared record violates record invariants
    #[error("Invalid record: {0}")]
    Record(#[from] RecordError),
}

impl DataError {
    /// Create a new missing field error
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }

    /// Create a new invalid configuration error
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig(message.into())
    }
}

impl From<std::io::Error> for DataError {
    fn from(error: std::io::Error) -> Self {
        Self::Io(error.to_string())
    }
}

impl From<serde_json::Error> for DataError {
    fn from(error: serde_json::Error) -> Self {
        Self::Json(error.to_string())
    }
}
