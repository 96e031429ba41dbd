//! Domain-level error taxonomy for simtrace.

use simtrace_store::StoreError;

/// Errors produced by step record validation.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ValidationError {
    #[error("step record must be a JSON object")]
    NotAnObject,

    #[error("step record missing required field: {field}")]
    MissingField { field: String },

    #[error("step record field has the wrong type: {reason}")]
    InvalidField { reason: String },

    #[error("progress {progress} outside [0, 100]")]
    ProgressOutOfRange { progress: f64 },
}

/// simtrace domain errors.
#[derive(Debug, thiserror::Error)]
pub enum MetricsError {
    #[error("malformed step record: {0}")]
    MalformedRecord(#[from] ValidationError),

    #[error("publish failure: {0}")]
    PublishFailure(#[source] StoreError),

    #[error("checkpoint unavailable: {0}")]
    CheckpointUnavailable(String),

    #[error("event channel closed")]
    ChannelClosed,

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for simtrace domain operations.
pub type Result<T> = std::result::Result<T, MetricsError>;
