//! Error types for simtrace-store

use thiserror::Error;

/// Errors raised at the publishing and checkpoint boundaries
#[derive(Error, Debug)]
pub enum StoreError {
    /// The destination rejected the write or it could not be completed
    #[error("Publish to {destination} failed: {reason}")]
    Publish { destination: String, reason: String },

    /// The checkpoint state could not be read
    #[error("Checkpoint state read from {path} failed: {reason}")]
    CheckpointRead { path: String, reason: String },

    /// Filesystem error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Payload serialization error
    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}
