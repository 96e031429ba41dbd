//! Boundary trait definitions for simtrace
//!
//! These traits define what the metrics core needs from the outside world:
//! - `MetricsPublisher`: durable storage of JSON payloads
//! - `CheckpointSource`: name of the most recently written checkpoint
//!
//! All traits are async and backend-agnostic. In-memory fakes are provided
//! for testing via the `fakes` module.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// Result type for boundary operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;

// ---------------------------------------------------------------------------
// MetricsPublisher: durable payload storage
// ---------------------------------------------------------------------------

/// Logical destination of a published payload: a bucket/key/region triple.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PublishDestination {
    pub bucket: String,
    pub key: String,
    pub region: String,
}

impl PublishDestination {
    pub fn new(
        bucket: impl Into<String>,
        key: impl Into<String>,
        region: impl Into<String>,
    ) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
            region: region.into(),
        }
    }
}

impl std::fmt::Display for PublishDestination {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{} ({})", self.bucket, self.key, self.region)
    }
}

/// Durable sink for metrics payloads.
///
/// Guarantees:
/// - A successful `publish` means the payload is stored at `destination`,
///   replacing whatever was there before.
/// - Errors are returned, never retried internally. Retry policy, if any,
///   belongs to the implementation's caller.
#[async_trait]
pub trait MetricsPublisher: Send + Sync {
    /// Store `payload` at `destination`.
    async fn publish(
        &self,
        destination: &PublishDestination,
        payload: &serde_json::Value,
    ) -> StoreResult<()>;
}

// ---------------------------------------------------------------------------
// CheckpointSource: latest checkpoint identifier
// ---------------------------------------------------------------------------

/// Reader for the identifier of the most recently persisted checkpoint.
///
/// Semantics:
/// - `Ok(Some(name))`: a checkpoint exists.
/// - `Ok(None)`: nothing has been written yet.
/// - `Err(_)`: the state exists but could not be read.
#[async_trait]
pub trait CheckpointSource: Send + Sync {
    /// Read the latest checkpoint name.
    async fn read_latest_name(&self) -> StoreResult<Option<String>>;
}
