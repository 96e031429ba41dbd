//! Simtrace-Store: external boundaries for the simtrace metrics engine
//!
//! This crate holds everything the metrics core talks to but does not own:
//! durable publishing of episode batches and checkpoint statistics, and
//! reading the name of the most recently written checkpoint.
//!
//! ## Layer 0 - Boundary
//!
//! Focus: narrow async traits the core can be tested against, plus local
//! filesystem implementations usable outside a cloud environment.
//!
//! ## Key Components
//!
//! - `MetricsPublisher`: writes a JSON payload to a bucket/key/region destination
//! - `CheckpointSource`: reports the identifier of the latest persisted checkpoint
//! - `FsMetricsPublisher` / `FsCheckpointSource`: filesystem-backed implementations
//! - `fakes`: in-memory implementations for tests

mod error;
pub mod fakes;
pub mod fs;
pub mod traits;

pub use error::StoreError;
pub use fs::{FsCheckpointSource, FsMetricsPublisher, CHECKPOINT_STATE_FILE};
pub use traits::{CheckpointSource, MetricsPublisher, PublishDestination, StoreResult};
