//! Domain models for simtrace.
//!
//! Canonical definitions for the core entities:
//! - `StepRecord`: one simulation tick as emitted by the producer
//! - `EpisodeRecord`: summary of one finished episode or trial
//! - `CheckpointStats`: best/last checkpoint bookkeeping for the model picker
//! - `Phase`: TRAIN or EVAL

pub mod checkpoint;
pub mod episode;
pub mod error;
pub mod step;
pub mod validation;

// Re-export main types and errors
pub use checkpoint::{CheckpointStats, CheckpointStatsRecord, NO_EVALUATION_MEAN};
pub use episode::{EpisodeBatch, EpisodeRecord, Phase, ResetCounters, ResetCounts};
pub use error::{MetricsError, Result, ValidationError};
pub use step::{EpisodeStatus, StepRecord, STEP_FIELDS};
pub use validation::parse_step;
