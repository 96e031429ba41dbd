//! Checkpoint statistics tracked by the model picker.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Mean reported for an evaluation window that produced no trials.
pub const NO_EVALUATION_MEAN: f64 = -1.0;

/// Mean completion of one evaluated checkpoint.
///
/// Serialized with the field names consumers of the model bucket expect:
/// `name`, `avg_comp_pct`, `time_stamp` (epoch seconds).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckpointStats {
    pub name: Option<String>,
    #[serde(rename = "avg_comp_pct")]
    pub avg_completion: f64,
    #[serde(rename = "time_stamp")]
    pub timestamp: f64,
}

impl CheckpointStats {
    pub fn new(name: Option<String>, avg_completion: f64, at: DateTime<Utc>) -> Self {
        Self {
            name,
            avg_completion,
            timestamp: epoch_seconds(at),
        }
    }

    /// Starting point for `best`: no name, zero completion.
    pub fn initial(at: DateTime<Utc>) -> Self {
        Self::new(None, 0.0, at)
    }
}

/// Combined record published after every evaluation window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckpointStatsRecord {
    pub best_checkpoint: CheckpointStats,
    pub last_checkpoint: CheckpointStats,
}

pub(crate) fn epoch_seconds(at: DateTime<Utc>) -> f64 {
    at.timestamp_micros() as f64 / 1_000_000.0
}
