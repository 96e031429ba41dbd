//! Episode records and the phases they belong to.

use serde::{Deserialize, Serialize};

use super::step::EpisodeStatus;

/// Phase of the outer training loop.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Phase {
    #[serde(rename = "training", alias = "train", alias = "TRAIN")]
    Train,
    #[serde(rename = "evaluation", alias = "eval", alias = "EVAL")]
    Eval,
}

impl Phase {
    pub fn is_eval(self) -> bool {
        matches!(self, Phase::Eval)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Train => "training",
            Phase::Eval => "evaluation",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-status failure counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResetCounters {
    pub crashed: u64,
    pub off_track: u64,
    pub immobilized: u64,
    pub reversed: u64,
}

impl ResetCounters {
    /// Increment the counter for `status`; statuses outside the failure set
    /// (see [`EpisodeStatus::is_failure`]) are ignored.
    pub fn increment(&mut self, status: EpisodeStatus) {
        let slot = match status {
            EpisodeStatus::Crashed => &mut self.crashed,
            EpisodeStatus::OffTrack => &mut self.off_track,
            EpisodeStatus::Immobilized => &mut self.immobilized,
            EpisodeStatus::Reversed => &mut self.reversed,
            _ => return,
        };
        *slot += 1;
    }

    pub fn total(&self) -> u64 {
        self.crashed + self.off_track + self.immobilized + self.reversed
    }
}

/// Reset counts as they appear in an evaluation episode record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResetCounts {
    pub crash_count: u64,
    pub immobilized_count: u64,
    pub off_track_count: u64,
    pub reversed_count: u64,
    pub reset_count: u64,
}

impl From<ResetCounters> for ResetCounts {
    fn from(c: ResetCounters) -> Self {
        Self {
            crash_count: c.crashed,
            immobilized_count: c.immobilized,
            off_track_count: c.off_track,
            reversed_count: c.reversed,
            reset_count: c.total(),
        }
    }
}

/// Summary of one finished episode (TRAIN) or trial (EVAL).
///
/// Times are epoch milliseconds. `resets` is only present for evaluation
/// records and is flattened into the top-level object when serialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodeRecord {
    pub reward_score: i64,
    pub metric_time: i64,
    pub start_time: i64,
    pub elapsed_time_in_milliseconds: i64,
    pub episode: u64,
    pub trial: u64,
    pub phase: Phase,
    pub completion_percentage: i64,
    pub episode_status: String,
    #[serde(flatten)]
    pub resets: Option<ResetCounts>,
}

/// Payload shape for episode batches: `{"metrics": [...]}`.
#[derive(Debug, Clone, Serialize)]
pub struct EpisodeBatch<'a> {
    pub metrics: &'a [EpisodeRecord],
}
