//! Step records and episode status.

use serde::{Deserialize, Serialize};

/// Field names of a step record, in sim-trace column order.
pub const STEP_FIELDS: [&str; 16] = [
    "episode",
    "steps",
    "X",
    "Y",
    "yaw",
    "steer",
    "throttle",
    "action",
    "reward",
    "done",
    "all_wheels_on_track",
    "progress",
    "closest_waypoint",
    "track_len",
    "tstamp",
    "episode_status",
];

/// Status of the controlled agent at a given step.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum EpisodeStatus {
    #[default]
    InProgress,
    Crashed,
    OffTrack,
    Immobilized,
    Reversed,
    TimeUp,
    LapComplete,
    Pause,
    Prepare,
    Park,
    /// Any status string this build does not know about.
    #[serde(other)]
    Unknown,
}

impl EpisodeStatus {
    /// Wire name of the status.
    pub fn as_str(self) -> &'static str {
        match self {
            EpisodeStatus::InProgress => "in_progress",
            EpisodeStatus::Crashed => "crashed",
            EpisodeStatus::OffTrack => "off_track",
            EpisodeStatus::Immobilized => "immobilized",
            EpisodeStatus::Reversed => "reversed",
            EpisodeStatus::TimeUp => "time_up",
            EpisodeStatus::LapComplete => "lap_complete",
            EpisodeStatus::Pause => "pause",
            EpisodeStatus::Prepare => "prepare",
            EpisodeStatus::Park => "park",
            EpisodeStatus::Unknown => "unknown",
        }
    }

    /// Human-readable label written into episode records.
    pub fn label(self) -> &'static str {
        match self {
            EpisodeStatus::InProgress => "In progress",
            EpisodeStatus::Crashed => "Crashed",
            EpisodeStatus::OffTrack => "Off track",
            EpisodeStatus::Immobilized => "Immobilized",
            EpisodeStatus::Reversed => "Reversed",
            EpisodeStatus::TimeUp => "Time up",
            EpisodeStatus::LapComplete => "Lap complete",
            EpisodeStatus::Pause => "Pause",
            _ => "---",
        }
    }

    /// Whether the status counts as a reset (the agent had to be put back
    /// on track).
    pub fn is_failure(self) -> bool {
        matches!(
            self,
            EpisodeStatus::Crashed
                | EpisodeStatus::OffTrack
                | EpisodeStatus::Immobilized
                | EpisodeStatus::Reversed
        )
    }
}

impl std::fmt::Display for EpisodeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One simulation step.
///
/// Field order matches [`STEP_FIELDS`]; serialization preserves it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepRecord {
    pub episode: i64,
    pub steps: u64,
    #[serde(rename = "X")]
    pub x: f64,
    #[serde(rename = "Y")]
    pub y: f64,
    pub yaw: f64,
    pub steer: f64,
    pub throttle: f64,
    pub action: i64,
    pub reward: f64,
    pub done: bool,
    pub all_wheels_on_track: bool,
    /// Progress toward lap completion, 0–100.
    pub progress: f64,
    pub closest_waypoint: i64,
    pub track_len: f64,
    /// Simulation timestamp in seconds.
    pub tstamp: f64,
    pub episode_status: EpisodeStatus,
}

impl StepRecord {
    /// Column values for the local sim-trace CSV, in [`STEP_FIELDS`] order.
    pub fn trace_values(&self) -> Vec<String> {
        vec![
            self.episode.to_string(),
            self.steps.to_string(),
            self.x.to_string(),
            self.y.to_string(),
            self.yaw.to_string(),
            self.steer.to_string(),
            self.throttle.to_string(),
            self.action.to_string(),
            self.reward.to_string(),
            self.done.to_string(),
            self.all_wheels_on_track.to_string(),
            self.progress.to_string(),
            self.closest_waypoint.to_string(),
            self.track_len.to_string(),
            self.tstamp.to_string(),
            self.episode_status.to_string(),
        ]
    }

    /// Fixed-precision line used for the `SIM_TRACE_LOG:` log stream.
    pub fn log_line(&self) -> String {
        format!(
            "{},{},{:.4},{:.4},{:.4},{:.2},{:.2},{},{:.4},{},{},{:.4},{},{:.2},{},{}",
            self.episode,
            self.steps,
            self.x,
            self.y,
            self.yaw,
            self.steer,
            self.throttle,
            self.action,
            self.reward,
            self.done,
            self.all_wheels_on_track,
            self.progress,
            self.closest_waypoint,
            self.track_len,
            self.tstamp,
            self.episode_status,
        )
    }
}
