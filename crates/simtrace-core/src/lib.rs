//! Simtrace Core Library
//!
//! Episode aggregation, live video metrics and best-checkpoint selection for
//! a training loop that alternates between TRAIN and EVAL phases.

pub mod aggregator;
pub mod clock;
pub mod domain;
pub mod events;
pub mod metrics;
pub mod model_picker;
pub mod obs;
pub mod reset_counters;
pub mod session;
pub mod sim_trace;
pub mod telemetry;
pub mod video_metrics;

pub use aggregator::{EpisodeAggregator, EpisodeState};
pub use clock::{Clock, ManualClock, SystemClock};
pub use domain::{
    parse_step, CheckpointStats, CheckpointStatsRecord, EpisodeBatch, EpisodeRecord,
    EpisodeStatus, MetricsError, Phase, ResetCounters, ResetCounts, Result, StepRecord,
    ValidationError, NO_EVALUATION_MEAN, STEP_FIELDS,
};
pub use events::{apply_event, channel, run_session, PhaseNotifier, SessionSummary, SimEvent};
pub use model_picker::{mean_completion, ModelPicker, PickerState};
pub use reset_counters::ResetCounterTracker;
pub use session::{MetricsSession, SessionConfig};
pub use sim_trace::{sim_trace_log, SimTraceWriter};
pub use video_metrics::{
    VideoMetricsHandle, VideoMetricsResponse, VideoMetricsSnapshot, VideoMetricsView,
};

pub use simtrace_store::{
    CheckpointSource, FsCheckpointSource, FsMetricsPublisher, MetricsPublisher,
    PublishDestination, StoreError,
};
