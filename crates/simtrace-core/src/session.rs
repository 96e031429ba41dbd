//! Metrics session: one agent's aggregator, live view, model picker and
//! sim-trace writer behind a single owner.
//!
//! All mutation goes through `&mut MetricsSession`, so step ingestion and
//! phase handling are serialized by construction. The only state shared
//! with other threads is the video snapshot, read through
//! [`VideoMetricsHandle`].

use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use simtrace_store::{CheckpointSource, MetricsPublisher, PublishDestination};
use tracing::debug;

use crate::aggregator::EpisodeAggregator;
use crate::clock::Clock;
use crate::domain::{
    parse_step, CheckpointStats, CheckpointStatsRecord, EpisodeBatch, EpisodeRecord, MetricsError,
    Phase, Result, StepRecord,
};
use crate::metrics::METRICS;
use crate::model_picker::ModelPicker;
use crate::obs;
use crate::sim_trace::{sim_trace_log, SimTraceWriter};
use crate::video_metrics::{VideoMetricsHandle, VideoMetricsView};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub agent_name: String,
    pub initial_phase: Phase,
    /// Continuous races show the reset total for the whole race.
    pub continuous: bool,
    pub use_model_picker: bool,
    /// Local sim-trace root; no CSV files are written when unset.
    pub simtrace_dir: Option<PathBuf>,
    pub metrics_destination: PublishDestination,
    pub model_destination: PublishDestination,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            agent_name: "agent".to_string(),
            initial_phase: Phase::Train,
            continuous: false,
            use_model_picker: true,
            simtrace_dir: None,
            metrics_destination: PublishDestination::new(
                "metrics",
                "training_metrics.json",
                "us-east-1",
            ),
            model_destination: PublishDestination::new(
                "models",
                "model/deepracer_checkpoints.json",
                "us-east-1",
            ),
        }
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

pub struct MetricsSession {
    config: SessionConfig,
    publisher: Arc<dyn MetricsPublisher>,
    aggregator: EpisodeAggregator,
    video: VideoMetricsView,
    picker: ModelPicker,
    sim_trace: Option<SimTraceWriter>,
    last_phase: Option<Phase>,
    steps_ingested: u64,
}

impl MetricsSession {
    /// Build a session. Creates the sim-trace directories when configured.
    pub fn new(
        config: SessionConfig,
        publisher: Arc<dyn MetricsPublisher>,
        checkpoints: Arc<dyn CheckpointSource>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        let sim_trace = match &config.simtrace_dir {
            Some(root) => Some(SimTraceWriter::create(root, &config.agent_name)?),
            None => None,
        };
        let picker = ModelPicker::new(
            checkpoints,
            publisher.clone(),
            config.model_destination.clone(),
            clock.clone(),
            config.use_model_picker,
        );
        obs::emit_session_started(
            &config.agent_name,
            config.initial_phase,
            config.continuous,
            config.use_model_picker,
        );
        Ok(Self {
            aggregator: EpisodeAggregator::new(clock.clone(), config.initial_phase),
            video: VideoMetricsView::new(clock, config.continuous),
            picker,
            sim_trace,
            publisher,
            last_phase: None,
            steps_ingested: 0,
            config,
        })
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn phase(&self) -> Phase {
        self.aggregator.phase()
    }

    pub fn aggregator(&self) -> &EpisodeAggregator {
        &self.aggregator
    }

    pub fn best(&self) -> &CheckpointStats {
        self.picker.best()
    }

    pub fn last(&self) -> Option<&CheckpointStats> {
        self.picker.last()
    }

    pub fn steps_ingested(&self) -> u64 {
        self.steps_ingested
    }

    /// Reader handle for the live overlay snapshot.
    pub fn video_metrics(&self) -> VideoMetricsHandle {
        self.video.handle()
    }

    /// Begin a new episode. Returns the reset total of the window just closed.
    pub fn start_episode(&mut self) -> u64 {
        let prior = self.aggregator.reset();
        debug!(
            phase = %self.aggregator.phase(),
            counter = self.aggregator.trace_counter(),
            prior_resets = prior,
            "episode started"
        );
        prior
    }

    /// Validate a raw step and fold it into the running episode.
    ///
    /// # Errors
    ///
    /// - `MetricsError::MalformedRecord`: the step failed validation; no
    ///   state was modified.
    /// - `MetricsError::Io`: the sim-trace file could not be written.
    pub fn ingest_step(&mut self, raw: &Value) -> Result<()> {
        let step = parse_step(raw).map_err(|e| {
            METRICS.inc_malformed_steps();
            MetricsError::from(e)
        })?;
        self.ingest_record(step)
    }

    /// Fold an already-typed step into the running episode.
    pub fn ingest_record(&mut self, mut step: StepRecord) -> Result<()> {
        if let Err(e) = self.aggregator.ingest(&step) {
            METRICS.inc_malformed_steps();
            return Err(e);
        }

        // The step is accepted once the aggregator has it; a failed trace
        // write must not leave the snapshot behind.
        self.video.update(&step, &self.aggregator.episode_state());
        self.steps_ingested += 1;
        METRICS.inc_steps_ingested();

        step.episode = self.aggregator.trace_counter() as i64;
        sim_trace_log(&step);
        if let Some(writer) = &self.sim_trace {
            writer.append(self.aggregator.phase(), &step)?;
        }
        Ok(())
    }

    /// Close the running episode and republish the cumulative batch.
    ///
    /// # Errors
    ///
    /// `MetricsError::PublishFailure` if the batch could not be stored. The
    /// episode stays closed and will be included in the next batch.
    pub async fn end_episode(&mut self) -> Result<EpisodeRecord> {
        let record = self.aggregator.close_episode();
        obs::emit_episode_closed(&record);
        METRICS.inc_episodes_closed();

        let payload = serde_json::to_value(EpisodeBatch {
            metrics: self.aggregator.records(),
        })?;
        let destination = &self.config.metrics_destination;
        if let Err(e) = self.publisher.publish(destination, &payload).await {
            obs::emit_publish_failed(destination, &e);
            return Err(MetricsError::PublishFailure(e));
        }
        Ok(record)
    }

    /// Apply a phase notification.
    ///
    /// Entering EVAL restarts trial numbering. Leaving EVAL for TRAIN scores
    /// the window when model picking is enabled; the published record is
    /// returned in that case.
    pub async fn on_phase(&mut self, phase: Phase) -> Result<Option<CheckpointStatsRecord>> {
        let previous = self.last_phase;
        if previous != Some(phase) {
            obs::emit_phase_changed(previous, phase);
        }
        self.last_phase = Some(phase);

        self.aggregator.set_phase(phase);
        if phase == Phase::Eval && previous != Some(Phase::Eval) {
            self.aggregator.reset_trials();
        }
        self.picker.on_phase(phase, &mut self.aggregator).await
    }

    /// Number of evaluation windows the picker has scored.
    pub fn windows_evaluated(&self) -> u64 {
        self.picker.windows_evaluated()
    }
}
