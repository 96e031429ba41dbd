//! Best-checkpoint selection driven by phase changes.
//!
//! [`ModelPicker`] is a two-state machine (`Training`, `Evaluating`) fed by
//! phase notifications. The first notification only sets the state. Only
//! the EVAL → TRAIN edge does work, and only when selection is enabled:
//!
//! 1. Resolve the name of the checkpoint that was just evaluated.
//! 2. Zero the aggregator's trial counter.
//! 3. Drain the window's completion samples and average them; an empty
//!    window averages to [`NO_EVALUATION_MEAN`].
//! 4. Replace `best` when `mean >= best.avg_completion` (ties go to the
//!    newer checkpoint).
//! 5. Build `last` unconditionally and publish `{best, last}` together.
//! 6. Read the checkpoint name the next window will evaluate.

use std::sync::Arc;

use simtrace_store::{CheckpointSource, MetricsPublisher, PublishDestination};
use tracing::{debug, warn};

use crate::aggregator::EpisodeAggregator;
use crate::clock::Clock;
use crate::domain::{
    CheckpointStats, CheckpointStatsRecord, MetricsError, Phase, Result, NO_EVALUATION_MEAN,
};
use crate::metrics::METRICS;
use crate::obs;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickerState {
    Training,
    Evaluating,
}

/// Mean of `samples`, or [`NO_EVALUATION_MEAN`] when there are none.
pub fn mean_completion(samples: &[f64]) -> f64 {
    if samples.is_empty() {
        NO_EVALUATION_MEAN
    } else {
        samples.iter().sum::<f64>() / samples.len() as f64
    }
}

pub struct ModelPicker {
    checkpoints: Arc<dyn CheckpointSource>,
    publisher: Arc<dyn MetricsPublisher>,
    destination: PublishDestination,
    clock: Arc<dyn Clock>,
    enabled: bool,
    state: Option<PickerState>,
    window_checkpoint: Option<String>,
    best: CheckpointStats,
    last: Option<CheckpointStats>,
    windows_started: u64,
    windows_evaluated: u64,
}

impl ModelPicker {
    pub fn new(
        checkpoints: Arc<dyn CheckpointSource>,
        publisher: Arc<dyn MetricsPublisher>,
        destination: PublishDestination,
        clock: Arc<dyn Clock>,
        enabled: bool,
    ) -> Self {
        let best = CheckpointStats::initial(clock.now());
        Self {
            checkpoints,
            publisher,
            destination,
            clock,
            enabled,
            state: None,
            window_checkpoint: None,
            best,
            last: None,
            windows_started: 0,
            windows_evaluated: 0,
        }
    }

    pub fn state(&self) -> Option<PickerState> {
        self.state
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn best(&self) -> &CheckpointStats {
        &self.best
    }

    pub fn last(&self) -> Option<&CheckpointStats> {
        self.last.as_ref()
    }

    /// Checkpoint the current (or next) evaluation window is attributed to.
    pub fn window_checkpoint(&self) -> Option<&str> {
        self.window_checkpoint.as_deref()
    }

    /// Number of evaluation windows entered so far.
    pub fn windows_started(&self) -> u64 {
        self.windows_started
    }

    /// Number of evaluation windows scored and published.
    pub fn windows_evaluated(&self) -> u64 {
        self.windows_evaluated
    }

    /// React to a phase notification.
    ///
    /// Returns the published `{best, last}` record when the notification
    /// closed an evaluation window, `None` otherwise.
    ///
    /// # Errors
    ///
    /// - `MetricsError::CheckpointUnavailable`: the evaluated checkpoint's
    ///   name could not be determined, or the checkpoint source failed.
    /// - `MetricsError::PublishFailure`: the publisher rejected the record.
    pub async fn on_phase(
        &mut self,
        phase: Phase,
        aggregator: &mut EpisodeAggregator,
    ) -> Result<Option<CheckpointStatsRecord>> {
        let previous = self.state;
        match phase {
            Phase::Eval => {
                if previous != Some(PickerState::Evaluating) {
                    self.windows_started += 1;
                    debug!(window = self.windows_started, "evaluation window started");
                }
                self.state = Some(PickerState::Evaluating);
                Ok(None)
            }
            Phase::Train => {
                self.state = Some(PickerState::Training);
                if previous == Some(PickerState::Evaluating) && self.enabled {
                    self.close_window(aggregator).await.map(Some)
                } else {
                    Ok(None)
                }
            }
        }
    }

    async fn close_window(
        &mut self,
        aggregator: &mut EpisodeAggregator,
    ) -> Result<CheckpointStatsRecord> {
        let name = match self.window_checkpoint.clone() {
            Some(name) => name,
            None => {
                let name = self.read_checkpoint().await?.ok_or_else(|| {
                    MetricsError::CheckpointUnavailable(
                        "no checkpoint written before the evaluation window closed".to_string(),
                    )
                })?;
                self.window_checkpoint = Some(name.clone());
                name
            }
        };

        aggregator.reset_trials();
        let samples = aggregator.drain_completion_samples();
        let mean = mean_completion(&samples);
        obs::emit_window_evaluated(&name, &samples, mean);

        let now = self.clock.now();
        if mean >= self.best.avg_completion {
            obs::emit_best_updated(
                self.best.name.as_deref(),
                &name,
                self.best.avg_completion,
                mean,
            );
            METRICS.inc_best_updates();
            self.best = CheckpointStats::new(Some(name.clone()), mean, now);
        }
        let last = CheckpointStats::new(Some(name), mean, now);
        self.last = Some(last.clone());

        let record = CheckpointStatsRecord {
            best_checkpoint: self.best.clone(),
            last_checkpoint: last,
        };
        let payload = serde_json::to_value(&record)?;
        if let Err(e) = self.publisher.publish(&self.destination, &payload).await {
            obs::emit_publish_failed(&self.destination, &e);
            return Err(MetricsError::PublishFailure(e));
        }

        // Training resumes on a fresh checkpoint; that is what the next window evaluates.
        match self.read_checkpoint().await? {
            Some(next) => self.window_checkpoint = Some(next),
            None => warn!(
                checkpoint = ?self.window_checkpoint,
                "no checkpoint available for next window, keeping previous name"
            ),
        }

        self.windows_evaluated += 1;
        METRICS.inc_windows_evaluated();
        Ok(record)
    }

    async fn read_checkpoint(&self) -> Result<Option<String>> {
        self.checkpoints
            .read_latest_name()
            .await
            .map_err(|e| MetricsError::CheckpointUnavailable(e.to_string()))
    }
}
