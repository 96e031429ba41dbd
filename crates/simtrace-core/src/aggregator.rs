//! Episode aggregation.
//!
//! [`EpisodeAggregator`] folds validated [`StepRecord`]s into a running
//! episode summary and closes it into an [`EpisodeRecord`]. It also owns the
//! state other components derive from closed episodes: the reset tracker,
//! the evaluation completion samples drained by the model picker, and the
//! lap-time history shown on the video overlay.
//!
//! Reset tallies, lap times and completion samples are evaluation-only:
//! TRAIN steps and episodes never feed them.
//!
//! Counters:
//! - `episode` advances on every close in TRAIN and never in EVAL.
//! - `trial` advances on every close in either phase; it is zeroed by
//!   [`EpisodeAggregator::reset_trials`] at phase-window boundaries.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::clock::{elapsed_millis, Clock};
use crate::domain::validation::validate_step;
use crate::domain::{EpisodeRecord, EpisodeStatus, Phase, ResetCounters, Result, StepRecord};
use crate::reset_counters::ResetCounterTracker;

/// Read-only view of the in-flight episode, consumed by the snapshot view.
#[derive(Debug, Clone, PartialEq)]
pub struct EpisodeState {
    pub phase: Phase,
    pub episode: u64,
    pub trial: u64,
    pub progress: f64,
    pub start_time: DateTime<Utc>,
    /// Failure counts for the current window.
    pub resets: ResetCounters,
    /// Failure counts of all previously closed windows.
    pub cumulative_resets: u64,
    /// Fastest closed evaluation episode, if any has closed.
    pub best_elapsed_ms: Option<i64>,
    /// Total duration of closed evaluation episodes.
    pub closed_eval_ms: i64,
}

pub struct EpisodeAggregator {
    clock: Arc<dyn Clock>,
    phase: Phase,
    episode: u64,
    trial: u64,
    start_time: DateTime<Utc>,
    reward: f64,
    progress: f64,
    status: EpisodeStatus,
    resets: ResetCounterTracker,
    completion_samples: Vec<f64>,
    best_elapsed_ms: Option<i64>,
    closed_eval_ms: i64,
    records: Vec<EpisodeRecord>,
}

impl EpisodeAggregator {
    pub fn new(clock: Arc<dyn Clock>, phase: Phase) -> Self {
        let start_time = clock.now();
        Self {
            clock,
            phase,
            episode: 0,
            trial: 0,
            start_time,
            reward: 0.0,
            progress: 0.0,
            status: EpisodeStatus::default(),
            resets: ResetCounterTracker::new(),
            completion_samples: Vec::new(),
            best_elapsed_ms: None,
            closed_eval_ms: 0,
            records: Vec::new(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn set_phase(&mut self, phase: Phase) {
        self.phase = phase;
    }

    pub fn episode(&self) -> u64 {
        self.episode
    }

    pub fn trial(&self) -> u64 {
        self.trial
    }

    /// Counter written into the sim-trace `episode` column: the episode
    /// number while training, the trial number while evaluating.
    pub fn trace_counter(&self) -> u64 {
        match self.phase {
            Phase::Train => self.episode,
            Phase::Eval => self.trial,
        }
    }

    pub fn reward(&self) -> f64 {
        self.reward
    }

    pub fn progress(&self) -> f64 {
        self.progress
    }

    pub fn status(&self) -> EpisodeStatus {
        self.status
    }

    pub fn resets(&self) -> &ResetCounterTracker {
        &self.resets
    }

    /// Fold one step into the running episode.
    ///
    /// The step is range-checked first; on error nothing is modified.
    pub fn ingest(&mut self, step: &StepRecord) -> Result<()> {
        validate_step(step)?;
        self.reward += step.reward;
        self.progress = step.progress;
        self.status = step.episode_status;
        if self.phase == Phase::Eval {
            self.resets.record_status(step.episode_status);
        }
        Ok(())
    }

    /// Close the running episode and append it to the record list.
    ///
    /// Counters are not cleared here; call [`reset`](Self::reset) when the
    /// next episode starts.
    pub fn close_episode(&mut self) -> EpisodeRecord {
        if self.phase == Phase::Train {
            self.episode += 1;
        }
        self.trial += 1;

        let now = self.clock.now();
        // A clock that stepped backwards yields a zero-length episode.
        let elapsed = elapsed_millis(self.start_time, now).max(0);
        let resets = match self.phase {
            Phase::Eval => Some(self.resets.current_totals().into()),
            Phase::Train => None,
        };

        let record = EpisodeRecord {
            reward_score: self.reward.round() as i64,
            metric_time: now.timestamp_millis(),
            start_time: self.start_time.timestamp_millis(),
            elapsed_time_in_milliseconds: elapsed,
            episode: self.episode,
            trial: self.trial,
            phase: self.phase,
            completion_percentage: self.progress as i64,
            episode_status: self.status.label().to_string(),
            resets,
        };

        if self.phase == Phase::Eval {
            self.best_elapsed_ms = Some(self.best_elapsed_ms.map_or(elapsed, |b| b.min(elapsed)));
            self.closed_eval_ms += elapsed;
            self.completion_samples.push(self.progress);
        }
        self.records.push(record.clone());
        record
    }

    /// Start a new episode: restart timing, clear reward/progress/status and
    /// close the reset window. Returns the closed window's reset total.
    pub fn reset(&mut self) -> u64 {
        self.start_time = self.clock.now();
        self.reward = 0.0;
        self.progress = 0.0;
        self.status = EpisodeStatus::default();
        self.resets.window_reset()
    }

    pub fn reset_trials(&mut self) {
        self.trial = 0;
    }

    /// Take the evaluation completion samples collected since the last drain.
    pub fn drain_completion_samples(&mut self) -> Vec<f64> {
        std::mem::take(&mut self.completion_samples)
    }

    pub fn completion_samples(&self) -> &[f64] {
        &self.completion_samples
    }

    /// Every episode closed so far, oldest first.
    pub fn records(&self) -> &[EpisodeRecord] {
        &self.records
    }

    pub fn episode_state(&self) -> EpisodeState {
        EpisodeState {
            phase: self.phase,
            episode: self.episode,
            trial: self.trial,
            progress: self.progress,
            start_time: self.start_time,
            resets: self.resets.current_totals(),
            cumulative_resets: self.resets.cumulative_total(),
            best_elapsed_ms: self.best_elapsed_ms,
            closed_eval_ms: self.closed_eval_ms,
        }
    }
}
