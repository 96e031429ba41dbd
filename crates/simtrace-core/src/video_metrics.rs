//! Live video-overlay metrics.
//!
//! [`VideoMetricsView`] is the single writer: it is updated once per ingested
//! step and publishes a complete, immutable [`VideoMetricsSnapshot`] by
//! swapping an `Arc` in an [`ArcSwap`]. Readers hold a cloneable
//! [`VideoMetricsHandle`] and always observe one whole snapshot, never a
//! mix of two updates. Loads are lock-free, so polling never delays the
//! step path.

use std::sync::Arc;

use arc_swap::ArcSwap;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::aggregator::EpisodeState;
use crate::clock::{elapsed_millis, elapsed_seconds, Clock};
use crate::domain::{Phase, StepRecord};

/// Everything the overlay renderer can show at one instant.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct VideoMetricsSnapshot {
    pub lap_counter: u64,
    pub completion_percentage: f64,
    pub reset_counter: u64,
    /// Ground speed derived from successive positions, in track units per second.
    pub speed: f64,
    pub steering: f64,
    /// Fastest closed episode in milliseconds; `None` until one closes.
    pub best_lap_time: Option<i64>,
    pub total_evaluation_time: i64,
    pub done: bool,
    /// `steps` of the step record this snapshot was derived from.
    pub step: u64,
}

/// Fixed-order query response:
/// `(lap_counter, completion_percentage, reset_counter, speed, steering,
/// best_lap_time, total_evaluation_time, done)`.
pub type VideoMetricsResponse = (u64, f64, u64, f64, f64, Option<i64>, i64, bool);

impl VideoMetricsSnapshot {
    pub fn to_response(&self) -> VideoMetricsResponse {
        (
            self.lap_counter,
            self.completion_percentage,
            self.reset_counter,
            self.speed,
            self.steering,
            self.best_lap_time,
            self.total_evaluation_time,
            self.done,
        )
    }
}

/// Reader side. Cheap to clone and safe to use from any thread.
#[derive(Clone)]
pub struct VideoMetricsHandle {
    cell: Arc<ArcSwap<VideoMetricsSnapshot>>,
}

impl VideoMetricsHandle {
    /// Copy of the latest published snapshot.
    pub fn snapshot(&self) -> VideoMetricsSnapshot {
        VideoMetricsSnapshot::clone(&self.cell.load())
    }

    /// The latest snapshot without copying it.
    pub fn load(&self) -> Arc<VideoMetricsSnapshot> {
        self.cell.load_full()
    }

    pub fn query(&self) -> VideoMetricsResponse {
        self.cell.load().to_response()
    }
}

/// Writer side, owned by the step-ingestion path.
pub struct VideoMetricsView {
    clock: Arc<dyn Clock>,
    continuous: bool,
    cell: Arc<ArcSwap<VideoMetricsSnapshot>>,
    previous: Option<(f64, f64, DateTime<Utc>)>,
}

impl VideoMetricsView {
    /// `continuous` races show the reset total for the whole race; otherwise
    /// the counter is per lap.
    pub fn new(clock: Arc<dyn Clock>, continuous: bool) -> Self {
        Self {
            clock,
            continuous,
            cell: Arc::new(ArcSwap::from_pointee(VideoMetricsSnapshot::default())),
            previous: None,
        }
    }

    pub fn handle(&self) -> VideoMetricsHandle {
        VideoMetricsHandle {
            cell: Arc::clone(&self.cell),
        }
    }

    /// Derive a new snapshot from `step` and `state` and publish it.
    pub fn update(&mut self, step: &StepRecord, state: &EpisodeState) {
        let now = self.clock.now();
        let speed = match self.previous {
            Some((px, py, at)) => {
                let dt = elapsed_seconds(at, now);
                if dt > 0.0 {
                    (step.x - px).hypot(step.y - py) / dt
                } else {
                    0.0
                }
            }
            None => 0.0,
        };
        self.previous = Some((step.x, step.y, now));

        let mut reset_counter = state.resets.total();
        if self.continuous {
            reset_counter += state.cumulative_resets;
        }

        let in_flight_ms = match state.phase {
            Phase::Eval => elapsed_millis(state.start_time, now).max(0),
            Phase::Train => 0,
        };

        self.cell.store(Arc::new(VideoMetricsSnapshot {
            lap_counter: state.trial,
            completion_percentage: state.progress,
            reset_counter,
            speed,
            steering: step.steer,
            best_lap_time: state.best_elapsed_ms,
            total_evaluation_time: state.closed_eval_ms + in_flight_ms,
            done: step.done,
            step: step.steps,
        }));
    }
}
