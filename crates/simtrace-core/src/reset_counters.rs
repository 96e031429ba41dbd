//! Failure-reset tallies.
//!
//! The tracker keeps per-window counts (a window is one lap/episode) and a
//! cumulative total across windows. The cumulative total only matters for
//! continuous races, where the overlay shows resets for the whole race
//! rather than per lap.

use crate::domain::{EpisodeStatus, ResetCounters};

#[derive(Debug, Clone, Default)]
pub struct ResetCounterTracker {
    window: ResetCounters,
    cumulative: u64,
}

impl ResetCounterTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count `status` if it is a failure; other statuses are ignored.
    pub fn record_status(&mut self, status: EpisodeStatus) {
        if status.is_failure() {
            self.window.increment(status);
        }
    }

    /// Fold the current window into the cumulative total, zero the window,
    /// and return the window's total before the reset.
    pub fn window_reset(&mut self) -> u64 {
        let prior = self.window.total();
        self.cumulative += prior;
        self.window = ResetCounters::default();
        prior
    }

    /// Counts for the current window.
    pub fn current_totals(&self) -> ResetCounters {
        self.window
    }

    /// Sum of all windows closed by [`window_reset`](Self::window_reset).
    pub fn cumulative_total(&self) -> u64 {
        self.cumulative
    }
}
