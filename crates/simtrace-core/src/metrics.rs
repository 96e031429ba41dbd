//! Process-wide counters for the ingestion and selection paths.
//!
//! Counters are bumped at the call site and reported together by
//! [`Metrics::flush`], typically once when a session ends.

use std::sync::atomic::{AtomicU64, Ordering};

pub static METRICS: Metrics = Metrics::new();

pub struct Metrics {
    steps_ingested: AtomicU64,
    malformed_steps: AtomicU64,
    episodes_closed: AtomicU64,
    windows_evaluated: AtomicU64,
    best_updates: AtomicU64,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub const fn new() -> Self {
        Self {
            steps_ingested: AtomicU64::new(0),
            malformed_steps: AtomicU64::new(0),
            episodes_closed: AtomicU64::new(0),
            windows_evaluated: AtomicU64::new(0),
            best_updates: AtomicU64::new(0),
        }
    }

    pub fn inc_steps_ingested(&self) {
        self.steps_ingested.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_malformed_steps(&self) {
        self.malformed_steps.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "malformed_steps", "counter incremented");
    }

    pub fn inc_episodes_closed(&self) {
        self.episodes_closed.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "episodes_closed", "counter incremented");
    }

    pub fn inc_windows_evaluated(&self) {
        self.windows_evaluated.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "windows_evaluated", "counter incremented");
    }

    pub fn inc_best_updates(&self) {
        self.best_updates.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "best_updates", "counter incremented");
    }

    /// Emit all current counter values as a single `info!` event.
    pub fn flush(&self) {
        tracing::info!(
            metric = "flush",
            steps_ingested = self.steps_ingested(),
            malformed_steps = self.malformed_steps(),
            episodes_closed = self.episodes_closed(),
            windows_evaluated = self.windows_evaluated(),
            best_updates = self.best_updates(),
        );
    }

    pub fn steps_ingested(&self) -> u64 {
        self.steps_ingested.load(Ordering::Relaxed)
    }

    pub fn malformed_steps(&self) -> u64 {
        self.malformed_steps.load(Ordering::Relaxed)
    }

    pub fn episodes_closed(&self) -> u64 {
        self.episodes_closed.load(Ordering::Relaxed)
    }

    pub fn windows_evaluated(&self) -> u64 {
        self.windows_evaluated.load(Ordering::Relaxed)
    }

    pub fn best_updates(&self) -> u64 {
        self.best_updates.load(Ordering::Relaxed)
    }

    /// Zero every counter (tests only touch private instances).
    pub fn reset(&self) {
        self.steps_ingested.store(0, Ordering::Relaxed);
        self.malformed_steps.store(0, Ordering::Relaxed);
        self.episodes_closed.store(0, Ordering::Relaxed);
        self.windows_evaluated.store(0, Ordering::Relaxed);
        self.best_updates.store(0, Ordering::Relaxed);
    }
}
