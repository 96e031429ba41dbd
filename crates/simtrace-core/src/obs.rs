//! Structured lifecycle events for a metrics session.
//!
//! - `SessionSpan` scopes every event of one session under the agent name
//! - `emit_*` functions log episode closes, window evaluation, best-checkpoint
//!   changes, phase transitions and publish failures
//!
//! Events are emitted at `info!` (failures at `warn!`); filter with `RUST_LOG`.

use std::fmt::Display;

use simtrace_store::PublishDestination;
use tracing::{info, warn};

use crate::domain::{EpisodeRecord, Phase};

/// RAII guard that enters a session-scoped span.
///
/// ```ignore
/// let _span = SessionSpan::enter("agent0");
/// // events below carry agent = "agent0"
/// ```
pub struct SessionSpan {
    _span: tracing::span::EnteredSpan,
}

impl SessionSpan {
    pub fn enter(agent: &str) -> Self {
        Self {
            _span: session_span(agent).entered(),
        }
    }
}

/// The session span itself, for instrumenting futures that cross `.await`.
pub fn session_span(agent: &str) -> tracing::Span {
    tracing::info_span!("simtrace.session", agent = %agent)
}

pub fn emit_session_started(agent: &str, phase: Phase, continuous: bool, model_picker: bool) {
    info!(
        event = "session.started",
        agent = %agent,
        phase = %phase,
        continuous = continuous,
        model_picker = model_picker,
    );
}

pub fn emit_episode_closed(record: &EpisodeRecord) {
    info!(
        event = "episode.closed",
        phase = %record.phase,
        episode = record.episode,
        trial = record.trial,
        reward = record.reward_score,
        completion = record.completion_percentage,
        elapsed_ms = record.elapsed_time_in_milliseconds,
        status = %record.episode_status,
    );
}

pub fn emit_phase_changed(from: Option<Phase>, to: Phase) {
    let from = from.map(|p| p.as_str()).unwrap_or("none");
    info!(event = "phase.changed", from = from, to = %to);
}

/// Emit event: an evaluation window was scored.
pub fn emit_window_evaluated(checkpoint: &str, samples: &[f64], mean: f64) {
    info!(
        event = "window.evaluated",
        checkpoint = %checkpoint,
        samples = samples.len(),
        mean = mean,
    );
}

pub fn emit_best_updated(previous: Option<&str>, checkpoint: &str, previous_avg: f64, avg: f64) {
    info!(
        event = "best.updated",
        previous = previous.unwrap_or("none"),
        checkpoint = %checkpoint,
        previous_avg = previous_avg,
        avg = avg,
    );
}

pub fn emit_publish_failed(destination: &PublishDestination, error: &dyn Display) {
    warn!(event = "publish.failed", destination = %destination, error = %error);
}

pub fn emit_session_finished(agent: &str, steps: u64, episodes: u64, windows: u64) {
    info!(
        event = "session.finished",
        agent = %agent,
        steps = steps,
        episodes = episodes,
        windows = windows,
    );
}
