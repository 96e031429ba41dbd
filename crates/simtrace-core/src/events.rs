//! Channel-driven session loop.
//!
//! The training loop sends [`SimEvent`]s through a bounded mpsc channel;
//! [`run_session`] applies them to a [`MetricsSession`] strictly in order.
//! A phase event is fully handled (including any publish) before the next
//! step is read, so at most one window transition is ever in flight.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{debug, Instrument};

use crate::domain::{MetricsError, Phase, Result};
use crate::metrics::METRICS;
use crate::obs;
use crate::session::MetricsSession;

/// One message from the training loop.
///
/// Serialized with an `event` tag, e.g. `{"event":"phase","phase":"evaluation"}`
/// or `{"event":"step","step":{...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SimEvent {
    Phase { phase: Phase },
    EpisodeStarted,
    Step { step: Value },
    EpisodeEnded,
}

/// Sending half held by the training loop.
#[derive(Debug, Clone)]
pub struct PhaseNotifier {
    tx: mpsc::Sender<SimEvent>,
}

impl PhaseNotifier {
    pub async fn send(&self, event: SimEvent) -> Result<()> {
        self.tx
            .send(event)
            .await
            .map_err(|_| MetricsError::ChannelClosed)
    }

    pub async fn notify_phase(&self, phase: Phase) -> Result<()> {
        self.send(SimEvent::Phase { phase }).await
    }

    pub async fn episode_started(&self) -> Result<()> {
        self.send(SimEvent::EpisodeStarted).await
    }

    pub async fn step(&self, step: Value) -> Result<()> {
        self.send(SimEvent::Step { step }).await
    }

    pub async fn episode_ended(&self) -> Result<()> {
        self.send(SimEvent::EpisodeEnded).await
    }
}

/// Bounded event channel. `capacity` must be non-zero.
pub fn channel(capacity: usize) -> (PhaseNotifier, mpsc::Receiver<SimEvent>) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (PhaseNotifier { tx }, rx)
}

/// Totals for one [`run_session`] call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SessionSummary {
    pub steps: u64,
    pub episodes: u64,
    pub phase_changes: u64,
    pub windows_evaluated: u64,
}

/// Apply a single event to `session`.
pub async fn apply_event(
    session: &mut MetricsSession,
    event: SimEvent,
    summary: &mut SessionSummary,
) -> Result<()> {
    match event {
        SimEvent::Phase { phase } => {
            summary.phase_changes += 1;
            if session.on_phase(phase).await?.is_some() {
                summary.windows_evaluated += 1;
            }
        }
        SimEvent::EpisodeStarted => {
            session.start_episode();
        }
        SimEvent::Step { step } => {
            session.ingest_step(&step)?;
            summary.steps += 1;
        }
        SimEvent::EpisodeEnded => {
            session.end_episode().await?;
            summary.episodes += 1;
        }
    }
    Ok(())
}

/// Consume events until every sender is dropped.
///
/// # Errors
///
/// The first error from the session ends the loop and is returned; events
/// still queued are not applied.
pub async fn run_session(
    session: &mut MetricsSession,
    mut rx: mpsc::Receiver<SimEvent>,
) -> Result<SessionSummary> {
    let agent = session.config().agent_name.clone();
    let span = obs::session_span(&agent);
    async move {
        let mut summary = SessionSummary::default();
        while let Some(event) = rx.recv().await {
            apply_event(session, event, &mut summary).await?;
        }

        debug!("event channel drained");
        obs::emit_session_finished(
            &agent,
            summary.steps,
            summary.episodes,
            summary.windows_evaluated,
        );
        METRICS.flush();
        Ok::<_, MetricsError>(summary)
    }
    .instrument(span)
    .await
}
