//! Shared builders for simtrace-core integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};
use simtrace_core::{
    CheckpointSource, CheckpointStatsRecord, ManualClock, MetricsSession, Phase, Result,
    SessionConfig,
};
use simtrace_store::fakes::MemoryMetricsPublisher;
use simtrace_store::StoreResult;

/// A full step object with every required field.
pub fn step_json(progress: f64, status: &str) -> Value {
    step_at(0.0, 0.0, progress, status)
}

pub fn step_at(x: f64, y: f64, progress: f64, status: &str) -> Value {
    json!({
        "episode": 99,
        "steps": 1,
        "X": x,
        "Y": y,
        "yaw": 0.0,
        "steer": -7.5,
        "throttle": 1.0,
        "action": 2,
        "reward": 1.0,
        "done": false,
        "all_wheels_on_track": true,
        "progress": progress,
        "closest_waypoint": 3,
        "track_len": 17.7,
        "tstamp": 12.5,
        "episode_status": status,
    })
}

/// Checkpoint source answering from a script, one entry per read. Once the
/// script runs out the final answer repeats.
#[derive(Debug, Default)]
pub struct ScriptedCheckpointSource {
    script: Mutex<VecDeque<Option<String>>>,
    last: Mutex<Option<String>>,
}

impl ScriptedCheckpointSource {
    pub fn new(names: &[Option<&str>]) -> Self {
        Self {
            script: Mutex::new(names.iter().map(|n| n.map(str::to_string)).collect()),
            last: Mutex::new(None),
        }
    }

    pub fn of(names: &[&str]) -> Self {
        let names: Vec<Option<&str>> = names.iter().map(|n| Some(*n)).collect();
        Self::new(&names)
    }
}

#[async_trait]
impl CheckpointSource for ScriptedCheckpointSource {
    async fn read_latest_name(&self) -> StoreResult<Option<String>> {
        let mut last = self.last.lock().unwrap();
        if let Some(next) = self.script.lock().unwrap().pop_front() {
            *last = next;
        }
        Ok(last.clone())
    }
}

pub struct Harness {
    pub session: MetricsSession,
    pub publisher: Arc<MemoryMetricsPublisher>,
    pub clock: Arc<ManualClock>,
}

pub fn harness(config: SessionConfig, checkpoints: Arc<dyn CheckpointSource>) -> Harness {
    let publisher = Arc::new(MemoryMetricsPublisher::new());
    let clock = Arc::new(ManualClock::at_millis(1_000));
    let session = MetricsSession::new(config, publisher.clone(), checkpoints, clock.clone())
        .expect("session builds");
    Harness {
        session,
        publisher,
        clock,
    }
}

/// One evaluation window: enter EVAL, run one trial per progress value,
/// then return to TRAIN.
pub async fn eval_window(
    session: &mut MetricsSession,
    progresses: &[f64],
) -> Result<Option<CheckpointStatsRecord>> {
    session.on_phase(Phase::Eval).await?;
    for progress in progresses {
        session.start_episode();
        session.ingest_step(&step_json(*progress, "in_progress"))?;
        session.end_episode().await?;
    }
    session.on_phase(Phase::Train).await
}
