//! Channel-driven session loop.

mod common;

use std::sync::Arc;

use serde_json::json;
use simtrace_core::{channel, run_session, MetricsError, Phase, SessionConfig, SimEvent};
use simtrace_store::fakes::MemoryCheckpointSource;

use common::{harness, step_json};

#[tokio::test]
async fn events_are_applied_in_order() {
    let source = Arc::new(MemoryCheckpointSource::with_name("ckpt-a"));
    let mut h = harness(SessionConfig::default(), source);
    let model_destination = h.session.config().model_destination.clone();
    let (notifier, rx) = channel(2);

    let producer = tokio::spawn(async move {
        notifier.notify_phase(Phase::Train).await?;
        notifier.episode_started().await?;
        notifier.step(step_json(40.0, "in_progress")).await?;
        notifier.episode_ended().await?;

        notifier.notify_phase(Phase::Eval).await?;
        for progress in [80.0, 60.0] {
            notifier.episode_started().await?;
            notifier.step(step_json(progress, "in_progress")).await?;
            notifier.episode_ended().await?;
        }
        notifier.notify_phase(Phase::Train).await?;

        // Training steps after the window must not leak into its samples.
        notifier.episode_started().await?;
        notifier.step(step_json(5.0, "in_progress")).await?;
        notifier.episode_ended().await?;
        Ok::<_, MetricsError>(())
    });

    let summary = run_session(&mut h.session, rx).await.unwrap();
    producer.await.unwrap().unwrap();

    assert_eq!(summary.steps, 4);
    assert_eq!(summary.episodes, 4);
    assert_eq!(summary.phase_changes, 3);
    assert_eq!(summary.windows_evaluated, 1);

    let record = h.publisher.latest(&model_destination).expect("model record");
    assert_eq!(record["best_checkpoint"]["avg_comp_pct"], json!(70.0));
    assert_eq!(record["last_checkpoint"]["name"], json!("ckpt-a"));
    assert_eq!(h.session.aggregator().episode(), 2);
    assert!(h.session.aggregator().completion_samples().is_empty());
}

#[tokio::test]
async fn first_error_stops_the_loop() {
    let source = Arc::new(MemoryCheckpointSource::with_name("ckpt-a"));
    let mut h = harness(SessionConfig::default(), source);
    let (notifier, rx) = channel(8);

    notifier.episode_started().await.unwrap();
    notifier
        .send(SimEvent::Step {
            step: json!({"episode": 1}),
        })
        .await
        .unwrap();
    notifier
        .step(step_json(10.0, "in_progress"))
        .await
        .unwrap();
    drop(notifier);

    let err = run_session(&mut h.session, rx).await.unwrap_err();
    assert!(matches!(err, MetricsError::MalformedRecord(_)));
    assert_eq!(h.session.steps_ingested(), 0);
}

#[tokio::test]
async fn empty_channel_yields_empty_summary() {
    let source = Arc::new(MemoryCheckpointSource::new());
    let mut h = harness(SessionConfig::default(), source);
    let (notifier, rx) = channel(1);
    drop(notifier);

    let summary = run_session(&mut h.session, rx).await.unwrap();
    assert_eq!(summary, Default::default());
}
