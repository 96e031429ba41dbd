//! Trait contract tests for MetricsPublisher and CheckpointSource.
//!
//! Each contract is checked against the in-memory fake and the filesystem
//! implementation. Any conforming implementation must pass these.

use serde_json::json;
use simtrace_store::fakes::{MemoryCheckpointSource, MemoryMetricsPublisher};
use simtrace_store::{
    CheckpointSource, FsCheckpointSource, FsMetricsPublisher, MetricsPublisher,
    PublishDestination, StoreError, CHECKPOINT_STATE_FILE,
};

fn metrics_dest() -> PublishDestination {
    PublishDestination::new("metrics-bucket", "training/metrics.json", "us-east-1")
}

// ===========================================================================
// MetricsPublisher contract tests
// ===========================================================================

#[tokio::test]
async fn memory_publish_records_payload() {
    let publisher = MemoryMetricsPublisher::new();
    let payload = json!({"metrics": [{"trial": 1}]});
    publisher.publish(&metrics_dest(), &payload).await.unwrap();

    assert_eq!(publisher.publish_count(), 1);
    assert_eq!(publisher.latest(&metrics_dest()), Some(payload));
}

#[tokio::test]
async fn memory_publish_overwrites_latest() {
    let publisher = MemoryMetricsPublisher::new();
    publisher
        .publish(&metrics_dest(), &json!({"metrics": []}))
        .await
        .unwrap();
    publisher
        .publish(&metrics_dest(), &json!({"metrics": [{"trial": 1}]}))
        .await
        .unwrap();

    assert_eq!(publisher.publish_count(), 2);
    assert_eq!(
        publisher.latest(&metrics_dest()),
        Some(json!({"metrics": [{"trial": 1}]}))
    );
}

#[tokio::test]
async fn memory_failing_publisher_rejects() {
    let publisher = MemoryMetricsPublisher::failing();
    let err = publisher
        .publish(&metrics_dest(), &json!({}))
        .await
        .unwrap_err();

    assert!(matches!(err, StoreError::Publish { .. }));
    assert_eq!(publisher.publish_count(), 0);
}

#[tokio::test]
async fn fs_publish_writes_json_object() {
    let dir = tempfile::tempdir().unwrap();
    let publisher = FsMetricsPublisher::new(dir.path()).unwrap();
    let payload = json!({"metrics": [{"trial": 1, "completion_percentage": 42}]});
    publisher.publish(&metrics_dest(), &payload).await.unwrap();

    let path = publisher.object_path(&metrics_dest());
    let stored: serde_json::Value =
        serde_json::from_slice(&std::fs::read(path).unwrap()).unwrap();
    assert_eq!(stored, payload);
}

#[tokio::test]
async fn fs_publish_replaces_previous_object() {
    let dir = tempfile::tempdir().unwrap();
    let publisher = FsMetricsPublisher::new(dir.path()).unwrap();
    publisher
        .publish(&metrics_dest(), &json!({"metrics": [1]}))
        .await
        .unwrap();
    publisher
        .publish(&metrics_dest(), &json!({"metrics": [1, 2]}))
        .await
        .unwrap();

    let stored: serde_json::Value =
        serde_json::from_slice(&std::fs::read(publisher.object_path(&metrics_dest())).unwrap())
            .unwrap();
    assert_eq!(stored, json!({"metrics": [1, 2]}));
    assert_eq!(
        publisher.read_object(&metrics_dest()).unwrap(),
        Some(json!({"metrics": [1, 2]}))
    );
}

#[test]
fn fs_read_object_missing_is_none() {
    let dir = tempfile::tempdir().unwrap();
    let publisher = FsMetricsPublisher::new(dir.path()).unwrap();
    assert_eq!(publisher.read_object(&metrics_dest()).unwrap(), None);
}

// ===========================================================================
// CheckpointSource contract tests
// ===========================================================================

#[tokio::test]
async fn memory_source_starts_empty() {
    let source = MemoryCheckpointSource::new();
    assert_eq!(source.read_latest_name().await.unwrap(), None);
}

#[tokio::test]
async fn memory_source_reports_latest_name() {
    let source = MemoryCheckpointSource::with_name("1_Step-100.ckpt");
    source.set_name("2_Step-200.ckpt");
    assert_eq!(
        source.read_latest_name().await.unwrap(),
        Some("2_Step-200.ckpt".to_string())
    );
}

#[tokio::test]
async fn memory_source_failure_is_error() {
    let source = MemoryCheckpointSource::with_name("1_Step-100.ckpt");
    source.set_failing(true);
    let err = source.read_latest_name().await.unwrap_err();
    assert!(matches!(err, StoreError::CheckpointRead { .. }));
}

#[tokio::test]
async fn fs_source_tracks_rewritten_state_file() {
    let dir = tempfile::tempdir().unwrap();
    let source = FsCheckpointSource::new(dir.path());
    std::fs::write(dir.path().join(CHECKPOINT_STATE_FILE), "1_Step-100.ckpt\n").unwrap();
    assert_eq!(
        source.read_latest_name().await.unwrap(),
        Some("1_Step-100.ckpt".to_string())
    );

    std::fs::write(dir.path().join(CHECKPOINT_STATE_FILE), "2_Step-250.ckpt\n").unwrap();
    assert_eq!(
        source.read_latest_name().await.unwrap(),
        Some("2_Step-250.ckpt".to_string())
    );
}

#[tokio::test]
async fn fs_source_empty_file_is_no_checkpoint() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join(CHECKPOINT_STATE_FILE), "\n\n").unwrap();
    let source = FsCheckpointSource::new(dir.path());
    assert_eq!(source.read_latest_name().await.unwrap(), None);
}

#[tokio::test]
async fn fs_source_unreadable_state_is_error() {
    let dir = tempfile::tempdir().unwrap();
    // A directory where the state file should be cannot be read as a string.
    std::fs::create_dir(dir.path().join(CHECKPOINT_STATE_FILE)).unwrap();
    let source = FsCheckpointSource::new(dir.path());
    let err = source.read_latest_name().await.unwrap_err();
    assert!(matches!(err, StoreError::CheckpointRead { .. }));
}
