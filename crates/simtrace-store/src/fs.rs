//! Filesystem-backed boundary implementations.
//!
//! `FsMetricsPublisher` lays payloads out as `<root>/<bucket>/<key>`, which
//! mirrors an object store closely enough for local runs and tests.
//! `FsCheckpointSource` reads the checkpoint state file the trainer writes
//! next to its checkpoints.

use std::io::Write;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::StoreError;
use crate::traits::{CheckpointSource, MetricsPublisher, PublishDestination, StoreResult};

/// Name of the checkpoint state file inside a checkpoint directory.
pub const CHECKPOINT_STATE_FILE: &str = ".coach_checkpoint";

// ---------------------------------------------------------------------------
// FsMetricsPublisher
// ---------------------------------------------------------------------------

/// Publisher writing each payload as pretty JSON under a root directory.
///
/// Writes are atomic: the payload goes to a temp file in the target
/// directory which is then renamed over the previous object.
#[derive(Debug, Clone)]
pub struct FsMetricsPublisher {
    root: PathBuf,
}

impl FsMetricsPublisher {
    /// Create a publisher rooted at `root`. Creates `root` if needed.
    pub fn new(root: impl AsRef<Path>) -> StoreResult<Self> {
        let root = root.as_ref().to_path_buf();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// Path a destination maps to.
    pub fn object_path(&self, destination: &PublishDestination) -> PathBuf {
        self.root
            .join(&destination.bucket)
            .join(destination.key.trim_start_matches('/'))
    }

    /// Read back the payload last published to `destination`, if any.
    pub fn read_object(
        &self,
        destination: &PublishDestination,
    ) -> StoreResult<Option<serde_json::Value>> {
        match std::fs::read(self.object_path(destination)) {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

fn write_atomic(path: &Path, data: &[u8]) -> std::io::Result<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(dir)?;
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(data)?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

#[async_trait]
impl MetricsPublisher for FsMetricsPublisher {
    async fn publish(
        &self,
        destination: &PublishDestination,
        payload: &serde_json::Value,
    ) -> StoreResult<()> {
        let path = self.object_path(destination);
        let data = serde_json::to_vec_pretty(payload)?;
        let target = destination.to_string();
        debug!(destination = %target, bytes = data.len(), "publishing payload");

        tokio::task::spawn_blocking(move || write_atomic(&path, &data))
            .await
            .map_err(|e| StoreError::Publish {
                destination: target.clone(),
                reason: e.to_string(),
            })?
            .map_err(|e| StoreError::Publish {
                destination: target,
                reason: e.to_string(),
            })
    }
}

// ---------------------------------------------------------------------------
// FsCheckpointSource
// ---------------------------------------------------------------------------

/// Reads the latest checkpoint name from `<dir>/.coach_checkpoint`.
///
/// The first non-empty line of the file, trimmed, is the name. A missing or
/// empty file means no checkpoint has been written yet.
#[derive(Debug, Clone)]
pub struct FsCheckpointSource {
    state_path: PathBuf,
}

impl FsCheckpointSource {
    pub fn new(checkpoint_dir: impl AsRef<Path>) -> Self {
        Self {
            state_path: checkpoint_dir.as_ref().join(CHECKPOINT_STATE_FILE),
        }
    }

    pub fn state_path(&self) -> &Path {
        &self.state_path
    }
}

#[async_trait]
impl CheckpointSource for FsCheckpointSource {
    async fn read_latest_name(&self) -> StoreResult<Option<String>> {
        match tokio::fs::read_to_string(&self.state_path).await {
            Ok(content) => Ok(content
                .lines()
                .map(str::trim)
                .find(|line| !line.is_empty())
                .map(str::to_string)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::CheckpointRead {
                path: self.state_path.display().to_string(),
                reason: e.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_path_strips_leading_slash() {
        let dir = tempfile::tempdir().unwrap();
        let publisher = FsMetricsPublisher::new(dir.path()).unwrap();
        let dest = PublishDestination::new("bucket", "/metrics/eval.json", "us-east-1");
        assert_eq!(
            publisher.object_path(&dest),
            dir.path().join("bucket").join("metrics/eval.json")
        );
    }

    #[tokio::test]
    async fn missing_state_file_is_no_checkpoint() {
        let dir = tempfile::tempdir().unwrap();
        let source = FsCheckpointSource::new(dir.path());
        assert_eq!(source.read_latest_name().await.unwrap(), None);
    }

    #[tokio::test]
    async fn state_file_first_non_empty_line_is_name() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CHECKPOINT_STATE_FILE), "\n  4_Step-2000.ckpt \n").unwrap();
        let source = FsCheckpointSource::new(dir.path());
        assert_eq!(
            source.read_latest_name().await.unwrap(),
            Some("4_Step-2000.ckpt".to_string())
        );
    }
}
