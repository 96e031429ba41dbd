//! In-memory fakes for boundary traits (testing only)
//!
//! Provides `MemoryMetricsPublisher` and `MemoryCheckpointSource` that
//! satisfy the trait contracts without touching the filesystem.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::StoreError;
use crate::traits::*;

// ---------------------------------------------------------------------------
// MemoryMetricsPublisher
// ---------------------------------------------------------------------------

/// In-memory publisher keeping every payload in publish order, plus the
/// latest payload per destination.
#[derive(Debug, Default)]
pub struct MemoryMetricsPublisher {
    log: Mutex<Vec<(PublishDestination, serde_json::Value)>>,
    latest: Mutex<HashMap<PublishDestination, serde_json::Value>>,
    fail: AtomicBool,
}

impl MemoryMetricsPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// A publisher that rejects every write.
    pub fn failing() -> Self {
        let publisher = Self::default();
        publisher.set_failing(true);
        publisher
    }

    /// Toggle rejection of subsequent writes.
    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    /// All payloads published so far, oldest first.
    pub fn published(&self) -> Vec<(PublishDestination, serde_json::Value)> {
        self.log.lock().unwrap().clone()
    }

    /// Most recent payload stored at `destination`.
    pub fn latest(&self, destination: &PublishDestination) -> Option<serde_json::Value> {
        self.latest.lock().unwrap().get(destination).cloned()
    }

    /// Number of successful publishes.
    pub fn publish_count(&self) -> usize {
        self.log.lock().unwrap().len()
    }
}

#[async_trait]
impl MetricsPublisher for MemoryMetricsPublisher {
    async fn publish(
        &self,
        destination: &PublishDestination,
        payload: &serde_json::Value,
    ) -> StoreResult<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(StoreError::Publish {
                destination: destination.to_string(),
                reason: "rejected by fake publisher".to_string(),
            });
        }
        self.log
            .lock()
            .unwrap()
            .push((destination.clone(), payload.clone()));
        self.latest
            .lock()
            .unwrap()
            .insert(destination.clone(), payload.clone());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// MemoryCheckpointSource
// ---------------------------------------------------------------------------

/// In-memory checkpoint source whose answer is set by the test.
#[derive(Debug, Default)]
pub struct MemoryCheckpointSource {
    name: Mutex<Option<String>>,
    fail: AtomicBool,
}

impl MemoryCheckpointSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// A source that already reports `name`.
    pub fn with_name(name: impl Into<String>) -> Self {
        let source = Self::default();
        source.set_name(name);
        source
    }

    /// Report `name` as the latest checkpoint from now on.
    pub fn set_name(&self, name: impl Into<String>) {
        *self.name.lock().unwrap() = Some(name.into());
    }

    /// Forget the current checkpoint, as if none had been written.
    pub fn clear(&self) {
        *self.name.lock().unwrap() = None;
    }

    /// Make subsequent reads fail.
    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl CheckpointSource for MemoryCheckpointSource {
    async fn read_latest_name(&self) -> StoreResult<Option<String>> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(StoreError::CheckpointRead {
                path: "memory".to_string(),
                reason: "read failure injected by fake".to_string(),
            });
        }
        Ok(self.name.lock().unwrap().clone())
    }
}
