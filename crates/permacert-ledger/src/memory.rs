//! In-memory recorder.
//!
//! Primarily for testing. Records are dispatched from a detached task, so
//! [`MemoryRecorder::wait_for`] lets a test wait until they arrive.

use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;
use permacert_core::CertificateRecord;
use tokio::sync::watch;

use crate::error::{RecorderError, Result};
use crate::recorder::MetadataRecorder;

/// In-memory recorder. Thread-safe via RwLock.
pub struct MemoryRecorder {
    records: RwLock<Vec<CertificateRecord>>,
    count: watch::Sender<usize>,
    fail: RwLock<Option<String>>,
}

impl MemoryRecorder {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self {
            records: RwLock::new(Vec::new()),
            count: watch::channel(0).0,
            fail: RwLock::new(None),
        }
    }

    /// Reject every following record with `reason`, or accept again with `None`.
    pub fn set_failure(&self, reason: Option<&str>) {
        *self.fail.write().unwrap_or_else(PoisonError::into_inner) = reason.map(str::to_string);
    }

    /// Records accepted so far, in arrival order.
    pub fn records(&self) -> Vec<CertificateRecord> {
        self.records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn len(&self) -> usize {
        *self.count.borrow()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Wait until at least `n` records have been accepted.
    pub async fn wait_for(&self, n: usize) -> Vec<CertificateRecord> {
        let mut rx = self.count.subscribe();
        // The sender lives in `self`, so the channel cannot close here.
        let _ = rx.wait_for(|count| *count >= n).await;
        self.records()
    }
}

impl Default for MemoryRecorder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MetadataRecorder for MemoryRecorder {
    async fn record(&self, record: &CertificateRecord) -> Result<()> {
        if let Some(reason) = self
            .fail
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
        {
            return Err(RecorderError::Rejected(reason));
        }

        let len = {
            let mut records = self.records.write().unwrap_or_else(PoisonError::into_inner);
            records.push(record.clone());
            records.len()
        };
        self.count.send_replace(len);
        Ok(())
    }
}
