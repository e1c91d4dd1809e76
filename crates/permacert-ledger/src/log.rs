//! Recorder that writes records to the log.

use async_trait::async_trait;
use permacert_core::CertificateRecord;

use crate::error::Result;
use crate::recorder::MetadataRecorder;

/// Emits each record as a JSON field at `info` level.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogRecorder;

impl LogRecorder {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl MetadataRecorder for LogRecorder {
    async fn record(&self, record: &CertificateRecord) -> Result<()> {
        tracing::info!(
            transaction_id = %record.transaction_id,
            record = %record.to_json(),
            "certificate recorded"
        );
        Ok(())
    }
}
