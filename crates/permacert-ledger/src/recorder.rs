//! The recorder trait.

use async_trait::async_trait;
use permacert_core::CertificateRecord;

use crate::error::Result;

/// A sink for issued-certificate records.
///
/// Implementations must be safe to call from a detached task. The pipeline
/// never awaits the outcome on the issuance path.
#[async_trait]
pub trait MetadataRecorder: Send + Sync {
    /// Persist one record.
    async fn record(&self, record: &CertificateRecord) -> Result<()>;
}
