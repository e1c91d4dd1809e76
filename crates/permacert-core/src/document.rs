//! Certificate document generation.
//!
//! The document is a formatted UTF-8 text body. Rendering is deterministic
//! for a given set of subject fields and generation timestamp; only
//! [`DocumentGenerator::generate`] reads the clock.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::network::NetworkMode;
use crate::time::{now_millis, to_iso8601};

/// Content type of every generated document.
pub const TEXT_CONTENT_TYPE: &str = "text/plain; charset=utf-8";

/// The descriptive fields of a certificate.
///
/// All three must be non-empty. That is enforced by whoever collects them;
/// the generator assumes valid input.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubjectFields {
    /// Who the certificate is awarded to.
    pub issuee: String,
    /// The course completed.
    pub course: String,
    /// Date of issue as entered by the issuer.
    pub date: String,
}

impl SubjectFields {
    /// Create subject fields.
    pub fn new(
        issuee: impl Into<String>,
        course: impl Into<String>,
        date: impl Into<String>,
    ) -> Self {
        Self {
            issuee: issuee.into(),
            course: course.into(),
            date: date.into(),
        }
    }

    /// True when every field is non-empty.
    pub fn is_complete(&self) -> bool {
        !self.issuee.is_empty() && !self.course.is_empty() && !self.date.is_empty()
    }
}

/// A generated document ready to be fingerprinted and stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// The exact bytes that are hashed and uploaded.
    pub bytes: Bytes,
    /// MIME type of `bytes`.
    pub content_type: String,
    /// When the document was rendered (Unix ms). Embedded in the body.
    pub generated_at: i64,
}

impl Artifact {
    /// Byte length of the document.
    pub fn len(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// True when the document has no bytes.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Renders certificate bodies.
#[derive(Debug, Clone, Copy)]
pub struct DocumentGenerator {
    network: NetworkMode,
}

impl DocumentGenerator {
    /// Create a generator whose documents name the given network.
    pub fn new(network: NetworkMode) -> Self {
        Self { network }
    }

    /// Render a document stamped with the current time.
    pub fn generate(&self, fields: &SubjectFields) -> Artifact {
        self.generate_at(fields, now_millis())
    }

    /// Render a document stamped with `generated_at` (Unix ms).
    ///
    /// Identical inputs produce identical bytes.
    pub fn generate_at(&self, fields: &SubjectFields, generated_at: i64) -> Artifact {
        let network = self.network.key().to_uppercase();
        let title = format!("CERTIFICATE OF PARTICIPATION - {network}");
        let rule = "=".repeat(title.chars().count());

        let body = format!(
            "{title}\n\
             {rule}\n\
             \n\
             Awarded to: {issuee}\n\
             \n\
             For successfully completing the course:\n\
             \"{course}\"\n\
             \n\
             Date of issue: {date}\n\
             \n\
             Stored on the permanent storage network ({network})\n\
             Anchored by a permanent network transaction\n\
             \n\
             Timestamp: {timestamp}\n",
            issuee = fields.issuee,
            course = fields.course,
            date = fields.date,
            timestamp = to_iso8601(generated_at),
        );

        Artifact {
            bytes: Bytes::from(body.into_bytes()),
            content_type: TEXT_CONTENT_TYPE.to_string(),
            generated_at,
        }
    }
}

impl Default for DocumentGenerator {
    fn default() -> Self {
        Self::new(NetworkMode::Testnet)
    }
}
