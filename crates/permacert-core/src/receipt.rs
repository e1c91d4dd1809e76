//! Proof-of-issuance value types.
//!
//! An [`UploadReceipt`] is what the storage network hands back for one
//! upload. A [`CertificateRecord`] enriches it with the subject fields and
//! the digest; that is what gets forwarded to secondary bookkeeping. Both
//! are immutable once built.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::amount::DisplayAmount;
use crate::digest::ContentDigest;
use crate::document::SubjectFields;
use crate::time::to_iso8601;

/// Identifier the storage network assigned to an upload.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(String);

impl TransactionId {
    /// Wrap a network-assigned id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TransactionId({})", self.0)
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for TransactionId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Result of a successful upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadReceipt {
    pub transaction_id: TransactionId,
    /// `explorer_base_url/transaction_id`.
    pub permanent_url: String,
    /// Byte length of the stored artifact.
    pub size_bytes: u64,
    /// Price quoted right before submission, in display units.
    pub estimated_cost: DisplayAmount,
    /// Network mode key (`testnet` / `mainnet`).
    pub network_name: String,
    /// Label of the identity provider that signed.
    pub signer_label: String,
    /// Unix ms at which the receipt was produced.
    pub issued_at: i64,
}

/// The fully enriched record of an issued certificate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificateRecord {
    pub digest_hex: String,
    pub transaction_id: TransactionId,
    pub subject: SubjectFields,
    pub permanent_url: String,
    pub issued_at: i64,
    pub size_bytes: u64,
    pub signer_label: String,
    pub network_name: String,
}

impl CertificateRecord {
    /// Combine a receipt with the inputs that produced it.
    pub fn from_receipt(
        receipt: &UploadReceipt,
        subject: &SubjectFields,
        digest: &ContentDigest,
    ) -> Self {
        Self {
            digest_hex: digest.to_hex(),
            transaction_id: receipt.transaction_id.clone(),
            subject: subject.clone(),
            permanent_url: receipt.permanent_url.clone(),
            issued_at: receipt.issued_at,
            size_bytes: receipt.size_bytes,
            signer_label: receipt.signer_label.clone(),
            network_name: receipt.network_name.clone(),
        }
    }

    /// Flat JSON form used by secondary stores.
    ///
    /// Field names are camelCase and `issuedAt` is ISO-8601.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "hash": self.digest_hex,
            "transactionId": self.transaction_id.as_str(),
            "issuee": self.subject.issuee,
            "course": self.subject.course,
            "issueDate": self.subject.date,
            "permanentUrl": self.permanent_url,
            "issuedAt": to_iso8601(self.issued_at),
            "sizeBytes": self.size_bytes,
            "wallet": self.signer_label,
            "network": self.network_name,
        })
    }
}
