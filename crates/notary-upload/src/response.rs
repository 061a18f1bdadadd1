use chrono::{DateTime, Utc};
use notary_types::{BlobLocator, DocumentMetadata, Fingerprint, SessionId};
use serde::{Deserialize, Serialize};

use crate::error::UploadError;
use crate::session::SealedBlob;

/// A committed `CreateDocument` transaction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitReceipt {
    pub transaction_id: String,
    pub block_number: u64,
    /// Timestamp recorded in the ledger entry.
    pub timestamp: DateTime<Utc>,
}

/// Outcome of a successful upload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UploadReceipt {
    pub session: SessionId,
    pub metadata: DocumentMetadata,
    pub fingerprint: Fingerprint,
    pub locator: BlobLocator,
    pub bytes: u64,
    pub commit: CommitReceipt,
}

impl UploadReceipt {
    pub fn new(session: SessionId, sealed: SealedBlob, commit: CommitReceipt) -> Self {
        Self {
            session,
            metadata: sealed.metadata,
            fingerprint: sealed.fingerprint,
            locator: sealed.locator,
            bytes: sealed.bytes,
            commit,
        }
    }
}

/// Terminal response of an upload call.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_fingerprint: Option<Fingerprint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blob_location: Option<BlobLocator>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
}

impl UploadResponse {
    pub fn committed(fingerprint: &Fingerprint, locator: &BlobLocator, commit: &CommitReceipt) -> Self {
        Self {
            success: true,
            message: format!("document committed in block {}", commit.block_number),
            error: None,
            content_fingerprint: Some(fingerprint.clone()),
            blob_location: Some(locator.clone()),
            transaction_id: Some(commit.transaction_id.clone()),
        }
    }

    /// A structured failure. Ledger failures keep the blob, so the response
    /// carries its fingerprint and locator for an out-of-band retry.
    pub fn failed(error: &UploadError) -> Self {
        let message = match error {
            UploadError::Validation(_) => "upload rejected",
            UploadError::Transport(_) => "upload interrupted",
            UploadError::Io(_) => "failed to store document",
            UploadError::LedgerSubmit { .. } => "document stored but ledger submission failed",
            UploadError::LedgerCommit { .. } => "document stored but ledger commit failed",
            UploadError::FingerprintMismatch { .. } => "stored document no longer matches its fingerprint",
            UploadError::Protocol { .. } => "upload protocol violation",
        };
        Self {
            success: false,
            message: message.to_string(),
            error: Some(format!("{}: {error}", error.kind())),
            content_fingerprint: error.fingerprint().cloned(),
            blob_location: error.locator().cloned(),
            transaction_id: error.transaction_id().map(str::to_string),
        }
    }
}

impl From<&UploadReceipt> for UploadResponse {
    fn from(receipt: &UploadReceipt) -> Self {
        Self::committed(&receipt.fingerprint, &receipt.locator, &receipt.commit)
    }
}
