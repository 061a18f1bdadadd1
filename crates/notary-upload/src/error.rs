use notary_blob::BlobError;
use notary_ledger::LedgerError;
use notary_types::{BlobLocator, Fingerprint};

use crate::session::SessionPhase;

/// The upload stream could not be read to its end.
///
/// This is the only upload failure that is not reported as a structured
/// response: it terminates the call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("transport error: {0}")]
pub struct TransportError(String);

impl TransportError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self(reason.into())
    }

    pub fn reason(&self) -> &str {
        &self.0
    }
}

/// Errors produced by an upload.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    /// Missing or empty metadata. Nothing was written.
    #[error("validation error: {0}")]
    Validation(String),

    /// The stream failed mid-transfer. The partial blob was removed.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Blob create, write, or finalize failed. The partial blob was removed.
    #[error("blob store error: {0}")]
    Io(#[from] BlobError),

    /// The ledger refused the submission. The blob is kept.
    #[error("ledger submit failed for {fingerprint} at {locator}: {source}")]
    LedgerSubmit {
        fingerprint: Fingerprint,
        locator: BlobLocator,
        #[source]
        source: LedgerError,
    },

    /// The transaction was submitted but did not commit. The blob is kept.
    #[error("ledger commit failed for transaction {transaction_id}: {reason}")]
    LedgerCommit {
        transaction_id: String,
        fingerprint: Fingerprint,
        locator: BlobLocator,
        reason: String,
    },

    /// A stored blob no longer hashes to the fingerprint offered for it.
    #[error("blob at {locator} has fingerprint {actual}, expected {expected}")]
    FingerprintMismatch {
        locator: BlobLocator,
        expected: Fingerprint,
        actual: Fingerprint,
    },

    /// A chunk arrived in a phase that does not accept chunks.
    #[error("protocol violation in phase {phase}: {reason}")]
    Protocol { phase: SessionPhase, reason: String },
}

impl UploadError {
    /// Stable name of the error class, used in responses and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "ValidationError",
            Self::Transport(_) => "TransportError",
            Self::Io(_) => "IOError",
            Self::LedgerSubmit { .. } => "LedgerSubmitError",
            Self::LedgerCommit { .. } => "LedgerCommitError",
            Self::FingerprintMismatch { .. } => "FingerprintMismatch",
            Self::Protocol { .. } => "ProtocolViolation",
        }
    }

    /// Fingerprint of a finalized blob, when the error happened after
    /// finalization.
    pub fn fingerprint(&self) -> Option<&Fingerprint> {
        match self {
            Self::LedgerSubmit { fingerprint, .. } | Self::LedgerCommit { fingerprint, .. } => {
                Some(fingerprint)
            }
            Self::FingerprintMismatch { actual, .. } => Some(actual),
            _ => None,
        }
    }

    /// Locator of a blob that survived the failure.
    pub fn locator(&self) -> Option<&BlobLocator> {
        match self {
            Self::LedgerSubmit { locator, .. }
            | Self::LedgerCommit { locator, .. }
            | Self::FingerprintMismatch { locator, .. } => Some(locator),
            _ => None,
        }
    }

    pub fn transaction_id(&self) -> Option<&str> {
        match self {
            Self::LedgerCommit { transaction_id, .. } => Some(transaction_id),
            _ => None,
        }
    }

    /// Whether the blob was kept and the ledger step can be retried.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::LedgerSubmit { .. } | Self::LedgerCommit { .. })
    }
}

/// Result alias for upload operations.
pub type UploadResult<T> = Result<T, UploadError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ledger_failures_expose_the_kept_blob() {
        let err = UploadError::LedgerCommit {
            transaction_id: "tx-1".into(),
            fingerprint: Fingerprint::from_digest([3; 32]),
            locator: BlobLocator::new("/blobs/a"),
            reason: "rejected".into(),
        };
        assert_eq!(err.kind(), "LedgerCommitError");
        assert_eq!(err.transaction_id(), Some("tx-1"));
        assert_eq!(err.locator().map(BlobLocator::as_str), Some("/blobs/a"));
        assert!(err.fingerprint().is_some());
        assert!(err.is_retryable());
    }

    #[test]
    fn early_failures_carry_nothing() {
        let err = UploadError::Validation("ownerId is empty".into());
        assert_eq!(err.kind(), "ValidationError");
        assert!(err.fingerprint().is_none());
        assert!(err.locator().is_none());
        assert!(!err.is_retryable());
    }

    #[test]
    fn transport_error_display_is_preserved() {
        let err: UploadError = TransportError::new("connection reset").into();
        assert_eq!(err.to_string(), "transport error: connection reset");
    }
}
