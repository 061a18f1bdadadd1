use std::sync::Arc;

use chrono::{DateTime, Utc};
use notary_blob::BlobStore;
use notary_crypto::FingerprintAlgorithm;
use notary_types::{BlobLocator, Fingerprint};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::QueryError;
use crate::service::{DocumentLookup, DocumentQueryService};

/// What a verification found.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum VerificationOutcome {
    /// The stored bytes hash to the recorded fingerprint.
    Intact,
    /// The stored bytes changed after commit.
    Tampered { actual: Fingerprint },
    /// The record exists but its blob could not be read.
    BlobUnreadable { reason: String },
    /// The ledger has no record for the id.
    NotRecorded,
    /// The ledger could not be consulted.
    LedgerUnavailable { reason: String },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationReport {
    pub document_id: String,
    pub outcome: VerificationOutcome,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recorded_fingerprint: Option<Fingerprint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blob_location: Option<BlobLocator>,
    pub checked_at: DateTime<Utc>,
}

impl VerificationReport {
    pub fn is_intact(&self) -> bool {
        self.outcome == VerificationOutcome::Intact
    }
}

/// Checks that stored blobs still match what the ledger recorded.
pub struct IntegrityVerifier<S: BlobStore> {
    query: DocumentQueryService,
    store: Arc<S>,
    algorithm: FingerprintAlgorithm,
}

impl<S: BlobStore> Clone for IntegrityVerifier<S> {
    fn clone(&self) -> Self {
        Self {
            query: self.query.clone(),
            store: Arc::clone(&self.store),
            algorithm: self.algorithm,
        }
    }
}

impl<S: BlobStore> IntegrityVerifier<S> {
    /// `algorithm` must be the one the deployment records fingerprints with.
    pub fn new(query: DocumentQueryService, store: Arc<S>, algorithm: FingerprintAlgorithm) -> Self {
        Self {
            query,
            store,
            algorithm,
        }
    }

    pub async fn verify(&self, document_id: &str) -> VerificationReport {
        let asset = match self.query.get(document_id).await {
            DocumentLookup::Found(asset) => asset,
            DocumentLookup::Absent | DocumentLookup::Unavailable(QueryError::Validation(_)) => {
                return self.report(document_id, VerificationOutcome::NotRecorded, None, None)
            }
            DocumentLookup::Unavailable(e) => {
                let outcome = VerificationOutcome::LedgerUnavailable {
                    reason: e.to_string(),
                };
                return self.report(document_id, outcome, None, None);
            }
        };

        let outcome = match self.store.fingerprint(&asset.blob_location, self.algorithm).await {
            Ok(actual) if actual == asset.content_fingerprint => VerificationOutcome::Intact,
            Ok(actual) => {
                warn!(
                    document = document_id,
                    recorded = %asset.content_fingerprint,
                    %actual,
                    "stored blob does not match ledger"
                );
                VerificationOutcome::Tampered { actual }
            }
            Err(e) => {
                warn!(document = document_id, locator = %asset.blob_location, error = %e, "blob unreadable");
                VerificationOutcome::BlobUnreadable {
                    reason: e.to_string(),
                }
            }
        };
        info!(document = document_id, outcome = ?outcome, "verification complete");
        self.report(
            document_id,
            outcome,
            Some(asset.content_fingerprint),
            Some(asset.blob_location),
        )
    }

    fn report(
        &self,
        document_id: &str,
        outcome: VerificationOutcome,
        recorded_fingerprint: Option<Fingerprint>,
        blob_location: Option<BlobLocator>,
    ) -> VerificationReport {
        VerificationReport {
            document_id: document_id.to_string(),
            outcome,
            recorded_fingerprint,
            blob_location,
            checked_at: Utc::now(),
        }
    }
}
