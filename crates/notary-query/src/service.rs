use std::sync::Arc;

use chrono::{DateTime, Utc};
use notary_ledger::{LedgerGateway, READ_DOCUMENT};
use notary_types::{BlobLocator, DocumentAsset, Fingerprint};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::QueryError;

/// Result of a ledger lookup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DocumentLookup {
    Found(DocumentAsset),
    /// The ledger has no record for the id.
    Absent,
    /// No record could be produced. Carries the reason.
    Unavailable(QueryError),
}

impl DocumentLookup {
    pub fn into_response(self, document_id: &str) -> QueryResponse {
        match self {
            Self::Found(asset) => QueryResponse {
                found: true,
                document_id: asset.id,
                content_fingerprint: Some(asset.content_fingerprint),
                blob_location: Some(asset.blob_location),
                owner_id: Some(asset.owner_id),
                file_name: Some(asset.file_name),
                file_type: Some(asset.file_type),
                timestamp: Some(asset.timestamp),
                message: "document found".into(),
                error: None,
            },
            Self::Absent => QueryResponse::not_found(document_id, "document not found", None),
            Self::Unavailable(e) => QueryResponse::not_found(
                document_id,
                "document lookup failed",
                Some(format!("{}: {e}", e.kind())),
            ),
        }
    }
}

/// Response of the query entry point. `found` is always set.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResponse {
    pub found: bool,
    pub document_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_fingerprint: Option<Fingerprint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blob_location: Option<BlobLocator>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl QueryResponse {
    fn not_found(document_id: &str, message: &str, error: Option<String>) -> Self {
        Self {
            found: false,
            document_id: document_id.to_string(),
            message: message.to_string(),
            error,
            ..Self::default()
        }
    }
}

/// Stateless ledger lookups by document id.
#[derive(Clone)]
pub struct DocumentQueryService {
    ledger: Arc<dyn LedgerGateway>,
}

impl DocumentQueryService {
    pub fn new(ledger: Arc<dyn LedgerGateway>) -> Self {
        Self { ledger }
    }

    pub async fn get(&self, document_id: &str) -> DocumentLookup {
        if document_id.is_empty() {
            return DocumentLookup::Unavailable(QueryError::Validation(
                "documentId must not be empty".into(),
            ));
        }

        let bytes = match self
            .ledger
            .evaluate(READ_DOCUMENT, &[document_id.to_string()])
            .await
        {
            Ok(bytes) => bytes,
            Err(e) if e.is_not_found() => {
                debug!(document = document_id, "document not recorded");
                return DocumentLookup::Absent;
            }
            Err(e) => {
                warn!(document = document_id, error = %e, "ledger evaluate failed");
                return DocumentLookup::Unavailable(e.into());
            }
        };
        if bytes.is_empty() {
            debug!(document = document_id, "empty ledger result");
            return DocumentLookup::Absent;
        }

        match DocumentAsset::from_ledger_bytes(&bytes) {
            Ok(asset) if asset.id == document_id => DocumentLookup::Found(asset),
            Ok(asset) => {
                warn!(document = document_id, recorded = %asset.id, "ledger returned another document");
                DocumentLookup::Unavailable(QueryError::Parse(format!(
                    "record for '{}' returned for '{document_id}'",
                    asset.id
                )))
            }
            Err(e) => {
                warn!(document = document_id, error = %e, "malformed ledger record");
                DocumentLookup::Unavailable(QueryError::Parse(e.to_string()))
            }
        }
    }

    /// [`get`](Self::get) mapped to the query response.
    pub async fn query(&self, document_id: &str) -> QueryResponse {
        self.get(document_id).await.into_response(document_id)
    }
}

impl std::fmt::Debug for DocumentQueryService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentQueryService").finish_non_exhaustive()
    }
}
