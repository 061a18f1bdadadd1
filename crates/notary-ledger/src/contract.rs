use chrono::{DateTime, Utc};
use notary_types::{
    decode_timestamp, encode_timestamp, BlobLocator, DocumentAsset, DocumentMetadata, Fingerprint,
};

use crate::error::LedgerError;

/// Records a new document.
pub const CREATE_DOCUMENT: &str = "CreateDocument";
/// Reads a document record by id.
pub const READ_DOCUMENT: &str = "ReadDocument";

/// `CreateDocument` takes id, owner, file name, file type, fingerprint,
/// locator, and commit timestamp, in that order.
pub const CREATE_DOCUMENT_ARITY: usize = 7;

/// Build the `CreateDocument` argument list.
pub fn create_document_args(
    metadata: &DocumentMetadata,
    fingerprint: &Fingerprint,
    locator: &BlobLocator,
    timestamp: &DateTime<Utc>,
) -> Vec<String> {
    vec![
        metadata.document_id.clone(),
        metadata.owner_id.clone(),
        metadata.file_name.clone(),
        metadata.file_type.clone(),
        fingerprint.to_string(),
        locator.to_string(),
        encode_timestamp(timestamp),
    ]
}

/// Decode and validate a `CreateDocument` argument list.
pub fn parse_create_document(args: &[String]) -> Result<DocumentAsset, LedgerError> {
    let [id, owner, name, kind, fingerprint, locator, timestamp] = args else {
        return Err(LedgerError::ArgumentCount {
            transaction: CREATE_DOCUMENT.into(),
            expected: CREATE_DOCUMENT_ARITY,
            actual: args.len(),
        });
    };

    let metadata = DocumentMetadata::new(id, owner, name, kind);
    metadata.validate().map_err(|e| LedgerError::InvalidArgument {
        name: "metadata",
        reason: e.to_string(),
    })?;
    let fingerprint = Fingerprint::from_hex(fingerprint).map_err(|e| LedgerError::InvalidArgument {
        name: "fingerprint",
        reason: e.to_string(),
    })?;
    if locator.is_empty() {
        return Err(LedgerError::InvalidArgument {
            name: "locator",
            reason: "must not be empty".into(),
        });
    }
    let timestamp = decode_timestamp(timestamp).map_err(|e| LedgerError::InvalidArgument {
        name: "timestamp",
        reason: e.to_string(),
    })?;

    Ok(DocumentAsset::new(
        metadata,
        fingerprint,
        BlobLocator::new(locator.as_str()),
        timestamp,
    ))
}
