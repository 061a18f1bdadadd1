use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::fingerprint::Fingerprint;
use crate::locator::BlobLocator;

/// Caller-supplied description of a document, captured from the first
/// message of an upload stream and immutable afterwards.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentMetadata {
    pub document_id: String,
    pub owner_id: String,
    pub file_name: String,
    pub file_type: String,
}

impl DocumentMetadata {
    pub fn new(
        document_id: impl Into<String>,
        owner_id: impl Into<String>,
        file_name: impl Into<String>,
        file_type: impl Into<String>,
    ) -> Self {
        Self {
            document_id: document_id.into(),
            owner_id: owner_id.into(),
            file_name: file_name.into(),
            file_type: file_type.into(),
        }
    }

    /// Check that every field is non-empty. Reports the first empty field in
    /// declaration order.
    pub fn validate(&self) -> Result<(), TypeError> {
        let fields = [
            ("documentId", &self.document_id),
            ("ownerId", &self.owner_id),
            ("fileName", &self.file_name),
            ("fileType", &self.file_type),
        ];
        for (name, value) in fields {
            if value.is_empty() {
                return Err(TypeError::EmptyField(name));
            }
        }
        Ok(())
    }
}

/// The committed ledger record for a document.
///
/// The field names on the wire are those used by the ledger contract
/// (`ID`, `UserID`, `DocumentHash`, `OffChainURL`, ...). The record is owned by
/// the ledger; any local copy is derived state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentAsset {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "UserID")]
    pub owner_id: String,
    #[serde(rename = "FileName")]
    pub file_name: String,
    #[serde(rename = "FileType")]
    pub file_type: String,
    #[serde(rename = "DocumentHash")]
    pub content_fingerprint: Fingerprint,
    #[serde(rename = "OffChainURL")]
    pub blob_location: BlobLocator,
    #[serde(rename = "Timestamp")]
    pub timestamp: DateTime<Utc>,
}

impl DocumentAsset {
    pub fn new(
        metadata: DocumentMetadata,
        content_fingerprint: Fingerprint,
        blob_location: BlobLocator,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: metadata.document_id,
            owner_id: metadata.owner_id,
            file_name: metadata.file_name,
            file_type: metadata.file_type,
            content_fingerprint,
            blob_location,
            timestamp,
        }
    }

    /// The descriptive part of the record.
    pub fn metadata(&self) -> DocumentMetadata {
        DocumentMetadata::new(&self.id, &self.owner_id, &self.file_name, &self.file_type)
    }

    /// Decode the JSON record returned by the ledger.
    pub fn from_ledger_bytes(bytes: &[u8]) -> Result<Self, TypeError> {
        serde_json::from_slice(bytes).map_err(|e| TypeError::Serialization(e.to_string()))
    }

    /// Encode the record the way the ledger stores it.
    pub fn to_ledger_bytes(&self) -> Result<Vec<u8>, TypeError> {
        serde_json::to_vec(self).map_err(|e| TypeError::Serialization(e.to_string()))
    }
}

/// Render a commit instant as the RFC 3339 string passed to the ledger.
pub fn encode_timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

/// Parse a commit instant produced by [`encode_timestamp`] (or any RFC 3339
/// string).
pub fn decode_timestamp(s: &str) -> Result<DateTime<Utc>, TypeError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| TypeError::InvalidTimestamp(format!("{s}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn metadata() -> DocumentMetadata {
        DocumentMetadata::new("doc-1", "alice", "contract.pdf", "application/pdf")
    }

    fn asset() -> DocumentAsset {
        DocumentAsset::new(
            metadata(),
            Fingerprint::from_digest([7; 32]),
            BlobLocator::new("/blobs/doc-1.pdf"),
            Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap(),
        )
    }

    #[test]
    fn complete_metadata_validates() {
        assert!(metadata().validate().is_ok());
    }

    #[test]
    fn empty_owner_is_reported() {
        let mut m = metadata();
        m.owner_id.clear();
        assert_eq!(m.validate(), Err(TypeError::EmptyField("ownerId")));
    }

    #[test]
    fn first_empty_field_wins() {
        let m = DocumentMetadata::new("", "", "a.txt", "");
        assert_eq!(m.validate(), Err(TypeError::EmptyField("documentId")));
    }

    #[test]
    fn ledger_encoding_uses_contract_keys() {
        let value: serde_json::Value =
            serde_json::from_slice(&asset().to_ledger_bytes().unwrap()).unwrap();
        let obj = value.as_object().unwrap();
        for key in ["ID", "UserID", "FileName", "FileType", "DocumentHash", "OffChainURL", "Timestamp"] {
            assert!(obj.contains_key(key), "missing key {key}");
        }
        assert_eq!(obj["UserID"], "alice");
        assert_eq!(obj["OffChainURL"], "/blobs/doc-1.pdf");
    }

    #[test]
    fn decodes_record_written_by_another_client() {
        let raw = format!(
            r#"{{"ID":"doc-9","UserID":"bob","FileName":"x.png","FileType":"image/png",
                "DocumentHash":"{}","OffChainURL":"/b/x.png","Timestamp":"2026-03-01T10:00:00Z"}}"#,
            "0f".repeat(32)
        );
        let asset = DocumentAsset::from_ledger_bytes(raw.as_bytes()).unwrap();
        assert_eq!(asset.id, "doc-9");
        assert_eq!(asset.owner_id, "bob");
        assert_eq!(asset.content_fingerprint.as_str(), "0f".repeat(32));
        assert_eq!(asset.metadata().file_type, "image/png");
    }

    #[test]
    fn malformed_record_is_a_serialization_error() {
        let err = DocumentAsset::from_ledger_bytes(b"{\"ID\": 5}").unwrap_err();
        assert!(matches!(err, TypeError::Serialization(_)));
    }

    #[test]
    fn timestamp_encoding_is_parseable() {
        let at = Utc.with_ymd_and_hms(2026, 10, 14, 12, 0, 0).unwrap();
        let s = encode_timestamp(&at);
        assert!(s.ends_with('Z'));
        assert_eq!(decode_timestamp(&s).unwrap(), at);
    }

    #[test]
    fn garbage_timestamp_is_rejected() {
        assert!(matches!(
            decode_timestamp("yesterday"),
            Err(TypeError::InvalidTimestamp(_))
        ));
    }
}
