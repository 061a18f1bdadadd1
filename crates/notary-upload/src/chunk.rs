use bytes::Bytes;
use notary_types::DocumentMetadata;

/// One message of an upload stream.
///
/// Only the metadata fields of the first message are read. Later messages
/// are payload carriers and their metadata fields are ignored.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UploadChunk {
    pub document_id: String,
    pub owner_id: String,
    pub file_name: String,
    pub file_type: String,
    pub chunk_data: Bytes,
}

impl UploadChunk {
    /// Opening message: metadata plus an optional first payload.
    pub fn first(metadata: DocumentMetadata, data: impl Into<Bytes>) -> Self {
        Self {
            document_id: metadata.document_id,
            owner_id: metadata.owner_id,
            file_name: metadata.file_name,
            file_type: metadata.file_type,
            chunk_data: data.into(),
        }
    }

    /// Payload-only message.
    pub fn data(data: impl Into<Bytes>) -> Self {
        Self {
            chunk_data: data.into(),
            ..Self::default()
        }
    }

    /// The metadata fields as carried by this message.
    pub fn metadata(&self) -> DocumentMetadata {
        DocumentMetadata::new(
            self.document_id.as_str(),
            self.owner_id.as_str(),
            self.file_name.as_str(),
            self.file_type.as_str(),
        )
    }

    pub fn has_payload(&self) -> bool {
        !self.chunk_data.is_empty()
    }
}
