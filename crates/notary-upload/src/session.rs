use std::fmt;

use notary_blob::BlobStore;
use notary_crypto::{ContentAddresser, FingerprintAlgorithm};
use notary_types::{BlobLocator, DocumentMetadata, Fingerprint, SessionId};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::chunk::UploadChunk;
use crate::error::{UploadError, UploadResult};

/// Phase of an upload session. Phases only move forward.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SessionPhase {
    AwaitingMetadata,
    Streaming,
    Finalizing,
    Committing,
    Done,
    Failed,
}

impl SessionPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }

    /// Whether a chunk may be fed in this phase.
    pub fn accepts_chunks(&self) -> bool {
        matches!(self, Self::AwaitingMetadata | Self::Streaming)
    }
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::AwaitingMetadata => "awaiting-metadata",
            Self::Streaming => "streaming",
            Self::Finalizing => "finalizing",
            Self::Committing => "committing",
            Self::Done => "done",
            Self::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// A blob that has been finalized and fingerprinted, ready for the ledger.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SealedBlob {
    pub metadata: DocumentMetadata,
    pub fingerprint: Fingerprint,
    pub locator: BlobLocator,
    pub bytes: u64,
}

/// Per-stream upload state machine.
///
/// The session exclusively owns its open blob handle and fingerprint
/// accumulator. Dropping a session before it is sealed drops the handle,
/// which removes the partial blob.
pub struct UploadSession<S: BlobStore> {
    id: SessionId,
    phase: SessionPhase,
    metadata: Option<DocumentMetadata>,
    blob: Option<S::Handle>,
    addresser: Option<ContentAddresser>,
    bytes: u64,
}

impl<S: BlobStore> UploadSession<S> {
    pub fn new(id: SessionId, algorithm: FingerprintAlgorithm) -> Self {
        Self {
            id,
            phase: SessionPhase::AwaitingMetadata,
            metadata: None,
            blob: None,
            addresser: Some(ContentAddresser::new(algorithm)),
            bytes: 0,
        }
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn metadata(&self) -> Option<&DocumentMetadata> {
        self.metadata.as_ref()
    }

    /// Payload bytes accepted so far.
    pub fn bytes_received(&self) -> u64 {
        self.bytes
    }

    fn advance(&mut self, next: SessionPhase) {
        debug!(session = %self.id, from = %self.phase, to = %next, "session phase");
        self.phase = next;
    }

    /// Feed the next message of the stream.
    ///
    /// On any error the partial blob is discarded and the session is
    /// `Failed`.
    pub async fn accept(&mut self, store: &S, chunk: UploadChunk) -> UploadResult<()> {
        let result = match self.phase {
            SessionPhase::AwaitingMetadata => self.open(store, chunk).await,
            SessionPhase::Streaming => self.append(store, &chunk).await,
            phase => Err(UploadError::Protocol {
                phase,
                reason: "chunk received after end of stream".into(),
            }),
        };
        if let Err(e) = &result {
            self.fail(store, e).await;
        }
        result
    }

    async fn open(&mut self, store: &S, chunk: UploadChunk) -> UploadResult<()> {
        let metadata = chunk.metadata();
        metadata
            .validate()
            .map_err(|e| UploadError::Validation(e.to_string()))?;

        let handle = store.create(&self.id, &metadata.file_name).await?;
        info!(
            session = %self.id,
            document = %metadata.document_id,
            owner = %metadata.owner_id,
            file = %metadata.file_name,
            "upload session opened"
        );
        self.blob = Some(handle);
        self.metadata = Some(metadata);
        self.advance(SessionPhase::Streaming);
        self.append(store, &chunk).await
    }

    async fn append(&mut self, store: &S, chunk: &UploadChunk) -> UploadResult<()> {
        if !chunk.has_payload() {
            return Ok(());
        }
        let (Some(handle), Some(addresser)) = (self.blob.as_mut(), self.addresser.as_mut()) else {
            return Err(UploadError::Protocol {
                phase: self.phase,
                reason: "no open blob".into(),
            });
        };
        store.write(handle, &chunk.chunk_data).await?;
        addresser.update(&chunk.chunk_data);
        self.bytes += chunk.chunk_data.len() as u64;
        debug!(session = %self.id, bytes = chunk.chunk_data.len(), total = self.bytes, "chunk appended");
        Ok(())
    }

    /// End of stream: finalize the fingerprint and the blob.
    ///
    /// On success the session is `Committing` and the blob is durable.
    pub async fn seal(&mut self, store: &S) -> UploadResult<SealedBlob> {
        let result = self.seal_inner(store).await;
        if let Err(e) = &result {
            self.fail(store, e).await;
        }
        result
    }

    async fn seal_inner(&mut self, store: &S) -> UploadResult<SealedBlob> {
        match self.phase {
            SessionPhase::Streaming => {}
            SessionPhase::AwaitingMetadata => {
                return Err(UploadError::Validation("no metadata received".into()))
            }
            phase => {
                return Err(UploadError::Protocol {
                    phase,
                    reason: "session is already sealed".into(),
                })
            }
        }
        self.advance(SessionPhase::Finalizing);

        let (Some(metadata), Some(addresser), Some(handle)) =
            (self.metadata.clone(), self.addresser.take(), self.blob.as_mut())
        else {
            return Err(UploadError::Protocol {
                phase: self.phase,
                reason: "session state incomplete".into(),
            });
        };
        let fingerprint = addresser.finalize();
        let locator = store.finalize(handle).await?;
        self.advance(SessionPhase::Committing);

        info!(
            session = %self.id,
            document = %metadata.document_id,
            fingerprint = %fingerprint,
            locator = %locator,
            bytes = self.bytes,
            "blob sealed"
        );
        Ok(SealedBlob {
            metadata,
            fingerprint,
            locator,
            bytes: self.bytes,
        })
    }

    /// Abort after a transport fault.
    pub async fn abort(&mut self, store: &S, error: &UploadError) {
        self.fail(store, error).await;
    }

    /// Record the ledger outcome. The finalized blob is kept either way.
    pub fn complete(&mut self, committed: bool) {
        if self.phase != SessionPhase::Committing {
            warn!(session = %self.id, phase = %self.phase, "completion outside committing phase");
        }
        self.advance(if committed {
            SessionPhase::Done
        } else {
            SessionPhase::Failed
        });
    }

    async fn fail(&mut self, store: &S, error: &UploadError) {
        if self.phase.is_terminal() {
            return;
        }
        if let Some(handle) = self.blob.as_mut() {
            store.discard(handle).await;
        }
        warn!(session = %self.id, phase = %self.phase, kind = error.kind(), error = %error, "upload session failed");
        self.advance(SessionPhase::Failed);
    }
}

impl<S: BlobStore> fmt::Debug for UploadSession<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadSession")
            .field("id", &self.id)
            .field("phase", &self.phase)
            .field("metadata", &self.metadata)
            .field("bytes", &self.bytes)
            .finish()
    }
}
