use std::sync::Arc;

use chrono::Utc;
use futures::{pin_mut, Stream, StreamExt};
use notary_blob::BlobStore;
use notary_crypto::FingerprintAlgorithm;
use notary_ledger::{create_document_args, CommitStatus, LedgerGateway, CREATE_DOCUMENT};
use notary_types::{BlobLocator, DocumentMetadata, Fingerprint, SessionId};
use tracing::{info, warn};

use crate::chunk::UploadChunk;
use crate::error::{TransportError, UploadError, UploadResult};
use crate::response::{CommitReceipt, UploadReceipt, UploadResponse};
use crate::session::UploadSession;

/// Drives upload sessions against a blob store and the ledger.
///
/// One coordinator is shared by every upload. It holds no per-upload state;
/// each call to [`upload`](Self::upload) owns its own session.
pub struct UploadCoordinator<S: BlobStore> {
    store: Arc<S>,
    ledger: Arc<dyn LedgerGateway>,
    algorithm: FingerprintAlgorithm,
}

impl<S: BlobStore> Clone for UploadCoordinator<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            ledger: Arc::clone(&self.ledger),
            algorithm: self.algorithm,
        }
    }
}

impl<S: BlobStore> UploadCoordinator<S> {
    pub fn new(store: Arc<S>, ledger: Arc<dyn LedgerGateway>, algorithm: FingerprintAlgorithm) -> Self {
        Self {
            store,
            ledger,
            algorithm,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn algorithm(&self) -> FingerprintAlgorithm {
        self.algorithm
    }

    /// Run one upload stream to its terminal outcome.
    ///
    /// Dropping the returned future before it completes drops the session,
    /// which removes any partial blob.
    pub async fn upload<St>(&self, chunks: St) -> UploadResult<UploadReceipt>
    where
        St: Stream<Item = Result<UploadChunk, TransportError>> + Send,
    {
        let session_id = SessionId::new();
        let mut session = UploadSession::<S>::new(session_id, self.algorithm);
        pin_mut!(chunks);

        while let Some(item) = chunks.next().await {
            match item {
                Ok(chunk) => session.accept(&self.store, chunk).await?,
                Err(e) => {
                    let err = UploadError::Transport(e);
                    session.abort(&self.store, &err).await;
                    return Err(err);
                }
            }
        }

        let sealed = session.seal(&self.store).await?;
        match self
            .commit(&sealed.metadata, &sealed.fingerprint, &sealed.locator)
            .await
        {
            Ok(commit) => {
                session.complete(true);
                info!(
                    session = %session_id,
                    document = %sealed.metadata.document_id,
                    tx = %commit.transaction_id,
                    block = commit.block_number,
                    "upload committed"
                );
                Ok(UploadReceipt::new(session_id, sealed, commit))
            }
            Err(e) => {
                session.complete(false);
                Err(e)
            }
        }
    }

    /// Record a finalized blob in the ledger. Never retries.
    pub async fn commit(
        &self,
        metadata: &DocumentMetadata,
        fingerprint: &Fingerprint,
        locator: &BlobLocator,
    ) -> UploadResult<CommitReceipt> {
        let timestamp = Utc::now();
        let args = create_document_args(metadata, fingerprint, locator, &timestamp);

        let mut handle = self
            .ledger
            .submit(CREATE_DOCUMENT, &args)
            .await
            .map_err(|source| {
                warn!(document = %metadata.document_id, locator = %locator, error = %source, "ledger submit failed");
                UploadError::LedgerSubmit {
                    fingerprint: fingerprint.clone(),
                    locator: locator.clone(),
                    source,
                }
            })?;

        let transaction_id = handle.transaction_id().to_string();
        let commit_failed = |reason: String| {
            warn!(document = %metadata.document_id, tx = %transaction_id, locator = %locator, %reason, "ledger commit failed");
            UploadError::LedgerCommit {
                transaction_id: transaction_id.clone(),
                fingerprint: fingerprint.clone(),
                locator: locator.clone(),
                reason,
            }
        };

        match handle.status().await {
            Ok(CommitStatus::Committed { block_number }) => Ok(CommitReceipt {
                transaction_id: transaction_id.clone(),
                block_number,
                timestamp,
            }),
            Ok(CommitStatus::Rejected { code }) => {
                Err(commit_failed(format!("transaction rejected with code {code}")))
            }
            Err(e) => Err(commit_failed(e.to_string())),
        }
    }

    /// Retry the ledger step for a blob that was kept after a ledger failure.
    ///
    /// The stored bytes are fingerprinted again first. If they no longer match
    /// `fingerprint` nothing is submitted.
    pub async fn recommit(
        &self,
        metadata: &DocumentMetadata,
        fingerprint: &Fingerprint,
        locator: &BlobLocator,
    ) -> UploadResult<CommitReceipt> {
        metadata
            .validate()
            .map_err(|e| UploadError::Validation(e.to_string()))?;
        let actual = self.store.fingerprint(locator, self.algorithm).await?;
        if &actual != fingerprint {
            warn!(document = %metadata.document_id, locator = %locator, expected = %fingerprint, %actual, "stored blob changed");
            return Err(UploadError::FingerprintMismatch {
                locator: locator.clone(),
                expected: fingerprint.clone(),
                actual,
            });
        }
        info!(document = %metadata.document_id, locator = %locator, "recommitting stored blob");
        self.commit(metadata, fingerprint, locator).await
    }

    /// Run an upload and map its outcome to a response.
    ///
    /// Transport faults terminate the call; every other failure becomes a
    /// structured response.
    pub async fn handle<St>(&self, chunks: St) -> Result<UploadResponse, TransportError>
    where
        St: Stream<Item = Result<UploadChunk, TransportError>> + Send,
    {
        match self.upload(chunks).await {
            Ok(receipt) => Ok(UploadResponse::from(&receipt)),
            Err(UploadError::Transport(e)) => Err(e),
            Err(e) => Ok(UploadResponse::failed(&e)),
        }
    }

    /// Run a recommit and map its outcome to a response.
    pub async fn handle_recommit(
        &self,
        metadata: &DocumentMetadata,
        fingerprint: &Fingerprint,
        locator: &BlobLocator,
    ) -> UploadResponse {
        match self.recommit(metadata, fingerprint, locator).await {
            Ok(commit) => UploadResponse::committed(fingerprint, locator, &commit),
            Err(e) => UploadResponse::failed(&e),
        }
    }
}
