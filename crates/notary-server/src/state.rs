use std::sync::Arc;

use notary_blob::LocalBlobStore;
use notary_crypto::FingerprintAlgorithm;
use notary_ledger::{InMemoryLedger, LedgerGateway};
use notary_query::{DocumentQueryService, IntegrityVerifier};
use notary_upload::UploadCoordinator;
use tracing::info;

use crate::config::ServerConfig;
use crate::error::ServerResult;

/// Shared request state. Cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    pub coordinator: UploadCoordinator<LocalBlobStore>,
    pub query: DocumentQueryService,
    pub verifier: IntegrityVerifier<LocalBlobStore>,
}

impl AppState {
    /// Wire the services around one blob store and one ledger handle.
    pub fn new(
        store: Arc<LocalBlobStore>,
        ledger: Arc<dyn LedgerGateway>,
        algorithm: FingerprintAlgorithm,
    ) -> Self {
        let query = DocumentQueryService::new(Arc::clone(&ledger));
        Self {
            coordinator: UploadCoordinator::new(Arc::clone(&store), ledger, algorithm),
            verifier: IntegrityVerifier::new(query.clone(), store, algorithm),
            query,
        }
    }

    /// Open the configured blob store and the in-process ledger.
    pub fn from_config(config: &ServerConfig) -> ServerResult<Self> {
        let store = Arc::new(LocalBlobStore::open(&config.storage)?);
        let ledger = Arc::new(InMemoryLedger::with_journal(&config.ledger)?);
        info!(
            blob_root = %store.root().display(),
            fingerprint = %config.storage.fingerprint,
            journal = ?config.ledger.path,
            "notary state ready"
        );
        Ok(Self::new(store, ledger, config.storage.fingerprint))
    }

    pub fn algorithm(&self) -> FingerprintAlgorithm {
        self.coordinator.algorithm()
    }

    pub fn store(&self) -> &LocalBlobStore {
        self.coordinator.store()
    }
}
