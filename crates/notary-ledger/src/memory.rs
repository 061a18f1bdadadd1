use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockWriteGuard};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::config::JournalConfig;
use crate::contract::{parse_create_document, CREATE_DOCUMENT, READ_DOCUMENT};
use crate::error::LedgerError;
use crate::journal::{JournalEntry, LedgerJournal};
use crate::traits::{CommitHandle, CommitStatus, LedgerGateway};

/// Validation code for a write that lost a race on the same key.
pub const MVCC_READ_CONFLICT: &str = "MVCC_READ_CONFLICT";

/// In-process ledger backend for tests, local deployments, and demos.
///
/// Implements the document contract with the semantics of an
/// endorse-then-commit ledger:
/// - `CreateDocument` is validated at submission. An id that is already
///   recorded fails there.
/// - The write lands when the commit handle is awaited. If another
///   transaction recorded the same id in between, the commit is rejected
///   with [`MVCC_READ_CONFLICT`].
/// - `ReadDocument` returns the stored JSON record.
#[derive(Clone)]
pub struct InMemoryLedger {
    inner: Arc<Shared>,
}

struct Shared {
    state: RwLock<LedgerState>,
    journal: Option<Arc<LedgerJournal>>,
    /// Serializes commits. The state lock is only held to check and apply.
    commits: Mutex<()>,
}

#[derive(Default)]
struct LedgerState {
    documents: HashMap<String, Vec<u8>>,
    transactions: HashMap<String, u64>,
    block_height: u64,
}

impl InMemoryLedger {
    /// A purely in-memory ledger.
    pub fn new() -> Self {
        Self::from_parts(LedgerState::default(), None)
    }

    /// A ledger whose committed writes are journaled to disk and replayed on
    /// open. Falls back to [`InMemoryLedger::new`] when no path is configured.
    pub fn with_journal(config: &JournalConfig) -> Result<Self, LedgerError> {
        let Some(path) = &config.path else {
            return Ok(Self::new());
        };
        let journal = LedgerJournal::open(path, config.sync_on_commit)
            .map_err(|e| LedgerError::Journal(e.to_string()))?;
        let entries = journal
            .replay()
            .map_err(|e| LedgerError::Journal(e.to_string()))?;

        let mut state = LedgerState::default();
        for entry in entries {
            state.block_height = state.block_height.max(entry.block_number);
            state.transactions.insert(entry.transaction_id, entry.block_number);
            state.documents.insert(entry.document_id, entry.record);
        }
        info!(
            journal = %path.display(),
            documents = state.documents.len(),
            block_height = state.block_height,
            "ledger recovered from journal"
        );
        Ok(Self::from_parts(state, Some(journal)))
    }

    fn from_parts(state: LedgerState, journal: Option<LedgerJournal>) -> Self {
        Self {
            inner: Arc::new(Shared {
                state: RwLock::new(state),
                journal: journal.map(Arc::new),
                commits: Mutex::new(()),
            }),
        }
    }

    /// Number of recorded documents.
    pub fn document_count(&self) -> usize {
        self.inner.state.read().map(|s| s.documents.len()).unwrap_or_default()
    }

    /// Height of the last committed block.
    pub fn block_height(&self) -> u64 {
        self.inner.state.read().map(|s| s.block_height).unwrap_or_default()
    }

    /// Block a transaction was committed in, if it was.
    pub fn committed_block(&self, transaction_id: &str) -> Option<u64> {
        self.inner
            .state
            .read()
            .ok()
            .and_then(|s| s.transactions.get(transaction_id).copied())
    }

    fn contains(&self, document_id: &str) -> Result<bool, LedgerError> {
        let state = self
            .inner
            .state
            .read()
            .map_err(|_| LedgerError::Unavailable("ledger read lock poisoned".into()))?;
        Ok(state.documents.contains_key(document_id))
    }
}

impl Default for InMemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for InMemoryLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryLedger")
            .field("document_count", &self.document_count())
            .field("block_height", &self.block_height())
            .field("journaled", &self.inner.journal.is_some())
            .finish()
    }
}

fn new_transaction_id() -> String {
    hex::encode(rand::random::<[u8; 32]>())
}

impl Shared {
    fn write_lock(&self) -> Result<RwLockWriteGuard<'_, LedgerState>, LedgerError> {
        self.state
            .write()
            .map_err(|_| LedgerError::Unavailable("ledger write lock poisoned".into()))
    }

    async fn commit(
        &self,
        transaction_id: &str,
        document_id: &str,
        record: &[u8],
    ) -> Result<CommitStatus, LedgerError> {
        let _serial = self.commits.lock().await;

        let block_number = {
            let state = self
                .state
                .read()
                .map_err(|_| LedgerError::Unavailable("ledger read lock poisoned".into()))?;
            if state.documents.contains_key(document_id) {
                warn!(tx = transaction_id, document = document_id, "write conflict at commit");
                return Ok(CommitStatus::Rejected {
                    code: MVCC_READ_CONFLICT.into(),
                });
            }
            state.block_height + 1
        };

        if let Some(journal) = &self.journal {
            let journal = Arc::clone(journal);
            let entry = JournalEntry {
                transaction_id: transaction_id.to_string(),
                block_number,
                document_id: document_id.to_string(),
                record: record.to_vec(),
            };
            let unavailable = |reason: String| LedgerError::CommitUnavailable {
                transaction_id: transaction_id.to_string(),
                reason,
            };
            tokio::task::spawn_blocking(move || journal.append(&entry))
                .await
                .map_err(|e| unavailable(e.to_string()))?
                .map_err(|e| unavailable(e.to_string()))?;
        }

        let mut state = self.write_lock()?;
        state.block_height = block_number;
        state.transactions.insert(transaction_id.to_string(), block_number);
        state.documents.insert(document_id.to_string(), record.to_vec());
        debug!(tx = transaction_id, document = document_id, block_number, "transaction committed");
        Ok(CommitStatus::Committed { block_number })
    }
}

/// Commit handle for a `CreateDocument` submission.
struct PendingWrite {
    ledger: Arc<Shared>,
    transaction_id: String,
    document_id: String,
    record: Vec<u8>,
    resolved: Option<CommitStatus>,
}

#[async_trait]
impl CommitHandle for PendingWrite {
    fn transaction_id(&self) -> &str {
        &self.transaction_id
    }

    async fn status(&mut self) -> Result<CommitStatus, LedgerError> {
        if let Some(status) = &self.resolved {
            return Ok(status.clone());
        }
        let status = self
            .ledger
            .commit(&self.transaction_id, &self.document_id, &self.record)
            .await?;
        self.resolved = Some(status.clone());
        Ok(status)
    }
}

#[async_trait]
impl LedgerGateway for InMemoryLedger {
    async fn submit(
        &self,
        transaction: &str,
        args: &[String],
    ) -> Result<Box<dyn CommitHandle>, LedgerError> {
        if transaction != CREATE_DOCUMENT {
            return Err(LedgerError::UnknownTransaction(transaction.to_string()));
        }
        let asset = parse_create_document(args)?;
        if self.contains(&asset.id)? {
            return Err(LedgerError::AlreadyExists(asset.id));
        }
        let record = asset
            .to_ledger_bytes()
            .map_err(|e| LedgerError::InvalidArgument {
                name: "record",
                reason: e.to_string(),
            })?;

        let transaction_id = new_transaction_id();
        debug!(tx = %transaction_id, document = %asset.id, "transaction endorsed");
        Ok(Box::new(PendingWrite {
            ledger: Arc::clone(&self.inner),
            transaction_id,
            document_id: asset.id,
            record,
            resolved: None,
        }))
    }

    async fn evaluate(&self, transaction: &str, args: &[String]) -> Result<Vec<u8>, LedgerError> {
        if transaction != READ_DOCUMENT {
            return Err(LedgerError::UnknownTransaction(transaction.to_string()));
        }
        let [document_id] = args else {
            return Err(LedgerError::ArgumentCount {
                transaction: READ_DOCUMENT.into(),
                expected: 1,
                actual: args.len(),
            });
        };
        let state = self
            .inner
            .state
            .read()
            .map_err(|_| LedgerError::Unavailable("ledger read lock poisoned".into()))?;
        state
            .documents
            .get(document_id)
            .cloned()
            .ok_or_else(|| LedgerError::NotFound(document_id.clone()))
    }
}
