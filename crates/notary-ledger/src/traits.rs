use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::LedgerError;

/// Final status of a submitted transaction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommitStatus {
    /// The write is part of the ledger at `block_number`.
    Committed { block_number: u64 },
    /// The transaction was ordered but failed validation.
    Rejected { code: String },
}

impl CommitStatus {
    pub fn is_committed(&self) -> bool {
        matches!(self, Self::Committed { .. })
    }
}

/// Pending result of an asynchronous submission.
#[async_trait]
pub trait CommitHandle: Send {
    /// Identifier assigned to the transaction at submission.
    fn transaction_id(&self) -> &str;

    /// Wait for the transaction to be committed or rejected.
    async fn status(&mut self) -> Result<CommitStatus, LedgerError>;
}

/// Submit/evaluate boundary of the transactional ledger.
///
/// Implementations are shared capabilities: concurrent calls through one
/// gateway must be safe.
#[async_trait]
pub trait LedgerGateway: Send + Sync {
    /// Endorse and order a state-changing transaction.
    async fn submit(
        &self,
        transaction: &str,
        args: &[String],
    ) -> Result<Box<dyn CommitHandle>, LedgerError>;

    /// Run a read-only transaction and return its raw result.
    async fn evaluate(&self, transaction: &str, args: &[String]) -> Result<Vec<u8>, LedgerError>;
}
