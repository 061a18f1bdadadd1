/// Errors produced by ledger operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error("unknown transaction: {0}")]
    UnknownTransaction(String),

    #[error("{transaction} expects {expected} arguments, got {actual}")]
    ArgumentCount {
        transaction: String,
        expected: usize,
        actual: usize,
    },

    #[error("invalid argument `{name}`: {reason}")]
    InvalidArgument { name: &'static str, reason: String },

    #[error("document {0} already exists")]
    AlreadyExists(String),

    #[error("document {0} does not exist")]
    NotFound(String),

    #[error("commit status unavailable for transaction {transaction_id}: {reason}")]
    CommitUnavailable {
        transaction_id: String,
        reason: String,
    },

    #[error("ledger unavailable: {0}")]
    Unavailable(String),

    #[error("journal error: {0}")]
    Journal(String),
}

impl LedgerError {
    /// Whether the backend reported that the requested record is absent.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
