use notary_ledger::LedgerError;

/// Why a lookup could not produce a record.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    #[error("validation error: {0}")]
    Validation(String),

    /// The ledger returned bytes that are not a document record.
    #[error("parse error: {0}")]
    Parse(String),

    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),
}

impl QueryError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "ValidationError",
            Self::Parse(_) => "ParseError",
            Self::Ledger(_) => "LedgerError",
        }
    }
}
