//! Ledger gateway for the document notary.
//!
//! The ledger is an external transactional store reached through a
//! submit/evaluate contract. This crate provides:
//! - `LedgerGateway` / `CommitHandle` trait boundaries
//! - The `CreateDocument` / `ReadDocument` argument codec
//! - `InMemoryLedger`, an in-process backend with the same contract semantics
//! - `LedgerJournal`, an append-only, CRC-framed journal that lets the
//!   in-process backend survive restarts

pub mod config;
pub mod contract;
pub mod error;
pub mod journal;
pub mod memory;
pub mod traits;

pub use config::JournalConfig;
pub use contract::{
    create_document_args, parse_create_document, CREATE_DOCUMENT, CREATE_DOCUMENT_ARITY,
    READ_DOCUMENT,
};
pub use error::LedgerError;
pub use journal::{JournalEntry, JournalError, LedgerJournal};
pub use memory::InMemoryLedger;
pub use traits::{CommitHandle, CommitStatus, LedgerGateway};
