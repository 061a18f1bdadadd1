//! Read path of the document notary.
//!
//! - [`DocumentQueryService`] looks a document up in the ledger. It always
//!   produces a structured answer; ledger faults are reported, not raised.
//! - [`IntegrityVerifier`] re-fingerprints the stored blob and compares it
//!   with the fingerprint the ledger recorded.

pub mod error;
pub mod service;
pub mod verify;

pub use error::QueryError;
pub use service::{DocumentLookup, DocumentQueryService, QueryResponse};
pub use verify::{IntegrityVerifier, VerificationOutcome, VerificationReport};
