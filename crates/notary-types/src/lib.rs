//! Foundation types for the document notary.
//!
//! This crate provides the identity, metadata, and record types shared by
//! every other notary crate.
//!
//! # Key Types
//!
//! - [`DocumentMetadata`] -- Caller-supplied description of an upload
//! - [`DocumentAsset`] -- The committed ledger record for a document
//! - [`Fingerprint`] -- Hex-encoded 256-bit content digest
//! - [`BlobLocator`] -- Opaque locator of off-ledger bytes
//! - [`SessionId`] -- UUID v7 identity of one upload attempt

pub mod document;
pub mod error;
pub mod fingerprint;
pub mod locator;
pub mod session;

pub use document::{decode_timestamp, encode_timestamp, DocumentAsset, DocumentMetadata};
pub use error::TypeError;
pub use fingerprint::Fingerprint;
pub use locator::BlobLocator;
pub use session::SessionId;
