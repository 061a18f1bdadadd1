//! Off-ledger blob storage for the document notary.
//!
//! Raw document bytes never touch the ledger. They are written to a blob
//! store, one file per upload attempt, and the ledger records only a locator
//! and a fingerprint of those bytes.
//!
//! # Storage Backends
//!
//! All backends implement the [`BlobStore`] trait:
//!
//! - [`LocalBlobStore`] -- a directory on the local filesystem
//!
//! # Design Rules
//!
//! 1. Every upload attempt gets its own exclusively created file.
//! 2. File names derive from session identity and a high-resolution clock,
//!    never from caller-supplied names alone.
//! 3. A handle that is dropped while still open deletes its file.
//! 4. Discarding never fails; cleanup problems are logged.
//! 5. Finalized blobs are never deleted by the store.

pub mod config;
pub mod error;
pub mod handle;
pub mod local;
pub mod naming;
pub mod traits;

pub use config::BlobStoreConfig;
pub use error::{BlobError, BlobResult};
pub use handle::{BlobHandle, BlobState};
pub use local::LocalBlobStore;
pub use naming::blob_file_name;
pub use traits::BlobStore;
