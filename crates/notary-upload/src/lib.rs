//! Upload/commit protocol of the document notary.
//!
//! An upload is a finite stream of [`UploadChunk`]s. The first chunk carries
//! the document metadata; every chunk may carry payload bytes. The
//! [`UploadCoordinator`] drives one [`UploadSession`] per stream:
//!
//! 1. Capture and validate metadata, then create the blob.
//! 2. Append each payload to the blob and the fingerprint accumulator.
//! 3. At end of stream, finalize the fingerprint and the blob.
//! 4. Submit `CreateDocument` to the ledger and wait for the commit.
//!
//! Any failure before the blob is finalized removes the partial bytes. A
//! ledger failure after finalization keeps them, and the error carries the
//! fingerprint and locator so the commit can be retried with
//! [`UploadCoordinator::recommit`].

pub mod chunk;
pub mod coordinator;
pub mod error;
pub mod response;
pub mod session;

pub use chunk::UploadChunk;
pub use coordinator::UploadCoordinator;
pub use error::{TransportError, UploadError, UploadResult};
pub use response::{CommitReceipt, UploadReceipt, UploadResponse};
pub use session::{SealedBlob, SessionPhase, UploadSession};
