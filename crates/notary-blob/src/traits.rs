use async_trait::async_trait;
use notary_crypto::FingerprintAlgorithm;
use notary_types::{BlobLocator, Fingerprint, SessionId};

use crate::error::BlobResult;

/// Off-ledger blob store.
///
/// All implementations must satisfy these invariants:
/// - `create` never hands out a name already used by another session.
/// - `write` appends in call order; a failed write is not rolled back.
/// - `finalize` is called at most once per handle and makes the bytes durable.
/// - `discard` never fails and is a no-op on finalized or discarded handles.
/// - A handle dropped while open must not leave its bytes behind.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Exclusive ownership of one blob in this store.
    type Handle: Send;

    /// Allocate a new blob for `session`, named after `suggested_name`.
    async fn create(&self, session: &SessionId, suggested_name: &str)
        -> BlobResult<Self::Handle>;

    /// Append bytes and return how many were written.
    async fn write(&self, handle: &mut Self::Handle, data: &[u8]) -> BlobResult<usize>;

    /// Close the blob for writing and return its durable locator.
    async fn finalize(&self, handle: &mut Self::Handle) -> BlobResult<BlobLocator>;

    /// Close (if open) and delete the blob. Failures are logged, not returned.
    async fn discard(&self, handle: &mut Self::Handle);

    /// Recompute the fingerprint of a stored blob.
    async fn fingerprint(
        &self,
        locator: &BlobLocator,
        algorithm: FingerprintAlgorithm,
    ) -> BlobResult<Fingerprint>;
}
