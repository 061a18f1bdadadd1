use std::path::PathBuf;

use notary_types::BlobLocator;

use crate::handle::BlobState;

/// Errors from blob store operations.
#[derive(Debug, thiserror::Error)]
pub enum BlobError {
    /// I/O error from the underlying filesystem.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The handle is no longer accepting writes.
    #[error("blob {path} is {state}, not open for writing")]
    NotWritable { path: PathBuf, state: BlobState },

    /// No blob exists at the locator.
    #[error("blob not found: {0}")]
    NotFound(BlobLocator),

    /// The locator resolves outside the configured root.
    #[error("locator {0} is outside the blob root")]
    OutsideRoot(BlobLocator),
}

impl BlobError {
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| Self::Io { path, source }
    }
}

/// Result alias for blob store operations.
pub type BlobResult<T> = Result<T, BlobError>;
