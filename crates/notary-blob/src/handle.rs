use std::fmt;
use std::path::{Path, PathBuf};

use notary_types::SessionId;
use tokio::fs::File;
use tracing::{debug, warn};

/// Lifecycle of a blob handle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlobState {
    /// Accepting writes.
    Open,
    /// Closed for writing; the bytes are durable and owned by the store.
    Finalized,
    /// Closed and deleted.
    Discarded,
}

impl fmt::Display for BlobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Open => "open",
            Self::Finalized => "finalized",
            Self::Discarded => "discarded",
        };
        f.write_str(s)
    }
}

/// Exclusive ownership of one blob file.
///
/// A handle that is dropped while still [`BlobState::Open`] deletes its file.
/// This is what keeps a cancelled upload (a dropped future) from leaving
/// partial bytes behind.
pub struct BlobHandle {
    session: SessionId,
    path: PathBuf,
    pub(crate) file: Option<File>,
    pub(crate) state: BlobState,
    pub(crate) written: u64,
}

impl BlobHandle {
    pub(crate) fn new(session: SessionId, path: PathBuf, file: File) -> Self {
        Self {
            session,
            path,
            file: Some(file),
            state: BlobState::Open,
            written: 0,
        }
    }

    pub fn session(&self) -> &SessionId {
        &self.session
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn state(&self) -> BlobState {
        self.state
    }

    /// Bytes appended so far.
    pub fn bytes_written(&self) -> u64 {
        self.written
    }
}

impl fmt::Debug for BlobHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlobHandle")
            .field("session", &self.session)
            .field("path", &self.path)
            .field("state", &self.state)
            .field("written", &self.written)
            .finish()
    }
}

impl Drop for BlobHandle {
    fn drop(&mut self) {
        if self.state != BlobState::Open {
            return;
        }
        // Close before unlinking so the removal also succeeds on platforms
        // that refuse to delete open files.
        self.file.take();
        self.state = BlobState::Discarded;
        match std::fs::remove_file(&self.path) {
            Ok(()) => debug!(session = %self.session, path = %self.path.display(), "removed abandoned blob"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(
                session = %self.session,
                path = %self.path.display(),
                error = %e,
                "failed to remove abandoned blob"
            ),
        }
    }
}
