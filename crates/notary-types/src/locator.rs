use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Opaque locator resolvable to the stored bytes of a document.
///
/// For the local blob store this is an absolute filesystem path. Other
/// backends may store URLs; consumers must not assume either form.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlobLocator(String);

impl BlobLocator {
    pub fn new(locator: impl Into<String>) -> Self {
        Self(locator.into())
    }

    /// Locator for a file on the local filesystem.
    pub fn from_path(path: &Path) -> Self {
        Self(path.to_string_lossy().into_owned())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Interpret the locator as a filesystem path.
    pub fn to_path(&self) -> PathBuf {
        PathBuf::from(&self.0)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for BlobLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BlobLocator({})", self.0)
    }
}

impl fmt::Display for BlobLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_roundtrip() {
        let path = Path::new("/var/notary/blobs/a.pdf");
        let loc = BlobLocator::from_path(path);
        assert_eq!(loc.as_str(), "/var/notary/blobs/a.pdf");
        assert_eq!(loc.to_path(), path);
    }

    #[test]
    fn serde_transparent() {
        let loc = BlobLocator::new("s3://bucket/key");
        assert_eq!(serde_json::to_string(&loc).unwrap(), "\"s3://bucket/key\"");
    }
}
