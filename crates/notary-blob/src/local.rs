use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use notary_crypto::{ContentAddresser, FingerprintAlgorithm};
use notary_types::{BlobLocator, Fingerprint, SessionId};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

use crate::config::BlobStoreConfig;
use crate::error::{BlobError, BlobResult};
use crate::handle::{BlobHandle, BlobState};
use crate::naming::blob_file_name;
use crate::traits::BlobStore;

/// Blob store backed by a directory on the local filesystem.
///
/// The root is shared by all sessions but each session only ever touches the
/// file it created, so no locking is needed.
#[derive(Clone, Debug)]
pub struct LocalBlobStore {
    root: PathBuf,
    sync_on_finalize: bool,
}

impl LocalBlobStore {
    /// Open the store, creating the root directory if needed.
    ///
    /// The root is canonicalized so that every locator handed out is an
    /// absolute path.
    pub fn open(config: &BlobStoreConfig) -> BlobResult<Self> {
        std::fs::create_dir_all(&config.root).map_err(BlobError::io(&config.root))?;
        let root = std::fs::canonicalize(&config.root).map_err(BlobError::io(&config.root))?;
        info!(root = %root.display(), "blob store ready");
        Ok(Self {
            root,
            sync_on_finalize: config.sync_on_finalize,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// All blob files currently under the root, sorted by name.
    pub async fn list(&self) -> BlobResult<Vec<PathBuf>> {
        let mut entries = fs::read_dir(&self.root).await.map_err(BlobError::io(&self.root))?;
        let mut paths = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(BlobError::io(&self.root))? {
            let file_type = entry.file_type().await.map_err(BlobError::io(entry.path()))?;
            if file_type.is_file() {
                paths.push(entry.path());
            }
        }
        paths.sort();
        Ok(paths)
    }

    /// Resolve a locator to a file under the root.
    fn resolve(&self, locator: &BlobLocator) -> BlobResult<PathBuf> {
        let path = locator.to_path();
        let path = match std::fs::canonicalize(&path) {
            Ok(p) => p,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(BlobError::NotFound(locator.clone()))
            }
            Err(e) => return Err(BlobError::io(&path)(e)),
        };
        if !path.starts_with(&self.root) {
            return Err(BlobError::OutsideRoot(locator.clone()));
        }
        Ok(path)
    }
}

fn now_nanos() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos()
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    type Handle = BlobHandle;

    async fn create(&self, session: &SessionId, suggested_name: &str) -> BlobResult<BlobHandle> {
        let path = self.root.join(blob_file_name(session, suggested_name, now_nanos()));
        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
            .map_err(BlobError::io(&path))?;
        debug!(session = %session, path = %path.display(), "blob created");
        Ok(BlobHandle::new(*session, path, file))
    }

    async fn write(&self, handle: &mut BlobHandle, data: &[u8]) -> BlobResult<usize> {
        let path = handle.path().to_path_buf();
        let file = match handle.file.as_mut() {
            Some(file) if handle.state == BlobState::Open => file,
            _ => {
                return Err(BlobError::NotWritable {
                    path,
                    state: handle.state,
                })
            }
        };
        file.write_all(data).await.map_err(BlobError::io(&path))?;
        handle.written += data.len() as u64;
        Ok(data.len())
    }

    async fn finalize(&self, handle: &mut BlobHandle) -> BlobResult<BlobLocator> {
        if handle.state != BlobState::Open {
            return Err(BlobError::NotWritable {
                path: handle.path().to_path_buf(),
                state: handle.state,
            });
        }
        let path = handle.path().to_path_buf();
        if let Some(file) = handle.file.as_mut() {
            file.flush().await.map_err(BlobError::io(&path))?;
            if self.sync_on_finalize {
                file.sync_all().await.map_err(BlobError::io(&path))?;
            }
        }
        handle.file = None;
        handle.state = BlobState::Finalized;
        debug!(
            session = %handle.session(),
            path = %handle.path().display(),
            bytes = handle.written,
            "blob finalized"
        );
        Ok(BlobLocator::from_path(handle.path()))
    }

    async fn discard(&self, handle: &mut BlobHandle) {
        if handle.state != BlobState::Open {
            debug!(path = %handle.path().display(), state = %handle.state, "discard is a no-op");
            return;
        }
        handle.file = None;
        handle.state = BlobState::Discarded;
        match fs::remove_file(handle.path()).await {
            Ok(()) => debug!(session = %handle.session(), path = %handle.path().display(), "blob discarded"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(
                session = %handle.session(),
                path = %handle.path().display(),
                error = %e,
                "failed to discard blob"
            ),
        }
    }

    async fn fingerprint(
        &self,
        locator: &BlobLocator,
        algorithm: FingerprintAlgorithm,
    ) -> BlobResult<Fingerprint> {
        let path = self.resolve(locator)?;
        let mut file = fs::File::open(&path).await.map_err(BlobError::io(&path))?;
        let (fingerprint, _) = ContentAddresser::fingerprint_reader(algorithm, &mut file)
            .await
            .map_err(BlobError::io(&path))?;
        Ok(fingerprint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> (tempfile::TempDir, LocalBlobStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalBlobStore::open(&BlobStoreConfig::with_root(dir.path().join("blobs"))).unwrap();
        (dir, store)
    }

    #[tokio::test]
    async fn open_creates_missing_root() {
        let (dir, store) = store();
        assert!(dir.path().join("blobs").is_dir());
        assert!(store.root().is_absolute());
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn write_and_finalize_persists_bytes() {
        let (_dir, store) = store();
        let session = SessionId::new();
        let mut handle = store.create(&session, "notes.txt").await.unwrap();
        assert_eq!(store.write(&mut handle, b"hello ").await.unwrap(), 6);
        assert_eq!(store.write(&mut handle, b"world").await.unwrap(), 5);
        assert_eq!(handle.bytes_written(), 11);

        let locator = store.finalize(&mut handle).await.unwrap();
        assert_eq!(handle.state(), BlobState::Finalized);
        assert_eq!(std::fs::read(locator.to_path()).unwrap(), b"hello world");
        assert!(locator.as_str().ends_with(".txt"));
        assert!(locator.as_str().contains(&session.simple()));
    }

    #[tokio::test]
    async fn same_suggested_name_never_collides() {
        let (_dir, store) = store();
        let mut a = store.create(&SessionId::new(), "same.pdf").await.unwrap();
        let mut b = store.create(&SessionId::new(), "same.pdf").await.unwrap();
        assert_ne!(a.path(), b.path());
        store.finalize(&mut a).await.unwrap();
        store.finalize(&mut b).await.unwrap();
        assert_eq!(store.list().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn discard_removes_file() {
        let (_dir, store) = store();
        let mut handle = store.create(&SessionId::new(), "x.bin").await.unwrap();
        store.write(&mut handle, b"partial").await.unwrap();
        store.discard(&mut handle).await;
        assert_eq!(handle.state(), BlobState::Discarded);
        assert!(!handle.path().exists());
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn discard_is_idempotent_and_spares_finalized_blobs() {
        let (_dir, store) = store();
        let mut handle = store.create(&SessionId::new(), "keep.bin").await.unwrap();
        store.write(&mut handle, b"durable").await.unwrap();
        let locator = store.finalize(&mut handle).await.unwrap();

        store.discard(&mut handle).await;
        store.discard(&mut handle).await;
        assert_eq!(handle.state(), BlobState::Finalized);
        assert!(locator.to_path().exists());
    }

    #[tokio::test]
    async fn write_after_finalize_is_rejected() {
        let (_dir, store) = store();
        let mut handle = store.create(&SessionId::new(), "a.txt").await.unwrap();
        store.finalize(&mut handle).await.unwrap();
        let err = store.write(&mut handle, b"late").await.unwrap_err();
        assert!(matches!(err, BlobError::NotWritable { state: BlobState::Finalized, .. }));
        assert!(store.finalize(&mut handle).await.is_err());
    }

    #[tokio::test]
    async fn dropping_open_handle_deletes_file() {
        let (_dir, store) = store();
        let handle = store.create(&SessionId::new(), "abandoned.txt").await.unwrap();
        let path = handle.path().to_path_buf();
        assert!(path.exists());
        drop(handle);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn dropping_finalized_handle_keeps_file() {
        let (_dir, store) = store();
        let mut handle = store.create(&SessionId::new(), "kept.txt").await.unwrap();
        store.write(&mut handle, b"data").await.unwrap();
        let locator = store.finalize(&mut handle).await.unwrap();
        drop(handle);
        assert!(locator.to_path().exists());
    }

    #[tokio::test]
    async fn fingerprint_matches_written_bytes() {
        let (_dir, store) = store();
        let data = vec![0x5au8; notary_crypto::addresser::READ_BUFFER_SIZE * 2 + 17];
        let mut handle = store.create(&SessionId::new(), "big.bin").await.unwrap();
        for chunk in data.chunks(1000) {
            store.write(&mut handle, chunk).await.unwrap();
        }
        let locator = store.finalize(&mut handle).await.unwrap();

        for algorithm in [FingerprintAlgorithm::Sha256, FingerprintAlgorithm::Blake3] {
            let fp = store.fingerprint(&locator, algorithm).await.unwrap();
            assert_eq!(fp, ContentAddresser::fingerprint(algorithm, &data));
        }
    }

    #[tokio::test]
    async fn fingerprint_of_missing_blob_is_not_found() {
        let (_dir, store) = store();
        let locator = BlobLocator::from_path(&store.root().join("missing.bin"));
        let err = store
            .fingerprint(&locator, FingerprintAlgorithm::Sha256)
            .await
            .unwrap_err();
        assert!(matches!(err, BlobError::NotFound(_)));
    }

    #[tokio::test]
    async fn fingerprint_outside_root_is_refused() {
        let (dir, store) = store();
        let outside = dir.path().join("outside.txt");
        std::fs::write(&outside, b"secret").unwrap();
        let err = store
            .fingerprint(&BlobLocator::from_path(&outside), FingerprintAlgorithm::Sha256)
            .await
            .unwrap_err();
        assert!(matches!(err, BlobError::OutsideRoot(_)));
    }

    #[tokio::test]
    async fn create_fails_when_root_disappears() {
        let (_dir, store) = store();
        std::fs::remove_dir_all(store.root()).unwrap();
        let err = store.create(&SessionId::new(), "a.txt").await.unwrap_err();
        assert!(matches!(err, BlobError::Io { .. }));
    }
}
