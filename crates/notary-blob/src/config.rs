use std::path::PathBuf;

use notary_crypto::FingerprintAlgorithm;
use serde::{Deserialize, Serialize};

/// Configuration for the off-ledger blob store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlobStoreConfig {
    /// Directory holding one file per upload. Created if missing.
    pub root: PathBuf,
    /// Algorithm used to fingerprint every blob in this deployment.
    pub fingerprint: FingerprintAlgorithm,
    /// Whether `finalize` calls `fsync` before returning the locator.
    pub sync_on_finalize: bool,
}

impl Default for BlobStoreConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("off_chain_documents"),
            fingerprint: FingerprintAlgorithm::Sha256,
            sync_on_finalize: true,
        }
    }
}

impl BlobStoreConfig {
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let c = BlobStoreConfig::default();
        assert_eq!(c.root, PathBuf::from("off_chain_documents"));
        assert_eq!(c.fingerprint, FingerprintAlgorithm::Sha256);
        assert!(c.sync_on_finalize);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let c: BlobStoreConfig = toml::from_str("fingerprint = \"blake3\"").unwrap();
        assert_eq!(c.fingerprint, FingerprintAlgorithm::Blake3);
        assert_eq!(c.root, PathBuf::from("off_chain_documents"));
    }
}
