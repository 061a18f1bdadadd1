use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Persistence settings for the in-process ledger backend.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JournalConfig {
    /// Journal file. `None` keeps the ledger purely in memory.
    pub path: Option<PathBuf>,
    /// `fsync` after every committed write.
    pub sync_on_commit: bool,
}

impl JournalConfig {
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            sync_on_commit: true,
        }
    }
}
