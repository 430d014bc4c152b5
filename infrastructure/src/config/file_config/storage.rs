//! Transcript storage configuration from TOML (`[storage]` section)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    /// One JSON file per session key
    #[default]
    File,
    /// Process memory only
    Memory,
}

/// Raw storage configuration from TOML
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileStorageConfig {
    pub kind: StorageKind,
    /// Directory for transcript files (defaults to the platform data dir)
    pub dir: Option<PathBuf>,
}

impl FileStorageConfig {
    /// Directory transcripts are written to.
    pub fn resolved_dir(&self) -> PathBuf {
        self.dir.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .map(|d| d.join("chat-relay"))
                .unwrap_or_else(|| PathBuf::from(".chat-relay"))
                .join("transcripts")
        })
    }
}
