//! Logging configuration from TOML (`[logging]` section)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw logging configuration from TOML
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLoggingConfig {
    /// Directory for daily-rolling diagnostic logs; stderr when unset
    pub dir: Option<PathBuf>,
    /// Path of the JSONL conversation log; disabled when unset
    pub conversation_log: Option<PathBuf>,
}
