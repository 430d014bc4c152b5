//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! Every section is optional; missing fields fall back to their defaults.

mod backend;
mod logging;
mod relay;
mod repl;
mod storage;

pub use backend::{BackendKind, FileBackendConfig};
pub use logging::FileLoggingConfig;
pub use relay::FileRelayConfig;
pub use repl::FileReplConfig;
pub use storage::{FileStorageConfig, StorageKind};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration validation errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigValidationError {
    #[error("backend.url cannot be empty when backend.kind = \"http\"")]
    EmptyBackendUrl,

    #[error("relay.max_buffered_bytes cannot be 0")]
    ZeroBufferLimit,

    #[error("repl.user cannot be empty")]
    EmptySessionKey,
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Generation backend
    pub backend: FileBackendConfig,
    /// Transcript persistence
    pub storage: FileStorageConfig,
    /// Relay behavior
    pub relay: FileRelayConfig,
    /// Diagnostic and conversation logs
    pub logging: FileLoggingConfig,
    /// REPL settings
    pub repl: FileReplConfig,
}

impl FileConfig {
    /// Validate the configuration, returning every problem found.
    pub fn validate(&self) -> Vec<ConfigValidationError> {
        let mut issues = Vec::new();

        if self.backend.kind == BackendKind::Http && self.backend.url.trim().is_empty() {
            issues.push(ConfigValidationError::EmptyBackendUrl);
        }
        if self.relay.max_buffered_bytes == 0 {
            issues.push(ConfigValidationError::ZeroBufferLimit);
        }
        if self.repl.user.trim().is_empty() {
            issues.push(ConfigValidationError::EmptySessionKey);
        }

        issues
    }
}
