//! Infrastructure layer for chat-relay
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, including configuration file loading.

pub mod backend;
pub mod config;
pub mod logging;
pub mod storage;

// Re-export commonly used types
pub use backend::{EchoSource, HttpStreamSource};
pub use config::{
    BackendKind, ConfigLoader, ConfigValidationError, FileBackendConfig, FileConfig,
    FileLoggingConfig, FileRelayConfig, FileReplConfig, FileStorageConfig, StorageKind,
};
pub use logging::JsonlConversationLogger;
pub use storage::{InMemoryTranscriptRepository, JsonFileTranscriptRepository};
