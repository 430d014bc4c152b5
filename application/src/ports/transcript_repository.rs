//! Transcript repository port
//!
//! Durable keyed storage for transcripts, provided by the host.

use async_trait::async_trait;
use relay_domain::{SessionKey, Transcript};
use thiserror::Error;

/// Errors raised by a transcript repository
#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("Storage unreachable: {0}")]
    Unreachable(String),

    #[error("Stored transcript for '{key}' is unreadable: {message}")]
    Corrupt { key: SessionKey, message: String },
}

/// Durable storage of one transcript per session key.
///
/// Only the latest write per key needs to survive; every save replaces the
/// whole transcript.
#[async_trait]
pub trait TranscriptRepository: Send + Sync {
    /// Load the persisted transcript, or `None` if nothing was stored yet.
    async fn load(&self, key: &SessionKey) -> Result<Option<Transcript>, RepositoryError>;

    /// Persist the full transcript for `key`.
    async fn save(&self, key: &SessionKey, transcript: &Transcript) -> Result<(), RepositoryError>;
}
