//! Transcript store
//!
//! Keeps the per-session transcript in memory and writes it through to the
//! [`TranscriptRepository`] after every append.

use crate::ports::transcript_repository::{RepositoryError, TranscriptRepository};
use relay_domain::{SessionKey, Transcript, Turn};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;
use tracing::{debug, warn};

/// Errors surfaced by the store
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Transcript storage unavailable: {0}")]
    StorageUnavailable(#[from] RepositoryError),
}

/// Write-through cache in front of a [`TranscriptRepository`].
///
/// After a successful [`append`](Self::append) the persisted transcript
/// equals the cached one. A failed write leaves the turn in the cache, so the
/// next successful save catches storage up.
pub struct TranscriptStore {
    repository: Arc<dyn TranscriptRepository>,
    cache: Mutex<HashMap<SessionKey, Transcript>>,
}

impl TranscriptStore {
    pub fn new(repository: Arc<dyn TranscriptRepository>) -> Self {
        Self {
            repository,
            cache: Mutex::new(HashMap::new()),
        }
    }

    fn cached(&self, key: &SessionKey) -> Option<Transcript> {
        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn remember(&self, key: &SessionKey, transcript: Transcript) {
        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.clone(), transcript);
    }

    /// Return the transcript for `key`, reading storage on first access.
    ///
    /// A key with nothing stored yields an empty transcript.
    pub async fn load(&self, key: &SessionKey) -> Result<Transcript, StoreError> {
        if let Some(transcript) = self.cached(key) {
            return Ok(transcript);
        }

        let transcript = self.repository.load(key).await?.unwrap_or_default();
        debug!(session = %key, turns = transcript.len(), "Loaded transcript");
        self.remember(key, transcript.clone());
        Ok(transcript)
    }

    /// Like [`load`](Self::load), but degrades to an empty transcript when
    /// storage cannot be read.
    ///
    /// The empty transcript is cached, so later appends for this key start
    /// from it and the next save replaces whatever storage held.
    pub async fn load_or_empty(&self, key: &SessionKey) -> Transcript {
        match self.load(key).await {
            Ok(transcript) => transcript,
            Err(e) => {
                warn!(session = %key, "Starting with empty history: {}", e);
                let empty = Transcript::new();
                self.remember(key, empty.clone());
                empty
            }
        }
    }

    /// Append `turn` to the session and persist the whole transcript.
    ///
    /// The cached transcript keeps the turn even when the write fails.
    pub async fn append(&self, key: &SessionKey, turn: Turn) -> Result<(), StoreError> {
        if self.cached(key).is_none() {
            self.load_or_empty(key).await;
        }

        let snapshot = {
            let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
            let transcript = cache.entry(key.clone()).or_default();
            transcript.push(turn);
            transcript.clone()
        };

        self.repository.save(key, &snapshot).await?;
        debug!(session = %key, turns = snapshot.len(), "Saved transcript");
        Ok(())
    }

    /// Read the transcript for display without touching the cache.
    pub async fn read(&self, key: &SessionKey) -> Result<Transcript, StoreError> {
        if let Some(transcript) = self.cached(key) {
            return Ok(transcript);
        }
        Ok(self.repository.load(key).await?.unwrap_or_default())
    }
}
