//! Process-local transcript storage, lost on exit.

use async_trait::async_trait;
use relay_application::ports::transcript_repository::{RepositoryError, TranscriptRepository};
use relay_domain::{SessionKey, Transcript};
use std::collections::HashMap;
use tokio::sync::RwLock;

#[derive(Default)]
pub struct InMemoryTranscriptRepository {
    transcripts: RwLock<HashMap<SessionKey, Transcript>>,
}

impl InMemoryTranscriptRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TranscriptRepository for InMemoryTranscriptRepository {
    async fn load(&self, key: &SessionKey) -> Result<Option<Transcript>, RepositoryError> {
        Ok(self.transcripts.read().await.get(key).cloned())
    }

    async fn save(&self, key: &SessionKey, transcript: &Transcript) -> Result<(), RepositoryError> {
        self.transcripts
            .write()
            .await
            .insert(key.clone(), transcript.clone());
        Ok(())
    }
}
