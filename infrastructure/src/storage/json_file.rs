//! One JSON file per session key.
//!
//! Files live in a single directory and are named after the key, with every
//! byte outside `[A-Za-z0-9_-]` percent-encoded so that no key can escape
//! the directory. Writes go to a temporary file first and are renamed into
//! place, so a crash never leaves a half-written transcript behind.

use async_trait::async_trait;
use relay_application::ports::transcript_repository::{RepositoryError, TranscriptRepository};
use relay_domain::{SessionKey, Transcript};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::trace;

pub struct JsonFileTranscriptRepository {
    dir: PathBuf,
}

impl JsonFileTranscriptRepository {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &SessionKey) -> PathBuf {
        self.dir.join(format!("{}.json", file_stem(key)))
    }
}

fn file_stem(key: &SessionKey) -> String {
    let mut stem = String::with_capacity(key.as_str().len());
    for byte in key.as_str().bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'_' {
            stem.push(byte as char);
        } else {
            stem.push_str(&format!("%{:02X}", byte));
        }
    }
    stem
}

#[async_trait]
impl TranscriptRepository for JsonFileTranscriptRepository {
    async fn load(&self, key: &SessionKey) -> Result<Option<Transcript>, RepositoryError> {
        let path = self.path_for(key);
        let raw = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(RepositoryError::Unreachable(format!(
                    "{}: {}",
                    path.display(),
                    e
                )));
            }
        };

        trace!(path = %path.display(), bytes = raw.len(), "Read transcript file");
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| RepositoryError::Corrupt {
                key: key.clone(),
                message: e.to_string(),
            })
    }

    async fn save(&self, key: &SessionKey, transcript: &Transcript) -> Result<(), RepositoryError> {
        let unreachable = |e: std::io::Error| RepositoryError::Unreachable(e.to_string());

        let body = serde_json::to_vec_pretty(transcript)
            .map_err(|e| RepositoryError::Unreachable(e.to_string()))?;

        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(unreachable)?;

        let path = self.path_for(key);
        let tmp = self.dir.join(format!(".{}.json.tmp", file_stem(key)));
        tokio::fs::write(&tmp, &body).await.map_err(unreachable)?;
        tokio::fs::rename(&tmp, &path).await.map_err(unreachable)?;

        trace!(path = %path.display(), turns = transcript.len(), "Wrote transcript file");
        Ok(())
    }
}
