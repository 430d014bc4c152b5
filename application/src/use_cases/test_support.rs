//! Hand-written mocks shared by the use case tests.

use crate::ports::conversation_logger::{ConversationEvent, ConversationLogger};
use crate::ports::generation_source::{ChunkStream, GenerationError, GenerationSource};
use crate::ports::transcript_repository::{RepositoryError, TranscriptRepository};
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use relay_domain::{SessionKey, Transcript};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::mpsc;

// ==================== Repository ====================

pub struct MockRepository {
    data: Mutex<HashMap<SessionKey, Transcript>>,
    fail_loads: AtomicBool,
    fail_saves: AtomicBool,
    saves: Mutex<usize>,
}

impl MockRepository {
    pub fn new() -> Self {
        Self {
            data: Mutex::new(HashMap::new()),
            fail_loads: AtomicBool::new(false),
            fail_saves: AtomicBool::new(false),
            saves: Mutex::new(0),
        }
    }

    pub fn seed(&self, key: &SessionKey, transcript: Transcript) {
        self.data.lock().unwrap().insert(key.clone(), transcript);
    }

    pub fn stored(&self, key: &SessionKey) -> Option<Transcript> {
        self.data.lock().unwrap().get(key).cloned()
    }

    pub fn save_count(&self) -> usize {
        *self.saves.lock().unwrap()
    }

    pub fn fail_loads(&self, fail: bool) {
        self.fail_loads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl TranscriptRepository for MockRepository {
    async fn load(&self, key: &SessionKey) -> Result<Option<Transcript>, RepositoryError> {
        if self.fail_loads.load(Ordering::SeqCst) {
            return Err(RepositoryError::Unreachable("mock load failure".into()));
        }
        Ok(self.data.lock().unwrap().get(key).cloned())
    }

    async fn save(&self, key: &SessionKey, transcript: &Transcript) -> Result<(), RepositoryError> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(RepositoryError::Unreachable("mock save failure".into()));
        }
        *self.saves.lock().unwrap() += 1;
        self.data
            .lock()
            .unwrap()
            .insert(key.clone(), transcript.clone());
        Ok(())
    }
}

// ==================== Generation Source ====================

pub type ChunkSender = mpsc::UnboundedSender<Result<Vec<u8>, GenerationError>>;

/// One scripted answer of [`MockSource`].
pub enum Scripted {
    /// The whole body, delivered chunk by chunk.
    Chunks(Vec<Result<Vec<u8>, GenerationError>>),
    /// Body driven by the test through a [`ChunkSender`].
    Live(mpsc::UnboundedReceiver<Result<Vec<u8>, GenerationError>>),
    /// The backend refuses the request.
    Refuse(GenerationError),
}

impl Scripted {
    /// Frames for the given tokens followed by `[DONE]`.
    pub fn tokens(tokens: &[&str]) -> Self {
        let mut chunks: Vec<Result<Vec<u8>, GenerationError>> = tokens
            .iter()
            .map(|t| Ok(frame(t).into_bytes()))
            .collect();
        chunks.push(Ok(b"data: [DONE]\n".to_vec()));
        Scripted::Chunks(chunks)
    }

    pub fn live() -> (Self, ChunkSender) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Scripted::Live(rx), tx)
    }
}

pub fn frame(token: &str) -> String {
    format!("data: {}\n", serde_json::json!({ "response": token }))
}

pub struct MockSource {
    script: Mutex<VecDeque<Scripted>>,
    requests: Mutex<Vec<Transcript>>,
}

impl MockSource {
    pub fn new(script: Vec<Scripted>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<Transcript> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl GenerationSource for MockSource {
    async fn start(&self, transcript: &Transcript) -> Result<ChunkStream, GenerationError> {
        self.requests.lock().unwrap().push(transcript.clone());
        let next = self.script.lock().unwrap().pop_front();
        match next {
            Some(Scripted::Chunks(chunks)) => Ok(stream::iter(chunks).boxed()),
            Some(Scripted::Live(rx)) => Ok(stream::unfold(rx, |mut rx| async move {
                rx.recv().await.map(|item| (item, rx))
            })
            .boxed()),
            Some(Scripted::Refuse(e)) => Err(e),
            None => Err(GenerationError::Other("no scripted response".into())),
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}

// ==================== Conversation Logger ====================

#[derive(Default)]
pub struct RecordingLogger {
    events: Mutex<Vec<&'static str>>,
}

impl RecordingLogger {
    pub fn events(&self) -> Vec<&'static str> {
        self.events.lock().unwrap().clone()
    }
}

impl ConversationLogger for RecordingLogger {
    fn log(&self, event: ConversationEvent) {
        self.events.lock().unwrap().push(event.event_type());
    }
}
