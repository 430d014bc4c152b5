//! Session hub
//!
//! Entry point for transports: routes a connecting client to a relay task
//! for its session key and serves read-only history lookups.

use crate::config::RelayConfig;
use crate::ports::conversation_logger::{ConversationLogger, NoConversationLogger};
use crate::ports::generation_source::GenerationSource;
use crate::ports::outbound::OutboundChannel;
use crate::use_cases::relay::{RelaySummary, SessionRelay};
use crate::use_cases::transcript_store::{StoreError, TranscriptStore};
use relay_domain::{STOP_SENTINELS, SessionKey, Transcript};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::{AbortHandle, JoinHandle};
use tracing::{debug, info};

/// Errors raised when attaching to or talking with a session
#[derive(Error, Debug)]
pub enum RelayError {
    #[error("Session '{0}' already has a connected client")]
    SessionAttached(SessionKey),

    #[error("Session has ended")]
    SessionEnded,

    #[error("Relay task failed: {0}")]
    Join(String),
}

/// Owns the shared collaborators and one relay task per attached key.
///
/// A key has at most one attached client at a time, which keeps the
/// per-session ordering guarantees intact.
pub struct SessionHub {
    store: Arc<TranscriptStore>,
    source: Arc<dyn GenerationSource>,
    config: RelayConfig,
    conversation_logger: Arc<dyn ConversationLogger>,
    sessions: Mutex<HashMap<SessionKey, AbortHandle>>,
}

impl SessionHub {
    pub fn new(
        store: Arc<TranscriptStore>,
        source: Arc<dyn GenerationSource>,
        config: RelayConfig,
    ) -> Self {
        Self {
            store,
            source,
            config,
            conversation_logger: Arc::new(NoConversationLogger),
            sessions: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_conversation_logger(mut self, logger: Arc<dyn ConversationLogger>) -> Self {
        self.conversation_logger = logger;
        self
    }

    fn is_attached(&self, key: &SessionKey) -> bool {
        let mut sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
        sessions.retain(|_, task| !task.is_finished());
        sessions.contains_key(key)
    }

    /// Attach a client to the session `key`.
    ///
    /// Everything the relay emits goes to `outbound`; messages for the relay
    /// go through the returned [`RelayHandle`].
    pub async fn attach(
        &self,
        key: SessionKey,
        outbound: Arc<dyn OutboundChannel>,
    ) -> Result<RelayHandle, RelayError> {
        if self.is_attached(&key) {
            return Err(RelayError::SessionAttached(key));
        }

        let relay = SessionRelay::open(
            key.clone(),
            Arc::clone(&self.store),
            Arc::clone(&self.source),
            outbound,
            self.config.clone(),
        )
        .await
        .with_conversation_logger(Arc::clone(&self.conversation_logger));

        let mut sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
        // Another client may have attached while the transcript was loading.
        if sessions.get(&key).is_some_and(|task| !task.is_finished()) {
            return Err(RelayError::SessionAttached(key));
        }

        let (tx, rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(relay.run(rx));
        sessions.insert(key.clone(), task.abort_handle());
        info!(session = %key, "Client attached");

        Ok(RelayHandle {
            key,
            inbound: tx,
            task,
        })
    }

    /// Current transcript of `key`, for display.
    pub async fn history(&self, key: &SessionKey) -> Result<Transcript, StoreError> {
        self.store.read(key).await
    }

    /// Number of sessions with a live relay task.
    pub fn attached_count(&self) -> usize {
        let mut sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
        sessions.retain(|_, task| !task.is_finished());
        sessions.len()
    }
}

/// Client side of an attached session.
#[derive(Debug)]
pub struct RelayHandle {
    key: SessionKey,
    inbound: mpsc::UnboundedSender<String>,
    task: JoinHandle<RelaySummary>,
}

impl RelayHandle {
    pub fn key(&self) -> &SessionKey {
        &self.key
    }

    /// Deliver one raw inbound message, exactly as the client sent it.
    pub fn send(&self, text: impl Into<String>) -> Result<(), RelayError> {
        self.inbound
            .send(text.into())
            .map_err(|_| RelayError::SessionEnded)
    }

    /// Ask the relay to cancel the generation in flight, if any.
    pub fn stop(&self) -> Result<(), RelayError> {
        self.send(STOP_SENTINELS[0])
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Disconnect and wait for the relay to wind down.
    pub async fn close(self) -> Result<RelaySummary, RelayError> {
        let RelayHandle { key, inbound, task } = self;
        drop(inbound);
        let summary = task.await.map_err(|e| RelayError::Join(e.to_string()))?;
        debug!(session = %key, "Client detached");
        Ok(summary)
    }
}
