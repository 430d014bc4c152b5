//! Session relay
//!
//! One [`SessionRelay`] serves one client connection for one session key. It
//! reads inbound messages, runs at most one generation at a time, forwards
//! decoded tokens to the client as they arrive, and commits finished
//! assistant turns to the [`TranscriptStore`].
//!
//! The relay is a single task owning all of its state. Inbound messages and
//! upstream events are raced with `select!`, inbound first, so a stop request
//! or a departed client is handled even while the backend is silent.
//!
//! | Outcome   | Sent to client              | Committed turn |
//! |-----------|-----------------------------|----------------|
//! | completed | tokens, `"\n"`              | assistant text (if not blank) |
//! | cancelled | tokens so far, `"\n"`       | none           |
//! | failed    | tokens so far, notice, `"\n"` | none         |
//! | abandoned | nothing further             | none           |

pub mod cancellation;
pub(crate) mod state;

use crate::config::RelayConfig;
use crate::ports::conversation_logger::{
    ConversationEvent, ConversationEventKind, ConversationLogger, NoConversationLogger,
};
use crate::ports::generation_source::{GenerationError, GenerationSource};
use crate::ports::outbound::OutboundChannel;
use crate::use_cases::transcript_store::TranscriptStore;
use cancellation::CancellationCoordinator;
use futures::FutureExt;
use relay_domain::util::preview;
use relay_domain::{
    DecodedEvent, FrameDecoder, InboundMessage, SessionKey, TURN_ENDED, Transcript, Turn,
};
use serde_json::json;
use state::{ActiveGeneration, PumpEvent, SessionState};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// Counters describing what happened during one relay's lifetime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RelaySummary {
    pub started: usize,
    pub completed: usize,
    pub cancelled: usize,
    pub failed: usize,
}

enum RelayEvent {
    Inbound(InboundMessage),
    Pump(PumpEvent),
    CancelObserved,
    Disconnected,
}

pub struct SessionRelay {
    key: SessionKey,
    transcript: Transcript,
    store: Arc<TranscriptStore>,
    source: Arc<dyn GenerationSource>,
    outbound: Arc<dyn OutboundChannel>,
    conversation_logger: Arc<dyn ConversationLogger>,
    config: RelayConfig,
    coordinator: CancellationCoordinator,
    summary: RelaySummary,
}

impl SessionRelay {
    /// Prepare a relay for `key`, loading its transcript.
    ///
    /// Unreadable storage is not fatal: the session starts empty.
    pub async fn open(
        key: SessionKey,
        store: Arc<TranscriptStore>,
        source: Arc<dyn GenerationSource>,
        outbound: Arc<dyn OutboundChannel>,
        config: RelayConfig,
    ) -> Self {
        let transcript = store.load_or_empty(&key).await;
        debug!(session = %key, turns = transcript.len(), "Session opened");
        Self {
            key,
            transcript,
            store,
            source,
            outbound,
            conversation_logger: Arc::new(NoConversationLogger),
            config,
            coordinator: CancellationCoordinator::new(),
            summary: RelaySummary::default(),
        }
    }

    pub fn with_conversation_logger(mut self, logger: Arc<dyn ConversationLogger>) -> Self {
        self.conversation_logger = logger;
        self
    }

    pub fn key(&self) -> &SessionKey {
        &self.key
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Serve the session until the client goes away.
    ///
    /// Ends when `inbound` closes or the outbound channel stops accepting
    /// messages. A generation still running at that point is abandoned.
    pub async fn run(mut self, mut inbound: mpsc::UnboundedReceiver<String>) -> RelaySummary {
        let mut state = SessionState::Idle;

        loop {
            let event = match &mut state {
                SessionState::Idle => match inbound.recv().await {
                    Some(raw) => RelayEvent::Inbound(InboundMessage::parse(&raw)),
                    None => RelayEvent::Disconnected,
                },
                SessionState::Generating(active) => {
                    if active.token.is_signaled() {
                        RelayEvent::CancelObserved
                    } else if self.outbound.is_closed() {
                        RelayEvent::Disconnected
                    } else {
                        let token = active.token.clone();
                        tokio::select! {
                            biased;
                            message = inbound.recv() => match message {
                                Some(raw) => RelayEvent::Inbound(InboundMessage::parse(&raw)),
                                None => RelayEvent::Disconnected,
                            },
                            _ = token.signaled() => RelayEvent::CancelObserved,
                            _ = self.outbound.closed() => RelayEvent::Disconnected,
                            event = active.next_event() => RelayEvent::Pump(event),
                        }
                    }
                }
            };

            match self.transition(state, event).await {
                Some(next) => state = next,
                None => break,
            }
        }

        info!(
            session = %self.key,
            started = self.summary.started,
            completed = self.summary.completed,
            cancelled = self.summary.cancelled,
            failed = self.summary.failed,
            "Session closed"
        );
        self.summary
    }

    /// Apply one event. `None` ends the session.
    async fn transition(&mut self, state: SessionState, event: RelayEvent) -> Option<SessionState> {
        match (state, event) {
            (state, RelayEvent::Inbound(InboundMessage::Empty)) => Some(state),

            (SessionState::Idle, RelayEvent::Inbound(InboundMessage::Stop)) => {
                debug!(session = %self.key, "Stop with no generation in flight");
                Some(SessionState::Idle)
            }
            (SessionState::Idle, RelayEvent::Inbound(InboundMessage::Text(text))) => {
                Some(self.begin_generation(text).await)
            }
            (SessionState::Idle, RelayEvent::Disconnected) => None,
            (SessionState::Idle, RelayEvent::Pump(_) | RelayEvent::CancelObserved) => {
                Some(SessionState::Idle)
            }

            (SessionState::Generating(active), RelayEvent::Inbound(InboundMessage::Stop)) => {
                if self.coordinator.signal_current() {
                    debug!(session = %self.key, generation = active.token.id(), "Stop requested");
                }
                Some(SessionState::Generating(active))
            }
            (SessionState::Generating(active), RelayEvent::Inbound(InboundMessage::Text(text))) => {
                warn!(
                    session = %self.key,
                    "Ignoring message while a response is streaming: {}",
                    preview(&text, 60)
                );
                Some(SessionState::Generating(active))
            }
            (
                SessionState::Generating(active),
                RelayEvent::Pump(PumpEvent::Decoded(DecodedEvent::Token(text))),
            ) => self.deliver_token(active, text),
            (
                SessionState::Generating(active),
                RelayEvent::Pump(PumpEvent::Decoded(DecodedEvent::Done) | PumpEvent::Exhausted),
            ) => self.complete_generation(active).await,
            (SessionState::Generating(active), RelayEvent::Pump(PumpEvent::Failed(e))) => {
                self.fail_generation(active, e)
            }
            (SessionState::Generating(active), RelayEvent::CancelObserved) => {
                self.cancel_generation(active)
            }
            (SessionState::Generating(active), RelayEvent::Disconnected) => {
                self.abandon_generation(active);
                None
            }
        }
    }

    async fn begin_generation(&mut self, text: String) -> SessionState {
        let turn = Turn::user(text);
        self.transcript.push(turn.clone());
        self.log(
            ConversationEventKind::UserTurn,
            json!({ "content": turn.content.as_str() }),
        );
        self.persist(turn).await;

        let token = self.coordinator.begin();
        self.summary.started += 1;
        info!(
            session = %self.key,
            generation = token.id(),
            source = self.source.name(),
            turns = self.transcript.len(),
            "Generation started"
        );

        let source = Arc::clone(&self.source);
        let transcript = self.transcript.clone();
        let connecting = async move { source.start(&transcript).await }.boxed();

        let mut active = ActiveGeneration::new(
            token,
            connecting,
            FrameDecoder::new(self.config.max_buffered_bytes),
        );
        active.connect().await;
        SessionState::Generating(active)
    }

    fn deliver_token(&mut self, mut active: ActiveGeneration, text: String) -> Option<SessionState> {
        if active.token.is_signaled() {
            return self.cancel_generation(active);
        }
        if self.outbound.send(&text).is_err() {
            self.abandon_generation(active);
            return None;
        }
        active.accumulated.push_str(&text);
        Some(SessionState::Generating(active))
    }

    async fn complete_generation(&mut self, active: ActiveGeneration) -> Option<SessionState> {
        if active.token.is_signaled() {
            return self.cancel_generation(active);
        }
        self.retire(&active);

        if self.outbound.send(TURN_ENDED).is_err() {
            self.summary.cancelled += 1;
            debug!(session = %self.key, "Client left before the turn ended");
            return None;
        }

        self.summary.completed += 1;
        if active.accumulated.trim().is_empty() {
            debug!(session = %self.key, generation = active.token.id(), "Empty response, nothing to commit");
            return Some(SessionState::Idle);
        }

        let turn = Turn::assistant(active.accumulated);
        info!(
            session = %self.key,
            bytes = turn.content.len(),
            "Generation completed: {}",
            preview(&turn.content, 60)
        );
        self.transcript.push(turn.clone());
        self.log(
            ConversationEventKind::AssistantTurn,
            json!({ "content": turn.content.as_str() }),
        );
        self.persist(turn).await;
        Some(SessionState::Idle)
    }

    fn fail_generation(&mut self, active: ActiveGeneration, e: GenerationError) -> Option<SessionState> {
        if active.token.is_signaled() {
            return self.cancel_generation(active);
        }
        self.retire(&active);
        self.summary.failed += 1;

        warn!(session = %self.key, generation = active.token.id(), "Generation failed: {}", e);
        self.log(
            ConversationEventKind::GenerationFailed,
            json!({
                "error": e.to_string(),
                "partial_bytes": active.accumulated.len(),
            }),
        );

        let delivered = self.outbound.send(&self.config.failure_notice).is_ok()
            && self.outbound.send(TURN_ENDED).is_ok();
        delivered.then_some(SessionState::Idle)
    }

    fn cancel_generation(&mut self, active: ActiveGeneration) -> Option<SessionState> {
        self.retire(&active);
        self.summary.cancelled += 1;

        info!(
            session = %self.key,
            generation = active.token.id(),
            partial_bytes = active.accumulated.len(),
            "Generation cancelled"
        );
        self.log(
            ConversationEventKind::GenerationCancelled,
            json!({
                "reason": "stop",
                "partial_bytes": active.accumulated.len(),
            }),
        );

        self.outbound.send(TURN_ENDED).ok().map(|_| SessionState::Idle)
    }

    /// The client is gone: stop the generation without telling anyone.
    fn abandon_generation(&mut self, active: ActiveGeneration) {
        active.token.signal();
        self.retire(&active);
        self.summary.cancelled += 1;

        debug!(session = %self.key, generation = active.token.id(), "Generation abandoned");
        self.log(
            ConversationEventKind::GenerationCancelled,
            json!({
                "reason": "disconnected",
                "partial_bytes": active.accumulated.len(),
            }),
        );
    }

    fn retire(&mut self, active: &ActiveGeneration) {
        self.coordinator.complete(&active.token);
        let dropped = active.dropped_fragments();
        if dropped > 0 {
            warn!(
                session = %self.key,
                generation = active.token.id(),
                dropped,
                "Discarded unparsable frame data"
            );
        }
    }

    async fn persist(&self, turn: Turn) {
        let role = turn.role;
        if let Err(e) = self.store.append(&self.key, turn).await {
            error!(session = %self.key, %role, "Failed to persist turn: {}", e);
            self.log(
                ConversationEventKind::StorageWriteFailed,
                json!({ "role": role.as_str(), "error": e.to_string() }),
            );
        }
    }

    fn log(&self, kind: ConversationEventKind, payload: serde_json::Value) {
        self.conversation_logger
            .log(ConversationEvent::new(kind, &self.key, payload));
    }
}
