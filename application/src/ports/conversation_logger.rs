//! Port for structured conversation logging.
//!
//! Defines the [`ConversationLogger`] trait for recording what happened in a
//! session (committed turns, cancelled and failed generations, storage
//! problems) to a structured log.
//!
//! This is separate from `tracing`-based operation logs: tracing handles
//! human-readable diagnostic messages, while this port captures the
//! conversation itself in a machine-readable format (JSONL).

use relay_domain::SessionKey;
use serde_json::Value;

/// Kinds of conversation events recorded by the relay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversationEventKind {
    UserTurn,
    AssistantTurn,
    GenerationCancelled,
    GenerationFailed,
    StorageWriteFailed,
}

impl ConversationEventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConversationEventKind::UserTurn => "user_turn",
            ConversationEventKind::AssistantTurn => "assistant_turn",
            ConversationEventKind::GenerationCancelled => "generation_cancelled",
            ConversationEventKind::GenerationFailed => "generation_failed",
            ConversationEventKind::StorageWriteFailed => "storage_write_failed",
        }
    }
}

/// A structured conversation event for logging.
pub struct ConversationEvent {
    pub kind: ConversationEventKind,
    /// Session the event belongs to.
    pub session: SessionKey,
    /// JSON payload with event-specific data.
    pub payload: Value,
}

impl ConversationEvent {
    pub fn new(kind: ConversationEventKind, session: &SessionKey, payload: Value) -> Self {
        Self {
            kind,
            session: session.clone(),
            payload,
        }
    }

    pub fn event_type(&self) -> &'static str {
        self.kind.as_str()
    }
}

/// Port for logging conversation events to a structured log.
///
/// `log` is synchronous and non-fallible; implementations swallow their own
/// write failures.
pub trait ConversationLogger: Send + Sync {
    fn log(&self, event: ConversationEvent);
}

/// No-op implementation for tests and when logging is disabled.
pub struct NoConversationLogger;

impl ConversationLogger for NoConversationLogger {
    fn log(&self, _event: ConversationEvent) {}
}
