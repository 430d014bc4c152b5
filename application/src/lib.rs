//! Application layer for chat-relay
//!
//! This crate contains the session relay, the transcript store, and the port
//! definitions that infrastructure adapters implement.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::RelayConfig;
pub use ports::{
    conversation_logger::{
        ConversationEvent, ConversationEventKind, ConversationLogger, NoConversationLogger,
    },
    generation_source::{ChunkStream, GenerationError, GenerationSource},
    outbound::{ChannelOutbound, DeliveryError, OutboundChannel},
    transcript_repository::{RepositoryError, TranscriptRepository},
};
pub use use_cases::relay::{
    RelaySummary, SessionRelay,
    cancellation::{CancellationCoordinator, GenerationToken},
};
pub use use_cases::session_hub::{RelayError, RelayHandle, SessionHub};
pub use use_cases::transcript_store::{StoreError, TranscriptStore};
