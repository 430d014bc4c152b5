//! Domain layer for chat-relay
//!
//! This crate contains the conversation model and the streaming frame decoder.
//! It has no dependencies on runtime, storage, or transport concerns.
//!
//! # Core Concepts
//!
//! ## Transcript
//!
//! A [`Transcript`] is the ordered list of [`Turn`]s exchanged within one
//! session. It is the only piece of durable state in the system.
//!
//! ## Frames
//!
//! Generation backends answer with a newline-delimited event stream where
//! every meaningful line starts with `data:`. [`FrameDecoder`] turns raw,
//! arbitrarily chunked bytes into [`DecodedEvent`]s.

pub mod core;
pub mod relay;
pub mod stream;
pub mod transcript;
pub mod util;

// Re-export commonly used types
pub use core::{error::DecodeError, session_key::SessionKey};
pub use relay::inbound::{InboundMessage, STOP_SENTINELS, TURN_ENDED};
pub use stream::{
    decoder::{DEFAULT_MAX_BUFFERED_BYTES, FrameDecoder},
    event::DecodedEvent,
};
pub use transcript::entities::{Role, Transcript, Turn};
