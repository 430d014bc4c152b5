//! Streaming frame decoding.
//!
//! - [`event::DecodedEvent`]: one decoded token or the end-of-stream marker
//! - [`decoder::FrameDecoder`]: incremental decoder for `data:` framed streams

pub mod decoder;
pub mod event;
