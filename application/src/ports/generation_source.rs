//! Generation source port
//!
//! Defines how the relay starts a streaming generation against a backend.

use async_trait::async_trait;
use futures::stream::BoxStream;
use relay_domain::{DecodeError, Transcript};
use thiserror::Error;

/// Errors that can occur while starting or consuming a generation
#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Backend returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Stream error: {0}")]
    StreamError(String),

    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("Other error: {0}")]
    Other(String),
}

/// Raw response body of a generation, delivered in arbitrary chunks.
///
/// Chunk boundaries carry no meaning; frames are recovered by
/// [`FrameDecoder`](relay_domain::FrameDecoder).
pub type ChunkStream = BoxStream<'static, Result<Vec<u8>, GenerationError>>;

/// A streaming text-generation backend
///
/// Implementations (adapters) live in the infrastructure layer.
#[async_trait]
pub trait GenerationSource: Send + Sync {
    /// Start a generation for the given conversation.
    ///
    /// Resolves once the backend accepted the request; the returned stream
    /// yields the response body until the backend closes it.
    async fn start(&self, transcript: &Transcript) -> Result<ChunkStream, GenerationError>;

    /// Short name used in logs.
    fn name(&self) -> &str {
        "generation"
    }
}
