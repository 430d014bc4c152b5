//! Relay state machine types
//!
//! A session is either idle or driving exactly one generation. The active
//! generation owns everything that must go away together when it ends: its
//! cancellation token, the upstream connection, the decoder and the text
//! accumulated so far.

use super::cancellation::GenerationToken;
use crate::ports::generation_source::{ChunkStream, GenerationError};
use futures::future::{self, BoxFuture};
use futures::{FutureExt, StreamExt};
use relay_domain::{DecodedEvent, FrameDecoder};
use std::collections::VecDeque;
use std::task::Poll;
use tracing::trace;

pub(crate) type Connecting = BoxFuture<'static, Result<ChunkStream, GenerationError>>;

pub(crate) enum SessionState {
    Idle,
    Generating(ActiveGeneration),
}

/// What the upstream side of a generation produced next.
pub(crate) enum PumpEvent {
    Decoded(DecodedEvent),
    /// The source closed its stream without a `[DONE]` frame.
    Exhausted,
    Failed(GenerationError),
}

enum Upstream {
    Connecting(Connecting),
    Streaming(ChunkStream),
    Drained,
}

enum Step {
    Connected(Result<ChunkStream, GenerationError>),
    Chunk(Option<Result<Vec<u8>, GenerationError>>),
}

pub(crate) struct ActiveGeneration {
    pub(crate) token: GenerationToken,
    pub(crate) accumulated: String,
    upstream: Upstream,
    decoder: FrameDecoder,
    ready: VecDeque<DecodedEvent>,
}

impl ActiveGeneration {
    pub(crate) fn new(token: GenerationToken, connecting: Connecting, decoder: FrameDecoder) -> Self {
        Self {
            token,
            accumulated: String::new(),
            upstream: Upstream::Connecting(connecting),
            decoder,
            ready: VecDeque::new(),
        }
    }

    /// Poll the connection once so the source has been called before any
    /// inbound message is looked at. A result that is already available is
    /// kept for [`next_event`](Self::next_event).
    pub(crate) async fn connect(&mut self) {
        if let Upstream::Connecting(connecting) = &mut self.upstream
            && let Poll::Ready(result) = futures::poll!(connecting.as_mut())
        {
            self.upstream = match result {
                Ok(stream) => Upstream::Streaming(stream),
                Err(e) => Upstream::Connecting(future::ready(Err(e)).boxed()),
            };
        }
    }

    pub(crate) fn dropped_fragments(&self) -> usize {
        self.decoder.dropped_fragments()
    }

    /// Wait for the next event from upstream.
    ///
    /// Cancel-safe: dropping the returned future loses no data, so it can
    /// race against inbound messages in `select!`.
    pub(crate) async fn next_event(&mut self) -> PumpEvent {
        loop {
            if let Some(event) = self.ready.pop_front() {
                return PumpEvent::Decoded(event);
            }

            let step = match &mut self.upstream {
                Upstream::Connecting(connecting) => Step::Connected(connecting.await),
                Upstream::Streaming(stream) => Step::Chunk(stream.next().await),
                Upstream::Drained => return PumpEvent::Exhausted,
            };

            match step {
                Step::Connected(Ok(stream)) => self.upstream = Upstream::Streaming(stream),
                Step::Connected(Err(e)) | Step::Chunk(Some(Err(e))) => {
                    self.upstream = Upstream::Drained;
                    return PumpEvent::Failed(e);
                }
                Step::Chunk(Some(Ok(bytes))) => match self.decoder.push(&bytes) {
                    Ok(events) => {
                        trace!(
                            generation = self.token.id(),
                            bytes = bytes.len(),
                            events = events.len(),
                            "Decoded chunk"
                        );
                        self.ready.extend(events);
                        if self.decoder.is_finished() {
                            self.upstream = Upstream::Drained;
                        }
                    }
                    Err(e) => {
                        self.upstream = Upstream::Drained;
                        return PumpEvent::Failed(e.into());
                    }
                },
                Step::Chunk(None) => {
                    self.ready.extend(self.decoder.finish());
                    self.upstream = Upstream::Drained;
                }
            }
        }
    }
}
