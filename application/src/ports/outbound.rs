//! Outbound channel port
//!
//! The relay's only way to reach the client: decoded tokens, turn-ended
//! sentinels, and failure notices all go through [`OutboundChannel::send`].

use futures::FutureExt;
use futures::future::BoxFuture;
use thiserror::Error;
use tokio::sync::mpsc;

/// Delivery failure on the outbound channel
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeliveryError {
    #[error("Outbound channel closed")]
    Closed,
}

/// Non-blocking, ordered delivery of text to one client.
///
/// A closed channel means the client is gone; the relay treats it as an
/// implicit cancellation.
pub trait OutboundChannel: Send + Sync {
    fn send(&self, text: &str) -> Result<(), DeliveryError>;

    fn is_closed(&self) -> bool;

    /// Resolves once the client stops receiving.
    fn closed(&self) -> BoxFuture<'_, ()>;
}

/// [`OutboundChannel`] backed by an unbounded tokio channel.
///
/// The transport owns the receiving half and writes each message to its
/// socket (or terminal) in order.
#[derive(Debug, Clone)]
pub struct ChannelOutbound {
    tx: mpsc::UnboundedSender<String>,
}

impl ChannelOutbound {
    pub fn new(tx: mpsc::UnboundedSender<String>) -> Self {
        Self { tx }
    }

    /// Create a channel and return the sending side with its receiver.
    pub fn pair() -> (Self, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }
}

impl OutboundChannel for ChannelOutbound {
    fn send(&self, text: &str) -> Result<(), DeliveryError> {
        self.tx
            .send(text.to_string())
            .map_err(|_| DeliveryError::Closed)
    }

    fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    fn closed(&self) -> BoxFuture<'_, ()> {
        self.tx.closed().boxed()
    }
}
