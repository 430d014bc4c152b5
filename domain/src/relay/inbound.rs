//! Inbound client messages and the reserved sentinels of the relay protocol.

/// Inbound text values that request cancellation instead of being treated as
/// conversational content. Both spellings are in use by existing clients.
pub const STOP_SENTINELS: [&str; 2] = ["_STOP_", "__STOP__"];

/// Outbound marker telling the client that the current assistant turn has
/// ended, whether it completed, failed, or was cancelled.
pub const TURN_ENDED: &str = "\n";

/// Classification of one inbound client message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundMessage {
    /// A control sentinel asking to cancel the active generation.
    Stop,
    /// Freeform user content, already trimmed.
    Text(String),
    /// Nothing left after trimming.
    Empty,
}

impl InboundMessage {
    /// Trim and classify raw inbound text.
    pub fn parse(raw: &str) -> Self {
        let text = raw.trim();
        if text.is_empty() {
            InboundMessage::Empty
        } else if STOP_SENTINELS.contains(&text) {
            InboundMessage::Stop
        } else {
            InboundMessage::Text(text.to_string())
        }
    }

    pub fn is_stop(&self) -> bool {
        matches!(self, InboundMessage::Stop)
    }
}
