//! Events produced by the frame decoder.

/// An event decoded from a generation stream.
///
/// Pipeline-internal: events are forwarded or accumulated by the relay but
/// never persisted as such.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodedEvent {
    /// A text fragment of the generated response.
    Token(String),
    /// The `[DONE]` sentinel: the backend finished generating.
    Done,
}

impl DecodedEvent {
    /// Returns the text if this is a `Token` event.
    pub fn text(&self) -> Option<&str> {
        match self {
            DecodedEvent::Token(s) => Some(s),
            DecodedEvent::Done => None,
        }
    }

    /// Returns true if this event ends the stream.
    pub fn is_terminal(&self) -> bool {
        matches!(self, DecodedEvent::Done)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_carries_text() {
        let event = DecodedEvent::Token("hi".to_string());
        assert_eq!(event.text(), Some("hi"));
        assert!(!event.is_terminal());
    }

    #[test]
    fn done_is_terminal() {
        assert_eq!(DecodedEvent::Done.text(), None);
        assert!(DecodedEvent::Done.is_terminal());
    }
}
