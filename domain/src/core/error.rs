//! Domain error types

use thiserror::Error;

/// Errors raised by the [`FrameDecoder`](crate::stream::decoder::FrameDecoder).
///
/// An unparseable payload is not an error: it is re-buffered until more
/// data arrives. Only the bound on re-buffered text can fail a stream.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("Unresolved frame data exceeded {limit} bytes ({buffered} bytes buffered)")]
    BufferLimitExceeded { limit: usize, buffered: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_limit_display() {
        let error = DecodeError::BufferLimitExceeded {
            limit: 16,
            buffered: 20,
        };
        assert_eq!(
            error.to_string(),
            "Unresolved frame data exceeded 16 bytes (20 bytes buffered)"
        );
    }
}
