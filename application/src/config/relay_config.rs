//! Relay parameters: limits and user-visible texts used by the session relay.

use relay_domain::DEFAULT_MAX_BUFFERED_BYTES;
use serde::{Deserialize, Serialize};

/// Notice sent to the client when a generation fails.
pub const DEFAULT_FAILURE_NOTICE: &str = "AI request failed";

/// Parameters controlling a [`SessionRelay`](crate::use_cases::relay::SessionRelay).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayConfig {
    /// Upper bound on unresolved frame text held by the decoder.
    pub max_buffered_bytes: usize,
    /// Plain-text notice forwarded when the generation source fails.
    pub failure_notice: String,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            max_buffered_bytes: DEFAULT_MAX_BUFFERED_BYTES,
            failure_notice: DEFAULT_FAILURE_NOTICE.to_string(),
        }
    }
}

impl RelayConfig {
    pub fn with_max_buffered_bytes(mut self, max: usize) -> Self {
        self.max_buffered_bytes = max;
        self
    }

    pub fn with_failure_notice(mut self, notice: impl Into<String>) -> Self {
        self.failure_notice = notice.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default() {
        let config = RelayConfig::default();
        assert_eq!(config.max_buffered_bytes, 1024 * 1024);
        assert_eq!(config.failure_notice, "AI request failed");
    }

    #[test]
    fn test_builder() {
        let config = RelayConfig::default()
            .with_max_buffered_bytes(64)
            .with_failure_notice("backend unavailable");
        assert_eq!(config.max_buffered_bytes, 64);
        assert_eq!(config.failure_notice, "backend unavailable");
    }
}
