//! Relay behavior configuration from TOML (`[relay]` section)

use relay_application::RelayConfig;
use relay_application::config::relay_config::DEFAULT_FAILURE_NOTICE;
use relay_domain::DEFAULT_MAX_BUFFERED_BYTES;
use serde::{Deserialize, Serialize};

/// Raw relay configuration from TOML
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileRelayConfig {
    /// Upper bound on unresolved frame data per generation
    pub max_buffered_bytes: usize,
    /// Text sent to the client when a generation fails
    pub failure_notice: String,
}

impl Default for FileRelayConfig {
    fn default() -> Self {
        Self {
            max_buffered_bytes: DEFAULT_MAX_BUFFERED_BYTES,
            failure_notice: DEFAULT_FAILURE_NOTICE.to_string(),
        }
    }
}

impl FileRelayConfig {
    pub fn to_relay_config(&self) -> RelayConfig {
        RelayConfig::default()
            .with_max_buffered_bytes(self.max_buffered_bytes)
            .with_failure_notice(self.failure_notice.clone())
    }
}
