//! Generation backend configuration from TOML (`[backend]` section)

use serde::{Deserialize, Serialize};

/// Which generation backend to talk to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Remote model answering with a `data:` event stream
    Http,
    /// Offline echo of the last user message
    #[default]
    Echo,
}

/// Raw backend configuration from TOML
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileBackendConfig {
    pub kind: BackendKind,
    /// Endpoint accepting `{"messages": [...], "stream": true}`
    pub url: String,
    /// Name of the environment variable holding the bearer token
    pub api_token_env: Option<String>,
    /// Timeout for establishing the connection (the stream itself is unbounded)
    pub connect_timeout_seconds: u64,
    /// Pause between echoed words
    pub echo_delay_ms: u64,
}

impl Default for FileBackendConfig {
    fn default() -> Self {
        Self {
            kind: BackendKind::default(),
            url: String::new(),
            api_token_env: None,
            connect_timeout_seconds: 10,
            echo_delay_ms: 40,
        }
    }
}

impl FileBackendConfig {
    /// Read the bearer token from the configured environment variable.
    pub fn api_token(&self) -> Option<String> {
        self.api_token_env
            .as_deref()
            .and_then(|name| std::env::var(name).ok())
            .filter(|token| !token.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_deserialize() {
        let toml_str = r#"
[backend]
kind = "http"
url = "http://127.0.0.1:8787/ai"
api_token_env = "RELAY_TEST_TOKEN"
"#;
        let config: super::super::FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.backend.kind, BackendKind::Http);
        assert_eq!(config.backend.url, "http://127.0.0.1:8787/ai");
        assert_eq!(config.backend.connect_timeout_seconds, 10);
    }

    #[test]
    fn test_missing_token_variable() {
        let config = FileBackendConfig {
            api_token_env: Some("CHAT_RELAY_TEST_SURELY_UNSET_TOKEN".to_string()),
            ..Default::default()
        };
        assert_eq!(config.api_token(), None);
    }
}
