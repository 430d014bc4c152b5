//! REPL configuration from TOML (`[repl]` section)

use serde::{Deserialize, Serialize};

/// Raw REPL configuration from TOML
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileReplConfig {
    /// Session key used when `--user` is not given
    pub user: String,
    /// Enable colored terminal output
    pub color: bool,
}

impl Default for FileReplConfig {
    fn default() -> Self {
        Self {
            user: "local".to_string(),
            color: true,
        }
    }
}
