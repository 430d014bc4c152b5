//! Presentation-level configuration
//!
//! Configuration for the terminal chat.

use colored::Colorize;
use serde::{Deserialize, Serialize};

/// REPL configuration for the presentation layer
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplConfig {
    /// Prompt shown while waiting for input
    pub prompt: String,
    /// Enable colored terminal output
    pub color: bool,
}

impl Default for ReplConfig {
    fn default() -> Self {
        Self {
            prompt: ">>> ".to_string(),
            color: true,
        }
    }
}

impl ReplConfig {
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    /// The prompt as printed, styled only when color is enabled.
    pub fn styled_prompt(&self) -> String {
        if self.color {
            self.prompt.green().bold().to_string()
        } else {
            self.prompt.clone()
        }
    }
}
