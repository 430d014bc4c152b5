//! Presentation layer for chat-relay
//!
//! This crate contains the CLI definition, the interactive terminal chat,
//! and console formatting of stored conversations.

pub mod chat;
pub mod cli;
pub mod config;
pub mod output;

// Re-export commonly used types
pub use chat::{ChatRepl, ReplError, ReplInput};
pub use cli::commands::{Cli, Command};
pub use config::ReplConfig;
pub use output::console::ConsoleFormatter;
