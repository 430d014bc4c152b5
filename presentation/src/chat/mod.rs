//! Interactive chat module
//!
//! Provides a line-based terminal client for a relay session.

mod input;
mod repl;

pub use input::ReplInput;
pub use repl::{ChatRepl, ReplError};
