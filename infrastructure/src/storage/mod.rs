//! Transcript storage adapters
//!
//! Implementations of the
//! [`TranscriptRepository`](relay_application::TranscriptRepository) port.

mod json_file;
mod memory;

pub use json_file::JsonFileTranscriptRepository;
pub use memory::InMemoryTranscriptRepository;
