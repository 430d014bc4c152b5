//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure adapters and the hosting
//! transport must implement.

pub mod conversation_logger;
pub mod generation_source;
pub mod outbound;
pub mod transcript_repository;
