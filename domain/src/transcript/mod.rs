//! Conversation transcript domain.
//!
//! - [`entities::Turn`]: one role-tagged message
//! - [`entities::Transcript`]: the ordered history of turns for a session

pub mod entities;
