//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod relay;
pub mod session_hub;
pub mod transcript_store;

#[cfg(test)]
pub(crate) mod test_support;
