//! Core domain concepts shared across all subdomains.
//!
//! - [`session_key::SessionKey`]: opaque identifier partitioning sessions
//! - [`error::DecodeError`]: failures raised while decoding a frame stream

pub mod error;
pub mod session_key;
