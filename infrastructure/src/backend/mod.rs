//! Generation backends
//!
//! Implementations of the
//! [`GenerationSource`](relay_application::GenerationSource) port. Both
//! produce the same `data:` event stream, so the relay decodes them alike.

mod echo;
mod http_stream;

pub use echo::EchoSource;
pub use http_stream::HttpStreamSource;
