//! Relay protocol vocabulary shared by the session actor and its clients.

pub mod inbound;
