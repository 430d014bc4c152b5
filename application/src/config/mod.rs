//! Application configuration types.

pub mod relay_config;

pub use relay_config::RelayConfig;
