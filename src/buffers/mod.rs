//! Per-connection buffer storage
//!
//! A [`ConnectionBuffer`] is a preallocated ring of payload slots; the
//! registry owns one per connection and sizes them from a [`RegistryConfig`].

pub mod config;
pub mod connection;
pub mod stats;

// Re-export main types
pub use config::{RegistryConfig, RegistryConfigBuilder, RegistryLimits};
pub use connection::ConnectionBuffer;
pub use stats::ConnectionStats;
