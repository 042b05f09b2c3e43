//! # sr-rxbuf - Receive Buffer for Safe Transport Connections
//!
//! `sr-rxbuf` holds inbound application messages per logical connection of a
//! safety-related transport protocol (EN 50159 class) until the layer above
//! retrieves them. Capacity is fixed when the registry is initialized and every
//! operation runs in bounded time without allocating.
//!
//! ## Features
//!
//! - **Per-connection FIFO**: fully partitioned ring buffers, one per connection id
//! - **One-shot lifecycle**: a registry is initialized exactly once
//! - **Total contract checks**: every violation is reported to a fatal error sink
//!   before any state changes, then surfaces as a typed [`RxError`]
//! - **Notification hook**: exactly one notification per accepted message
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────┐
//! │                 ReceiveRegistry                  │
//! ├──────────────────────────────────────────────────┤
//! │  Lifecycle gate      │  Connection buffers       │
//! │  Contract checks     │  - ring of Payload slots  │
//! │                      │  - per-connection stats   │
//! └──────────────────────────────────────────────────┘
//!           │                         │
//!           ▼                         ▼
//! ┌─────────────────┐    ┌─────────────────────────┐
//! │ FatalErrorSink  │    │    MessageNotifier      │
//! └─────────────────┘    └─────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```
//! use sr_rxbuf::{Payload, ReadOutcome, ReceiveRegistry};
//!
//! let mut registry = ReceiveRegistry::new();
//! registry.init(1, 2).unwrap();
//!
//! registry.add(0, &Payload::from_slice(b"hello").unwrap()).unwrap();
//! assert_eq!(registry.used_count(0).unwrap(), 1);
//!
//! match registry.read(0).unwrap() {
//!     ReadOutcome::Message(payload) => assert_eq!(payload.as_bytes(), b"hello"),
//!     ReadOutcome::NoMessageReceived => unreachable!(),
//! }
//! ```

pub mod buffers;
pub mod error;
pub mod fatal;
pub mod payload;
pub mod registry;
pub mod sync;

/// Identifier of a logical connection, an index into the registry
pub type ConnectionId = usize;

// Main API re-exports
pub use buffers::{ConnectionBuffer, ConnectionStats, RegistryConfig, RegistryConfigBuilder, RegistryLimits};
pub use error::{FatalCode, Result, RxError};
pub use fatal::{FatalErrorSink, HaltOnFatal, LogFatalSink, RecordingFatalSink};
pub use payload::Payload;
pub use registry::{ConnectionSnapshot, ReadOutcome, ReceiveRegistry, ReceiveStatus, RegistrySnapshot};
pub use sync::{MessageNotifier, NoopNotifier, RecordingNotifier};
#[cfg(target_os = "linux")]
pub use sync::EventFdNotifier;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Compile-time bounds of the receive buffer
pub mod limits {
    /// Smallest number of connections a registry can serve
    pub const MIN_CONNECTIONS: usize = 1;

    /// Default upper bound on connections per registry
    pub const MAX_CONNECTIONS: usize = 2;

    /// Ceiling for a configured connection bound
    pub const MAX_CONNECTIONS_CEILING: usize = 256;

    /// Smallest per-connection capacity
    pub const MIN_CAPACITY: usize = 2;

    /// Largest per-connection capacity
    pub const MAX_CAPACITY: usize = 20;

    /// Smallest payload accepted by `add`
    pub const MIN_PAYLOAD_LEN: usize = 1;

    /// Largest payload accepted by `add`, also the storage size of a [`crate::Payload`]
    pub const MAX_PAYLOAD_LEN: usize = 1055;
}
