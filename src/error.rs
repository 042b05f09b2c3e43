//! Error types and the fatal-code taxonomy for the receive buffer

use serde::{Deserialize, Serialize};

use crate::ConnectionId;

/// Result type alias for receive buffer operations
pub type Result<T> = std::result::Result<T, RxError>;

/// Codes reported to the fatal error sink.
///
/// Every contract violation maps to exactly one of these codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FatalCode {
    /// Out-of-range argument (connection id, payload size, configuration)
    InvalidParameter,
    /// Operation attempted before the registry was initialized
    NotInitialized,
    /// Second initialization of the same registry
    AlreadyInitialized,
    /// Add on a connection whose buffer has no free slot
    ReceiveBufferFull,
}

impl FatalCode {
    /// Stable name used in log lines and diagnostics
    pub fn name(&self) -> &'static str {
        match self {
            FatalCode::InvalidParameter => "InvalidParameter",
            FatalCode::NotInitialized => "NotInitialized",
            FatalCode::AlreadyInitialized => "AlreadyInitialized",
            FatalCode::ReceiveBufferFull => "ReceiveBufferFull",
        }
    }
}

impl std::fmt::Display for FatalCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Errors produced by the receive buffer
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RxError {
    /// Invalid argument or configuration value
    #[error("Invalid parameter: {parameter} - {message}")]
    InvalidParameter { parameter: String, message: String },

    /// Registry used before `init`
    #[error("Receive buffer not initialized: {operation}")]
    NotInitialized { operation: &'static str },

    /// Registry initialized twice
    #[error("Receive buffer already initialized with {connection_count} connection(s) of capacity {capacity}")]
    AlreadyInitialized {
        connection_count: usize,
        capacity: usize,
    },

    /// Connection buffer has no free slot
    #[error("Receive buffer full: connection {connection_id} holds {capacity} message(s)")]
    ReceiveBufferFull {
        connection_id: ConnectionId,
        capacity: usize,
    },

    /// Configuration document could not be loaded
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Platform facility (eventfd, poll) failed
    #[error("Platform error: {message}")]
    Platform { message: String },
}

impl RxError {
    /// Create an invalid parameter error
    pub fn invalid_parameter(parameter: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            parameter: parameter.into(),
            message: message.into(),
        }
    }

    /// Create a not-initialized error for the named operation
    pub fn not_initialized(operation: &'static str) -> Self {
        Self::NotInitialized { operation }
    }

    /// Create an already-initialized error carrying the live configuration
    pub fn already_initialized(connection_count: usize, capacity: usize) -> Self {
        Self::AlreadyInitialized {
            connection_count,
            capacity,
        }
    }

    /// Create a buffer full error
    pub fn receive_buffer_full(connection_id: ConnectionId, capacity: usize) -> Self {
        Self::ReceiveBufferFull {
            connection_id,
            capacity,
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a platform error
    pub fn platform(message: impl Into<String>) -> Self {
        Self::Platform {
            message: message.into(),
        }
    }

    /// Fatal code of a contract violation, `None` for environmental errors
    pub fn code(&self) -> Option<FatalCode> {
        match self {
            Self::InvalidParameter { .. } => Some(FatalCode::InvalidParameter),
            Self::NotInitialized { .. } => Some(FatalCode::NotInitialized),
            Self::AlreadyInitialized { .. } => Some(FatalCode::AlreadyInitialized),
            Self::ReceiveBufferFull { .. } => Some(FatalCode::ReceiveBufferFull),
            Self::Config { .. } | Self::Platform { .. } => None,
        }
    }

    /// Whether this error is a contract violation the caller must not recover from
    pub fn is_fatal(&self) -> bool {
        self.code().is_some()
    }
}

impl From<toml::de::Error> for RxError {
    fn from(err: toml::de::Error) -> Self {
        Self::config(format!("TOML error: {}", err))
    }
}

impl From<std::io::Error> for RxError {
    fn from(err: std::io::Error) -> Self {
        Self::config(format!("I/O error: {}", err))
    }
}
