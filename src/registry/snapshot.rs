//! Serializable diagnostics view of a registry

use serde::{Deserialize, Serialize};

use crate::{
    buffers::{ConnectionBuffer, ConnectionStats},
    ConnectionId,
};

/// State of one connection at the time of the snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionSnapshot {
    pub connection_id: ConnectionId,
    pub used: usize,
    pub free: usize,
    pub next_payload_size: usize,
    pub stats: ConnectionStats,
}

impl ConnectionSnapshot {
    pub(crate) fn of(buffer: &ConnectionBuffer) -> Self {
        Self {
            connection_id: buffer.connection_id(),
            used: buffer.used(),
            free: buffer.free(),
            next_payload_size: buffer.peek_size(),
            stats: *buffer.stats(),
        }
    }
}

/// State of every connection of a registry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrySnapshot {
    /// Slots per connection
    pub capacity: usize,
    /// One entry per connection id, in id order
    pub connections: Vec<ConnectionSnapshot>,
}

impl RegistrySnapshot {
    /// Payloads stored across all connections
    pub fn total_used(&self) -> usize {
        self.connections.iter().map(|c| c.used).sum()
    }

    /// One line per connection, for logs and the CLI
    pub fn render(&self) -> String {
        let mut out = format!(
            "{} connection(s), capacity {}\n",
            self.connections.len(),
            self.capacity
        );
        for c in &self.connections {
            out.push_str(&format!(
                "  [{}] used {:>2} free {:>2} next {:>4}  {}\n",
                c.connection_id,
                c.used,
                c.free,
                c.next_payload_size,
                c.stats.summary()
            ));
        }
        out
    }
}
