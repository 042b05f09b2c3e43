//! Per-connection statistics

use serde::{Deserialize, Serialize};

/// Counters for one connection buffer.
///
/// Only successful operations update them; a rejected call leaves the
/// counters exactly as they were.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionStats {
    /// Payloads accepted by `add`
    pub total_added: u64,
    /// Payloads handed out by `read`
    pub total_read: u64,
    /// Highest occupancy observed
    pub peak_used: usize,
    /// Number of explicit resets
    pub resets: u64,
    /// Payloads dropped by resets
    pub total_discarded: u64,
}

impl ConnectionStats {
    /// Create new statistics instance
    pub fn new() -> Self {
        Default::default()
    }

    /// Record an accepted payload, `used` is the occupancy after the add
    pub fn record_add(&mut self, used: usize) {
        self.total_added += 1;
        if used > self.peak_used {
            self.peak_used = used;
        }
    }

    /// Record a payload handed out
    pub fn record_read(&mut self) {
        self.total_read += 1;
    }

    /// Record a reset that dropped `discarded` payloads
    pub fn record_reset(&mut self, discarded: usize) {
        self.resets += 1;
        self.total_discarded += discarded as u64;
    }

    /// Payloads accepted but neither read nor discarded by a reset
    pub fn in_flight(&self) -> u64 {
        self.total_added
            .saturating_sub(self.total_read)
            .saturating_sub(self.total_discarded)
    }

    /// Peak occupancy as a fraction of `capacity` (0.0 to 1.0)
    pub fn peak_utilization(&self, capacity: usize) -> f64 {
        if capacity == 0 {
            return 0.0;
        }
        self.peak_used as f64 / capacity as f64
    }

    /// Get a summary string of the statistics
    pub fn summary(&self) -> String {
        format!(
            "ConnectionStats {{ added: {}, read: {}, discarded: {}, peak: {}, resets: {} }}",
            self.total_added, self.total_read, self.total_discarded, self.peak_used, self.resets
        )
    }
}
