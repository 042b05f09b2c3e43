//! Registry configuration

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{
    error::{Result, RxError},
    limits::{MAX_CAPACITY, MAX_CONNECTIONS, MAX_CONNECTIONS_CEILING, MIN_CAPACITY, MIN_CONNECTIONS},
};

/// Bounds that `init` checks its arguments against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryLimits {
    /// Largest accepted connection count
    pub max_connections: usize,
    /// Smallest accepted per-connection capacity
    pub min_capacity: usize,
    /// Largest accepted per-connection capacity
    pub max_capacity: usize,
}

impl Default for RegistryLimits {
    fn default() -> Self {
        Self {
            max_connections: MAX_CONNECTIONS,
            min_capacity: MIN_CAPACITY,
            max_capacity: MAX_CAPACITY,
        }
    }
}

impl RegistryLimits {
    /// Set the connection bound
    pub fn with_max_connections(mut self, max_connections: usize) -> Self {
        self.max_connections = max_connections;
        self
    }

    /// Set the capacity bounds
    pub fn with_capacity_range(mut self, min_capacity: usize, max_capacity: usize) -> Self {
        self.min_capacity = min_capacity;
        self.max_capacity = max_capacity;
        self
    }

    /// Check the limits against the compile-time ceilings
    pub fn validate(&self) -> Result<()> {
        if !(MIN_CONNECTIONS..=MAX_CONNECTIONS_CEILING).contains(&self.max_connections) {
            return Err(RxError::invalid_parameter(
                "max_connections",
                format!(
                    "{} outside [{}, {}]",
                    self.max_connections, MIN_CONNECTIONS, MAX_CONNECTIONS_CEILING
                ),
            ));
        }

        if self.min_capacity < MIN_CAPACITY || self.max_capacity > MAX_CAPACITY {
            return Err(RxError::invalid_parameter(
                "capacity_range",
                format!(
                    "[{}, {}] not within [{}, {}]",
                    self.min_capacity, self.max_capacity, MIN_CAPACITY, MAX_CAPACITY
                ),
            ));
        }

        if self.min_capacity > self.max_capacity {
            return Err(RxError::invalid_parameter(
                "capacity_range",
                "Minimum capacity cannot exceed maximum capacity",
            ));
        }

        Ok(())
    }

    /// Check a connection count against these limits
    pub fn check_connection_count(&self, connection_count: usize) -> Result<()> {
        if !(MIN_CONNECTIONS..=self.max_connections).contains(&connection_count) {
            return Err(RxError::invalid_parameter(
                "connection_count",
                format!(
                    "{} outside [{}, {}]",
                    connection_count, MIN_CONNECTIONS, self.max_connections
                ),
            ));
        }
        Ok(())
    }

    /// Check a per-connection capacity against these limits
    pub fn check_capacity(&self, capacity: usize) -> Result<()> {
        if !(self.min_capacity..=self.max_capacity).contains(&capacity) {
            return Err(RxError::invalid_parameter(
                "capacity",
                format!(
                    "{} outside [{}, {}]",
                    capacity, self.min_capacity, self.max_capacity
                ),
            ));
        }
        Ok(())
    }
}

/// Configuration for a receive registry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Number of connections served
    pub connection_count: usize,
    /// Slots per connection
    pub capacity: usize,
    /// Bounds the two values above are checked against
    #[serde(default)]
    pub limits: RegistryLimits,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            connection_count: MIN_CONNECTIONS,
            capacity: MAX_CAPACITY,
            limits: RegistryLimits::default(),
        }
    }
}

impl RegistryConfig {
    /// Create a configuration with default limits
    pub fn new(connection_count: usize, capacity: usize) -> Self {
        Self {
            connection_count,
            capacity,
            ..Default::default()
        }
    }

    /// Set connection count
    pub fn with_connection_count(mut self, connection_count: usize) -> Self {
        self.connection_count = connection_count;
        self
    }

    /// Set per-connection capacity
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Set limits
    pub fn with_limits(mut self, limits: RegistryLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.limits.validate()?;
        self.limits.check_connection_count(self.connection_count)?;
        self.limits.check_capacity(self.capacity)
    }

    /// Total number of payload slots the registry will allocate
    pub fn total_slots(&self) -> usize {
        self.connection_count.saturating_mul(self.capacity)
    }

    /// Parse and validate a TOML document
    pub fn from_toml_str(document: &str) -> Result<Self> {
        let config: Self = toml::from_str(document)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let document = std::fs::read_to_string(path)?;
        Self::from_toml_str(&document)
    }
}

/// Builder pattern for registry configuration
pub struct RegistryConfigBuilder {
    config: RegistryConfig,
}

impl RegistryConfigBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self {
            config: RegistryConfig::default(),
        }
    }

    /// Set connection count
    pub fn connection_count(mut self, connection_count: usize) -> Self {
        self.config.connection_count = connection_count;
        self
    }

    /// Set per-connection capacity
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.config.capacity = capacity;
        self
    }

    /// Raise or lower the connection bound
    pub fn max_connections(mut self, max_connections: usize) -> Self {
        self.config.limits.max_connections = max_connections;
        self
    }

    /// Narrow the capacity bounds
    pub fn capacity_range(mut self, min_capacity: usize, max_capacity: usize) -> Self {
        self.config.limits = self.config.limits.with_capacity_range(min_capacity, max_capacity);
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<RegistryConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

impl Default for RegistryConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
