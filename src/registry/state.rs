//! Lifecycle gate of a registry

use crate::{
    buffers::{ConnectionBuffer, RegistryLimits},
    error::{Result, RxError},
};

/// Per-registry connection arena, present only once initialized
#[derive(Debug)]
pub(crate) struct Connections {
    /// Slots per connection
    pub(crate) capacity: usize,
    /// One buffer per connection id, index == id
    pub(crate) buffers: Vec<ConnectionBuffer>,
}

impl Connections {
    fn allocate(connection_count: usize, capacity: usize) -> Result<Self> {
        let buffers = (0..connection_count)
            .map(|connection_id| ConnectionBuffer::new(connection_id, capacity))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { capacity, buffers })
    }

    pub(crate) fn connection_count(&self) -> usize {
        self.buffers.len()
    }
}

/// Uninitialized → Initialized, never back
#[derive(Debug, Default)]
pub(crate) enum RegistryState {
    #[default]
    Uninitialized,
    Initialized(Connections),
}

impl RegistryState {
    pub(crate) fn is_initialized(&self) -> bool {
        matches!(self, RegistryState::Initialized(_))
    }

    /// Validate every argument, then allocate and switch to Initialized.
    ///
    /// On any error the state is left untouched.
    pub(crate) fn initialize(
        &mut self,
        connection_count: usize,
        capacity: usize,
        limits: &RegistryLimits,
    ) -> Result<()> {
        if let RegistryState::Initialized(existing) = self {
            return Err(RxError::already_initialized(
                existing.connection_count(),
                existing.capacity,
            ));
        }

        limits.validate()?;
        limits.check_connection_count(connection_count)?;
        limits.check_capacity(capacity)?;

        *self = RegistryState::Initialized(Connections::allocate(connection_count, capacity)?);
        Ok(())
    }
}
