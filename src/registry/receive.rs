//! The receive registry: one bounded FIFO per connection

use crate::{
    buffers::{ConnectionBuffer, ConnectionStats, RegistryConfig, RegistryLimits},
    error::Result,
    fatal::{FatalErrorSink, LogFatalSink},
    payload::Payload,
    sync::{MessageNotifier, NoopNotifier},
    ConnectionId,
};

use super::{
    contract::{self, enforce},
    snapshot::{ConnectionSnapshot, RegistrySnapshot},
    state::RegistryState,
};

/// Non-fatal outcome of a read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiveStatus {
    /// A payload was handed out
    NoError,
    /// The connection's buffer was empty
    NoMessageReceived,
}

/// Result of [`ReceiveRegistry::read`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    /// Oldest stored payload of the connection
    Message(Payload),
    /// Nothing stored; this is ordinary control flow, not an error
    NoMessageReceived,
}

impl ReadOutcome {
    /// Status code of this outcome
    pub fn status(&self) -> ReceiveStatus {
        match self {
            ReadOutcome::Message(_) => ReceiveStatus::NoError,
            ReadOutcome::NoMessageReceived => ReceiveStatus::NoMessageReceived,
        }
    }

    /// Whether a payload was read
    pub fn is_message(&self) -> bool {
        matches!(self, ReadOutcome::Message(_))
    }

    /// The payload, if any
    pub fn into_payload(self) -> Option<Payload> {
        match self {
            ReadOutcome::Message(payload) => Some(payload),
            ReadOutcome::NoMessageReceived => None,
        }
    }
}

/// Per-connection receive buffers of one protocol instance.
///
/// Created uninitialized; [`init`](Self::init) fixes the connection count and
/// capacity exactly once. Every other operation requires the registry to be
/// initialized. A violated precondition is reported to the fatal sink `S`
/// before the operation returns `Err`, and leaves all buffers unchanged.
/// Every accepted payload triggers one call on the notifier `N`.
///
/// Mutating operations take `&mut self`; the registry holds no lock.
pub struct ReceiveRegistry<N = NoopNotifier, S = LogFatalSink> {
    state: RegistryState,
    limits: RegistryLimits,
    notifier: N,
    sink: S,
}

impl ReceiveRegistry {
    /// Uninitialized registry with default limits, no notifier and a logging sink
    pub fn new() -> Self {
        Self::with_collaborators(NoopNotifier, LogFatalSink)
    }
}

impl Default for ReceiveRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl<N, S> ReceiveRegistry<N, S>
where
    N: MessageNotifier,
    S: FatalErrorSink,
{
    /// Uninitialized registry with the given collaborators
    pub fn with_collaborators(notifier: N, sink: S) -> Self {
        Self {
            state: RegistryState::Uninitialized,
            limits: RegistryLimits::default(),
            notifier,
            sink,
        }
    }

    /// Replace the bounds `init` checks against
    pub fn with_limits(mut self, limits: RegistryLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Build and initialize a registry from a configuration
    pub fn from_config(config: &RegistryConfig, notifier: N, sink: S) -> Result<Self> {
        let mut registry = Self::with_collaborators(notifier, sink).with_limits(config.limits);
        registry.init(config.connection_count, config.capacity)?;
        Ok(registry)
    }

    /// Allocate `connection_count` empty buffers of `capacity` slots each.
    ///
    /// Fails with `AlreadyInitialized` on a second call, leaving the first
    /// configuration intact, and with `InvalidParameter` when either value
    /// is outside the registry limits.
    pub fn init(&mut self, connection_count: usize, capacity: usize) -> Result<()> {
        enforce(
            &self.sink,
            self.state.initialize(connection_count, capacity, &self.limits),
        )?;
        log::debug!(
            "receive registry initialized: {} connection(s), capacity {}",
            connection_count,
            capacity
        );
        Ok(())
    }

    /// Whether `init` has succeeded
    pub fn is_initialized(&self) -> bool {
        self.state.is_initialized()
    }

    /// Discard every payload stored for `connection_id`
    pub fn reset_connection(&mut self, connection_id: ConnectionId) -> Result<()> {
        let sink = &self.sink;
        let connections = enforce(sink, contract::initialized_mut(&mut self.state, "reset_connection"))?;
        let buffer = enforce(sink, contract::connection_mut(connections, connection_id))?;

        let discarded = buffer.used();
        buffer.clear();
        log::debug!("connection {} reset, {} payload(s) discarded", connection_id, discarded);
        Ok(())
    }

    /// Store a copy of `payload` at the tail of the connection's FIFO.
    ///
    /// Checks, first failure wins: initialized, connection id in range,
    /// payload size in `[MIN_PAYLOAD_LEN, MAX_PAYLOAD_LEN]`, free slot
    /// available. On success the notifier is called once with
    /// `connection_id`; on failure it is not called.
    pub fn add(&mut self, connection_id: ConnectionId, payload: &Payload) -> Result<()> {
        let sink = &self.sink;
        let connections = enforce(sink, contract::initialized_mut(&mut self.state, "add"))?;
        let buffer = enforce(sink, contract::connection_mut(connections, connection_id))?;
        enforce(sink, contract::payload_size(payload))?;
        enforce(sink, buffer.push(payload))?;
        log::trace!(
            "connection {}: stored {} byte(s), {} used",
            connection_id,
            payload.size(),
            buffer.used()
        );

        self.notifier.message_received(connection_id);
        Ok(())
    }

    /// Remove and return the oldest payload of the connection
    pub fn read(&mut self, connection_id: ConnectionId) -> Result<ReadOutcome> {
        let sink = &self.sink;
        let connections = enforce(sink, contract::initialized_mut(&mut self.state, "read"))?;
        let buffer = enforce(sink, contract::connection_mut(connections, connection_id))?;

        Ok(match buffer.pop() {
            Some(payload) => {
                log::trace!("connection {}: read {} byte(s)", connection_id, payload.size());
                ReadOutcome::Message(payload)
            }
            None => ReadOutcome::NoMessageReceived,
        })
    }

    /// Like [`read`](Self::read) but copies into a caller-owned slot.
    ///
    /// `out` is left unmodified when nothing is stored.
    pub fn read_into(&mut self, connection_id: ConnectionId, out: &mut Payload) -> Result<ReceiveStatus> {
        let sink = &self.sink;
        let connections = enforce(sink, contract::initialized_mut(&mut self.state, "read"))?;
        let buffer = enforce(sink, contract::connection_mut(connections, connection_id))?;

        if buffer.pop_into(out) {
            Ok(ReceiveStatus::NoError)
        } else {
            Ok(ReceiveStatus::NoMessageReceived)
        }
    }

    /// Number of stored payloads
    pub fn used_count(&self, connection_id: ConnectionId) -> Result<usize> {
        self.inspect("used_count", connection_id, |buffer| buffer.used())
    }

    /// Number of free slots
    pub fn free_count(&self, connection_id: ConnectionId) -> Result<usize> {
        self.inspect("free_count", connection_id, |buffer| buffer.free())
    }

    /// Declared size of the oldest stored payload, 0 when empty
    pub fn next_payload_size(&self, connection_id: ConnectionId) -> Result<usize> {
        self.inspect("next_payload_size", connection_id, |buffer| buffer.peek_size())
    }

    /// Counters of one connection
    pub fn stats(&self, connection_id: ConnectionId) -> Result<ConnectionStats> {
        self.inspect("stats", connection_id, |buffer| *buffer.stats())
    }

    /// Number of connections fixed at `init`
    pub fn connection_count(&self) -> Result<usize> {
        let connections = enforce(&self.sink, contract::initialized(&self.state, "connection_count"))?;
        Ok(connections.connection_count())
    }

    /// Per-connection capacity fixed at `init`
    pub fn capacity(&self) -> Result<usize> {
        let connections = enforce(&self.sink, contract::initialized(&self.state, "capacity"))?;
        Ok(connections.capacity)
    }

    /// Point-in-time view of every connection
    pub fn snapshot(&self) -> Result<RegistrySnapshot> {
        let connections = enforce(&self.sink, contract::initialized(&self.state, "snapshot"))?;
        Ok(RegistrySnapshot {
            capacity: connections.capacity,
            connections: connections
                .buffers
                .iter()
                .map(ConnectionSnapshot::of)
                .collect(),
        })
    }

    /// Bounds checked by `init`
    pub fn limits(&self) -> &RegistryLimits {
        &self.limits
    }

    /// The notifier
    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    /// The notifier, mutably
    pub fn notifier_mut(&mut self) -> &mut N {
        &mut self.notifier
    }

    /// The fatal error sink
    pub fn fatal_sink(&self) -> &S {
        &self.sink
    }

    fn inspect<T, F>(&self, operation: &'static str, connection_id: ConnectionId, f: F) -> Result<T>
    where
        F: FnOnce(&ConnectionBuffer) -> T,
    {
        let connections = enforce(&self.sink, contract::initialized(&self.state, operation))?;
        let buffer = enforce(&self.sink, contract::connection(connections, connection_id))?;
        Ok(f(buffer))
    }
}

impl<N, S> std::fmt::Debug for ReceiveRegistry<N, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReceiveRegistry")
            .field("state", &self.state)
            .field("limits", &self.limits)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::{FatalCode, RxError},
        fatal::RecordingFatalSink,
        limits::MAX_PAYLOAD_LEN,
        sync::RecordingNotifier,
    };

    type TestRegistry = ReceiveRegistry<RecordingNotifier, RecordingFatalSink>;

    fn registry(connection_count: usize, capacity: usize) -> TestRegistry {
        let mut registry =
            ReceiveRegistry::with_collaborators(RecordingNotifier::new(), RecordingFatalSink::new());
        registry.init(connection_count, capacity).unwrap();
        registry
    }

    fn payload(tag: u8, len: usize) -> Payload {
        Payload::from_slice(&vec![tag; len]).unwrap()
    }

    #[test]
    fn test_add_notifies_after_store() {
        let mut registry = registry(2, 3);
        registry.add(1, &payload(1, 8)).unwrap();

        assert_eq!(registry.notifier().received(), &[1]);
        assert_eq!(registry.used_count(1).unwrap(), 1);
        assert_eq!(registry.used_count(0).unwrap(), 0);
    }

    #[test]
    fn test_add_check_precedence() {
        let mut uninitialized =
            ReceiveRegistry::with_collaborators(RecordingNotifier::new(), RecordingFatalSink::new());
        let err = uninitialized.add(9, &Payload::with_size(0)).unwrap_err();
        assert_eq!(err.code(), Some(FatalCode::NotInitialized));

        let mut registry = registry(1, 2);
        registry.add(0, &payload(1, 1)).unwrap();
        registry.add(0, &payload(1, 1)).unwrap();

        // Out-of-range id beats bad size and full buffer
        let err = registry.add(1, &Payload::with_size(0)).unwrap_err();
        assert_eq!(err.code(), Some(FatalCode::InvalidParameter));

        // Bad size beats full buffer
        let err = registry.add(0, &Payload::with_size(MAX_PAYLOAD_LEN + 1)).unwrap_err();
        assert_eq!(err.code(), Some(FatalCode::InvalidParameter));

        let err = registry.add(0, &payload(1, 1)).unwrap_err();
        assert_eq!(err.code(), Some(FatalCode::ReceiveBufferFull));

        assert_eq!(
            registry.fatal_sink().codes(),
            vec![
                FatalCode::InvalidParameter,
                FatalCode::InvalidParameter,
                FatalCode::ReceiveBufferFull
            ]
        );
        assert_eq!(registry.notifier().count(), 2);
    }

    #[test]
    fn test_full_after_wrap_reported_once() {
        let mut registry = registry(1, 2);
        registry.add(0, &payload(1, 3)).unwrap();
        registry.read(0).unwrap();
        registry.add(0, &payload(2, 3)).unwrap();
        registry.add(0, &payload(3, 3)).unwrap();

        let err = registry.add(0, &payload(4, 3)).unwrap_err();
        assert_eq!(err, RxError::receive_buffer_full(0, 2));
        assert_eq!(registry.fatal_sink().codes(), vec![FatalCode::ReceiveBufferFull]);
        assert_eq!(registry.notifier().count(), 3);

        let stats = registry.stats(0).unwrap();
        assert_eq!(stats.total_added, 3);
        assert_eq!(stats.peak_used, 2);
        assert_eq!(registry.next_payload_size(0).unwrap(), 3);
    }

    #[test]
    fn test_read_into() {
        let mut registry = registry(1, 2);
        let mut out = payload(0xEE, 4);

        assert_eq!(registry.read_into(0, &mut out).unwrap(), ReceiveStatus::NoMessageReceived);
        assert_eq!(out, payload(0xEE, 4));

        registry.add(0, &payload(3, 30)).unwrap();
        assert_eq!(registry.read_into(0, &mut out).unwrap(), ReceiveStatus::NoError);
        assert_eq!(out, payload(3, 30));
    }

    #[test]
    fn test_reset_connection() {
        let mut registry = registry(2, 2);
        registry.add(0, &payload(1, 1)).unwrap();
        registry.add(1, &payload(2, 1)).unwrap();

        registry.reset_connection(0).unwrap();
        assert_eq!(registry.used_count(0).unwrap(), 0);
        assert_eq!(registry.used_count(1).unwrap(), 1);
        assert_eq!(registry.capacity().unwrap(), 2);
        assert_eq!(registry.stats(0).unwrap().resets, 1);

        let err = registry.reset_connection(2).unwrap_err();
        assert_eq!(err.code(), Some(FatalCode::InvalidParameter));
    }

    #[test]
    fn test_from_config() {
        let config = RegistryConfig::new(2, 4);
        let registry = ReceiveRegistry::from_config(&config, NoopNotifier, RecordingFatalSink::new()).unwrap();
        assert_eq!(registry.connection_count().unwrap(), 2);
        assert_eq!(registry.capacity().unwrap(), 4);

        let config = RegistryConfig::new(3, 4);
        let result = ReceiveRegistry::from_config(&config, NoopNotifier, RecordingFatalSink::new());
        assert!(result.is_err());
    }

    #[test]
    fn test_custom_limits() {
        let mut registry = ReceiveRegistry::new().with_limits(RegistryLimits::default().with_max_connections(8));
        registry.init(8, 2).unwrap();
        assert_eq!(registry.connection_count().unwrap(), 8);
        assert!(registry.used_count(7).is_ok());
    }
}
