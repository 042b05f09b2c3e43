//! Precondition checks shared by every registry operation
//!
//! Each check is pure: it inspects state and returns the violation without
//! touching anything. [`enforce`] routes a violation to the fatal sink.

use crate::{
    buffers::ConnectionBuffer,
    error::{Result, RxError},
    fatal::FatalErrorSink,
    limits::{MAX_PAYLOAD_LEN, MIN_PAYLOAD_LEN},
    payload::Payload,
    ConnectionId,
};

use super::state::{Connections, RegistryState};

/// Report a violation to `sink` and hand it back to the caller
pub(crate) fn enforce<T, S>(sink: &S, result: Result<T>) -> Result<T>
where
    S: FatalErrorSink + ?Sized,
{
    result.map_err(|err| {
        sink.report(&err);
        err
    })
}

pub(crate) fn initialized<'a>(state: &'a RegistryState, operation: &'static str) -> Result<&'a Connections> {
    match state {
        RegistryState::Initialized(connections) => Ok(connections),
        RegistryState::Uninitialized => Err(RxError::not_initialized(operation)),
    }
}

pub(crate) fn initialized_mut<'a>(
    state: &'a mut RegistryState,
    operation: &'static str,
) -> Result<&'a mut Connections> {
    match state {
        RegistryState::Initialized(connections) => Ok(connections),
        RegistryState::Uninitialized => Err(RxError::not_initialized(operation)),
    }
}

pub(crate) fn connection(connections: &Connections, connection_id: ConnectionId) -> Result<&ConnectionBuffer> {
    connections
        .buffers
        .get(connection_id)
        .ok_or_else(|| connection_out_of_range(connection_id, connections.connection_count()))
}

pub(crate) fn connection_mut(
    connections: &mut Connections,
    connection_id: ConnectionId,
) -> Result<&mut ConnectionBuffer> {
    let count = connections.connection_count();
    connections
        .buffers
        .get_mut(connection_id)
        .ok_or_else(|| connection_out_of_range(connection_id, count))
}

pub(crate) fn payload_size(payload: &Payload) -> Result<()> {
    if payload.has_valid_size() {
        Ok(())
    } else {
        Err(RxError::invalid_parameter(
            "payload.size",
            format!(
                "{} outside [{}, {}]",
                payload.size(),
                MIN_PAYLOAD_LEN,
                MAX_PAYLOAD_LEN
            ),
        ))
    }
}

fn connection_out_of_range(connection_id: ConnectionId, connection_count: usize) -> RxError {
    RxError::invalid_parameter(
        "connection_id",
        format!("{} not below connection count {}", connection_id, connection_count),
    )
}
