//! Receive registry: lifecycle gate, contract checks and the public operations

mod contract;
mod receive;
mod snapshot;
mod state;

pub use receive::{ReadOutcome, ReceiveRegistry, ReceiveStatus};
pub use snapshot::{ConnectionSnapshot, RegistrySnapshot};
