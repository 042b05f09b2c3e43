//! Bounded FIFO of payloads for a single connection

use crate::{
    error::{Result, RxError},
    payload::Payload,
    ConnectionId,
};

use super::stats::ConnectionStats;

/// Fixed-capacity ring of payload slots owned by one connection.
///
/// All slots are allocated up front, so pushing and popping never allocate
/// and run in time independent of occupancy.
#[derive(Debug)]
pub struct ConnectionBuffer {
    /// Connection this buffer belongs to
    connection_id: ConnectionId,
    /// Slot storage, length == capacity
    slots: Box<[Payload]>,
    /// Index of the oldest stored payload
    head: usize,
    /// Number of stored payloads
    used: usize,
    /// Counters
    stats: ConnectionStats,
}

impl ConnectionBuffer {
    /// Create an empty buffer with `capacity` slots
    pub fn new(connection_id: ConnectionId, capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(RxError::invalid_parameter(
                "capacity",
                "Capacity must be greater than 0",
            ));
        }

        let slots = vec![Payload::new(); capacity].into_boxed_slice();

        Ok(Self {
            connection_id,
            slots,
            head: 0,
            used: 0,
            stats: ConnectionStats::new(),
        })
    }

    /// Connection id
    pub fn connection_id(&self) -> ConnectionId {
        self.connection_id
    }

    /// Number of slots
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of stored payloads
    pub fn used(&self) -> usize {
        self.used
    }

    /// Number of free slots
    pub fn free(&self) -> usize {
        self.capacity() - self.used
    }

    /// Check if the buffer is empty
    pub fn is_empty(&self) -> bool {
        self.used == 0
    }

    /// Check if the buffer is full
    pub fn is_full(&self) -> bool {
        self.used == self.capacity()
    }

    /// Copy `payload` into the tail slot
    pub fn push(&mut self, payload: &Payload) -> Result<()> {
        if self.is_full() {
            return Err(RxError::receive_buffer_full(self.connection_id, self.capacity()));
        }

        let tail = self.slot_index(self.used);
        self.slots[tail].copy_from(payload);
        self.used += 1;
        self.stats.record_add(self.used);
        Ok(())
    }

    /// Copy the head payload out and release its slot
    pub fn pop(&mut self) -> Option<Payload> {
        let payload = self.peek()?.clone();
        self.advance_head();
        Some(payload)
    }

    /// Copy the head payload into `out` and release its slot.
    ///
    /// Returns `false` and leaves `out` untouched when empty.
    pub fn pop_into(&mut self, out: &mut Payload) -> bool {
        match self.peek() {
            Some(head) => {
                out.copy_from(head);
                self.advance_head();
                true
            }
            None => false,
        }
    }

    /// Head payload without removing it
    pub fn peek(&self) -> Option<&Payload> {
        if self.is_empty() {
            None
        } else {
            Some(&self.slots[self.head])
        }
    }

    /// Declared size of the head payload, 0 when empty
    pub fn peek_size(&self) -> usize {
        self.peek().map_or(0, Payload::size)
    }

    /// Discard every stored payload
    pub fn clear(&mut self) {
        self.stats.record_reset(self.used);
        self.head = 0;
        self.used = 0;
    }

    /// Counters for this connection
    pub fn stats(&self) -> &ConnectionStats {
        &self.stats
    }

    #[inline]
    fn slot_index(&self, offset: usize) -> usize {
        let index = self.head + offset;
        if index >= self.capacity() {
            index - self.capacity()
        } else {
            index
        }
    }

    fn advance_head(&mut self) {
        self.head = self.slot_index(1);
        self.used -= 1;
        self.stats.record_read();
    }
}
