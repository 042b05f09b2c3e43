//! Fixed-capacity message payload

use crate::{
    error::{Result, RxError},
    limits::{MAX_PAYLOAD_LEN, MIN_PAYLOAD_LEN},
};

/// One application message.
///
/// Storage is always `MAX_PAYLOAD_LEN` bytes; `size` declares how many of
/// them are meaningful. The declared size is carried as handed over by the
/// deserializer and is only validated when the payload is added to a buffer.
#[derive(Clone)]
pub struct Payload {
    size: usize,
    bytes: [u8; MAX_PAYLOAD_LEN],
}

impl Payload {
    /// Create an empty payload (size 0)
    pub const fn new() -> Self {
        Self {
            size: 0,
            bytes: [0; MAX_PAYLOAD_LEN],
        }
    }

    /// Create a zero-filled payload with the given declared size.
    ///
    /// The size is not checked here.
    pub const fn with_size(size: usize) -> Self {
        Self {
            size,
            bytes: [0; MAX_PAYLOAD_LEN],
        }
    }

    /// Copy `data` into a new payload
    pub fn from_slice(data: &[u8]) -> Result<Self> {
        if data.len() > MAX_PAYLOAD_LEN {
            return Err(RxError::invalid_parameter(
                "data",
                format!("{} bytes exceed payload storage of {}", data.len(), MAX_PAYLOAD_LEN),
            ));
        }

        let mut payload = Self::with_size(data.len());
        payload.bytes[..data.len()].copy_from_slice(data);
        Ok(payload)
    }

    /// Declared size in bytes
    pub fn size(&self) -> usize {
        self.size
    }

    /// Set the declared size
    pub fn set_size(&mut self, size: usize) {
        self.size = size;
    }

    /// Whether the declared size is within `[MIN_PAYLOAD_LEN, MAX_PAYLOAD_LEN]`
    pub fn has_valid_size(&self) -> bool {
        (MIN_PAYLOAD_LEN..=MAX_PAYLOAD_LEN).contains(&self.size)
    }

    /// Meaningful bytes, clamped to the storage
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.size.min(MAX_PAYLOAD_LEN)]
    }

    /// Whole storage, for deserializers that fill it in place
    pub fn storage_mut(&mut self) -> &mut [u8; MAX_PAYLOAD_LEN] {
        &mut self.bytes
    }

    /// Copy size and meaningful bytes from `other` without reallocating
    pub(crate) fn copy_from(&mut self, other: &Payload) {
        let len = other.size.min(MAX_PAYLOAD_LEN);
        self.bytes[..len].copy_from_slice(&other.bytes[..len]);
        self.size = other.size;
    }
}

impl Default for Payload {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for Payload {
    fn eq(&self, other: &Self) -> bool {
        self.size == other.size && self.as_bytes() == other.as_bytes()
    }
}

impl Eq for Payload {}

impl std::fmt::Debug for Payload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let shown = self.as_bytes().len().min(16);
        f.debug_struct("Payload")
            .field("size", &self.size)
            .field("head", &&self.as_bytes()[..shown])
            .finish()
    }
}
