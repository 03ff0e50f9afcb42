//! Little-endian decoding of raw frames
//!
//! A frame can be up to 512 bytes, so values are held as [`BigUint`] rather
//! than a fixed-width integer.

use num_bigint::BigUint;

/// Interpret `bytes` as an unsigned little-endian integer of any length
pub fn decode_le(bytes: &[u8]) -> BigUint {
    BigUint::from_bytes_le(bytes)
}

/// Keeps the most recently decoded value
///
/// Empty frames leave the value untouched; it starts at zero.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValueTracker {
    value: BigUint,
}

impl ValueTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode `frame` if it is non-empty. Returns false when the old value was kept.
    pub fn update(&mut self, frame: &[u8]) -> bool {
        if frame.is_empty() {
            return false;
        }
        self.value = decode_le(frame);
        true
    }

    pub fn value(&self) -> &BigUint {
        &self.value
    }
}
