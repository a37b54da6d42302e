//! API frame checksum
//!
//! The checksum is `0xFF` minus the low byte of the sum of all payload bytes.
//! A frame is valid when payload sum plus checksum equals `0xFF` (mod 256).

/// Compute the checksum byte for a frame payload.
pub fn checksum(payload: &[u8]) -> u8 {
    0xFF - sum(payload)
}

/// Check a payload against a received checksum byte.
pub fn verify(payload: &[u8], checksum: u8) -> bool {
    sum(payload).wrapping_add(checksum) == 0xFF
}

/// Low byte of the payload sum.
pub fn sum(payload: &[u8]) -> u8 {
    payload.iter().fold(0u8, |acc, b| acc.wrapping_add(*b))
}
