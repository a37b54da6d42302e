//! Byte stuffing for API escaped mode
//!
//! Every `0x7E`, `0x7D`, `0x11` and `0x13` after the start delimiter is sent
//! as `0x7D` followed by the byte XORed with `0x20`. The start delimiter
//! itself is never escaped; callers pass only the bytes that follow it.

use crate::constants::{ESCAPE_BYTE, ESCAPE_XOR, SPECIAL_BYTES};

/// Whether `byte` must be escaped in API escaped mode.
#[inline]
pub fn needs_escape(byte: u8) -> bool {
    SPECIAL_BYTES.contains(&byte)
}

/// Escape `data`, appending the result to `output`.
pub fn escape_into(data: &[u8], output: &mut Vec<u8>) {
    output.reserve(data.len() + data.len() / 8);
    for &byte in data {
        if needs_escape(byte) {
            output.push(ESCAPE_BYTE);
            output.push(byte ^ ESCAPE_XOR);
        } else {
            output.push(byte);
        }
    }
}

/// Escape `data` into a new buffer.
pub fn escape(data: &[u8]) -> Vec<u8> {
    let mut output = Vec::with_capacity(data.len());
    escape_into(data, &mut output);
    output
}

/// Unescape a complete buffer.
///
/// A trailing lone escape byte has nothing to apply to and is dropped.
pub fn unescape(data: &[u8]) -> Vec<u8> {
    let mut unescaper = Unescaper::new();
    data.iter().filter_map(|&b| unescaper.push(b)).collect()
}

/// Streaming unescaper
///
/// Keeps the "escape pending" flag between calls so an escape sequence split
/// across two reads is decoded correctly.
#[derive(Debug, Default, Clone)]
pub struct Unescaper {
    pending: bool,
}

impl Unescaper {
    /// Create a new unescaper
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one wire byte, returning the decoded byte if one is complete.
    #[inline]
    pub fn push(&mut self, byte: u8) -> Option<u8> {
        if self.pending {
            self.pending = false;
            Some(byte ^ ESCAPE_XOR)
        } else if byte == ESCAPE_BYTE {
            self.pending = true;
            None
        } else {
            Some(byte)
        }
    }

    /// Whether the last byte fed was an escape marker.
    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Forget any pending escape.
    pub fn reset(&mut self) {
        self.pending = false;
    }
}
