//! Codec abstraction for frame encoding/decoding
//!
//! Separates envelope concerns from transport:
//! - **Codec**: How payloads are framed on the wire (API, API escaped)
//! - **Transport**: How bytes flow (Serial, in-memory stream, ...)
//!
//! The payload inside a frame is handled by `crate::packet`.

pub mod api;
pub mod checksum;
pub mod escape;
pub mod hex;

pub use api::{encode_frame, ApiFrameCodec};
pub use checksum::checksum;
pub use escape::{escape, unescape, Unescaper};
pub use hex::{hex_compact, hex_pretty, parse_hex};

use crate::error::MalformedFrame;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// API operating mode of the radio (`AP` setting)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OperatingMode {
    /// API mode without escaping (`AP = 1`)
    #[default]
    Api,
    /// API mode with escaped control bytes (`AP = 2`)
    ApiEscaped,
}

/// Event produced by a codec while decoding a byte stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameEvent {
    /// A checksum-verified, unescaped payload (frame type byte first)
    Frame(Bytes),
    /// A frame was dropped; the codec has already resynchronised
    Malformed(MalformedFrame),
}

/// Codec trait for framing payloads
///
/// A codec transforms raw bytes into frame events (decode)
/// and payloads into bytes for transmission (encode).
pub trait Codec: Send {
    /// Decode incoming bytes
    ///
    /// Calls `on_event` for each complete or rejected frame.
    /// May buffer partial data internally.
    fn decode(&mut self, data: &[u8], on_event: impl FnMut(FrameEvent));

    /// Encode a payload for transmission
    ///
    /// Appends the complete frame to `output`. A payload the codec cannot
    /// frame is refused and `output` is left untouched.
    fn encode(&self, payload: &[u8], output: &mut Vec<u8>) -> Result<(), MalformedFrame>;
}
