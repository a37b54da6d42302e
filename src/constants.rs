//! Protocol and runtime constants
//!
//! Centralized constants to avoid duplication and ensure consistency.

// =============================================================================
// Envelope
// =============================================================================

/// Start delimiter of every API frame
pub const START_DELIMITER: u8 = 0x7E;

/// Escape marker used in API escaped mode
pub const ESCAPE_BYTE: u8 = 0x7D;

/// Software flow control XON
pub const XON: u8 = 0x11;

/// Software flow control XOFF
pub const XOFF: u8 = 0x13;

/// Value XORed with an escaped byte
pub const ESCAPE_XOR: u8 = 0x20;

/// Bytes that must be escaped after the start delimiter
pub const SPECIAL_BYTES: [u8; 4] = [START_DELIMITER, ESCAPE_BYTE, XON, XOFF];

/// Delimiter (1) + length (2) + checksum (1)
pub const ENVELOPE_OVERHEAD: usize = 4;

// =============================================================================
// Buffers
// =============================================================================

/// Largest payload the 16-bit length field can announce
pub const MAX_WIRE_PAYLOAD_LEN: usize = u16::MAX as usize;

/// Default upper bound for a single frame payload
pub const DEFAULT_MAX_PAYLOAD_LEN: usize = 4096;

/// Default capacity of the unsolicited-packet broadcast queue
pub const DEFAULT_SUBSCRIBER_CAPACITY: usize = 256;

/// Channel capacity for transport byte channels
pub const CHANNEL_CAPACITY: usize = 256;

/// Transport read buffer size
pub const READ_BUFFER_SIZE: usize = 4096;

// =============================================================================
// Timing
// =============================================================================

/// Default `send_and_wait` timeout (milliseconds)
pub const DEFAULT_RESPONSE_TIMEOUT_MS: u64 = 2000;

/// Default serial read timeout (milliseconds)
pub const DEFAULT_SERIAL_READ_TIMEOUT_MS: u64 = 10;

// =============================================================================
// Serial
// =============================================================================

/// Factory default baud rate of XBee modules
pub const DEFAULT_BAUD_RATE: u32 = 9600;

/// Consecutive zero-byte reads before assuming port disconnected
pub const SERIAL_DISCONNECT_THRESHOLD: u32 = 10;
