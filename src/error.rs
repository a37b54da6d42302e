//! Centralized error types
//!
//! Each layer has its own error enum so callers can tell garbled wire data
//! (`DecodeError`, `MalformedFrame`) from a bad literal passed by the caller
//! (`ConstructionError`) and from connection-level outcomes (`DispatchError`).
//! `Error` wraps all of them plus transport and configuration failures.
//! Use `Result<T>` as shorthand for `std::result::Result<T, Error>`.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// A received frame that failed envelope validation.
///
/// The framer recovers from all of these locally: the frame is dropped and the
/// state machine returns to waiting for a start delimiter.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MalformedFrame {
    /// Checksum byte does not match the payload.
    #[error("checksum mismatch: expected 0x{expected:02X}, got 0x{actual:02X}")]
    ChecksumMismatch {
        /// Checksum computed over the received payload.
        expected: u8,
        /// Checksum byte found on the wire.
        actual: u8,
    },

    /// Length field was zero (a payload always has a frame type byte).
    #[error("zero-length frame")]
    ZeroLength,

    /// Length field exceeds the configured maximum.
    #[error("frame too long: maximum {max} bytes, got {len}")]
    Oversized {
        /// Announced payload length.
        len: usize,
        /// Configured maximum.
        max: usize,
    },

    /// A new start delimiter arrived before the frame was complete.
    #[error("frame interrupted after {received} of {expected} bytes")]
    Interrupted {
        /// Payload bytes received so far.
        received: usize,
        /// Payload bytes announced by the length field.
        expected: usize,
    },
}

/// Errors rejecting a single frame payload.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// Payload was empty.
    #[error("empty payload")]
    NullPayload,

    /// Payload is shorter than the frame type requires.
    #[error("incomplete payload: expected at least {expected} bytes, got {actual}")]
    Incomplete {
        /// Minimum length for this frame type (type byte included).
        expected: usize,
        /// Actual payload length.
        actual: usize,
    },

    /// Payload starts with a different frame type byte.
    #[error("wrong frame type: expected 0x{expected:02X}, got 0x{actual:02X}")]
    WrongFrameType {
        /// Frame type the codec handles.
        expected: u8,
        /// Frame type byte found in the payload.
        actual: u8,
    },

    /// No codec registered for this frame type.
    #[error("unknown frame type: 0x{0:02X}")]
    UnknownFrameType(u8),
}

/// Errors constructing a packet from caller-supplied values.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConstructionError {
    /// A bounded field is outside its valid range.
    #[error("{field} out of range: {value} (valid {min}..={max})")]
    OutOfRange {
        /// Field name.
        field: &'static str,
        /// Rejected value.
        value: u64,
        /// Smallest valid value.
        min: u64,
        /// Largest valid value.
        max: u64,
    },

    /// AT command names are exactly two ASCII characters.
    #[error("invalid AT command {0:?}: must be 2 ASCII characters")]
    InvalidAtCommand(String),
}

impl ConstructionError {
    /// Check `value` against `min..=max`.
    pub(crate) fn check_range(
        field: &'static str,
        value: u64,
        min: u64,
        max: u64,
    ) -> std::result::Result<(), Self> {
        if value < min || value > max {
            return Err(Self::OutOfRange {
                field,
                value,
                min,
                max,
            });
        }
        Ok(())
    }
}

/// Errors reading values out of a decoded IO sample.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IoSampleError {
    /// The sample does not carry the requested reading.
    #[error("operation not supported: {0}")]
    NotSupported(&'static str),
}

/// Errors surfaced to callers of the dispatcher.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// No matching response arrived in time.
    #[error("no response for frame ID {frame_id} within {timeout:?}")]
    Timeout {
        /// Frame ID that was awaited.
        frame_id: u8,
        /// Timeout that elapsed.
        timeout: Duration,
    },

    /// The connection closed before the operation completed.
    #[error("connection closed")]
    ConnectionClosed,

    /// No request is waiting on this frame ID.
    #[error("no pending request for frame ID {0}")]
    NoPendingRequest(u8),

    /// Another request is already waiting on this frame ID.
    #[error("frame ID {0} already has an outstanding request")]
    FrameIdInUse(u8),

    /// The wait was cancelled with `Dispatcher::cancel`.
    #[error("request for frame ID {0} was cancelled")]
    Cancelled(u8),

    /// The payload does not fit in one frame.
    #[error("payload too large: maximum {max} bytes, got {len}")]
    PayloadTooLarge {
        /// Payload length, frame type byte included.
        len: usize,
        /// Configured maximum.
        max: usize,
    },

    /// The packet cannot be correlated with a response (no frame ID, frame ID
    /// 0, or a frame type without a response family).
    #[error("frame type 0x{0:02X} does not expect a correlated response")]
    NotCorrelatable(u8),
}

/// All crate errors
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to open serial port
    #[error("cannot open serial port {port}")]
    SerialOpen {
        port: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to read or write a config file
    #[error("config IO error: {}", path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML for `Config`
    #[error("invalid config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Invalid config value
    #[error("invalid {field}: {reason}")]
    ConfigValidation { field: &'static str, reason: String },

    /// Frame payload rejected
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// Packet construction rejected
    #[error(transparent)]
    Construction(#[from] ConstructionError),

    /// Dispatcher operation failed
    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}

/// Alias for Result with the crate `Error`
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_range_boundaries() {
        assert!(ConstructionError::check_range("rssi", 0, 0, 100).is_ok());
        assert!(ConstructionError::check_range("rssi", 100, 0, 100).is_ok());
        assert_eq!(
            ConstructionError::check_range("rssi", 101, 0, 100),
            Err(ConstructionError::OutOfRange {
                field: "rssi",
                value: 101,
                min: 0,
                max: 100,
            })
        );
    }

    #[test]
    fn test_display_messages() {
        let err = DecodeError::Incomplete {
            expected: 14,
            actual: 3,
        };
        assert_eq!(
            err.to_string(),
            "incomplete payload: expected at least 14 bytes, got 3"
        );

        let err = DecodeError::WrongFrameType {
            expected: 0x10,
            actual: 0x90,
        };
        assert_eq!(err.to_string(), "wrong frame type: expected 0x10, got 0x90");

        let err = MalformedFrame::ChecksumMismatch {
            expected: 0x74,
            actual: 0x75,
        };
        assert_eq!(
            err.to_string(),
            "checksum mismatch: expected 0x74, got 0x75"
        );
    }

    #[test]
    fn test_layer_errors_convert_into_crate_error() {
        let err: Error = DispatchError::ConnectionClosed.into();
        assert!(matches!(err, Error::Dispatch(DispatchError::ConnectionClosed)));

        let err: Error = DecodeError::NullPayload.into();
        assert_eq!(err.to_string(), "empty payload");
    }
}
