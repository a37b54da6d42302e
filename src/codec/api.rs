//! API frame codec
//!
//! Wire format of one frame:
//!
//! ```text
//! +------+--------+--------+--------------------+----------+
//! | 0x7E | len_hi | len_lo | payload[0..len]    | checksum |
//! +------+--------+--------+--------------------+----------+
//! ```
//!
//! `len` counts the payload only (frame type byte through the last data
//! byte). In API escaped mode everything after the delimiter is byte-stuffed
//! and the length/checksum are computed over the unescaped bytes.

use super::checksum::checksum;
use super::escape::{escape_into, Unescaper};
use super::{Codec, FrameEvent, OperatingMode};
use crate::constants::{
    DEFAULT_MAX_PAYLOAD_LEN, ENVELOPE_OVERHEAD, MAX_WIRE_PAYLOAD_LEN, START_DELIMITER,
};
use crate::error::MalformedFrame;
use bytes::BytesMut;

/// Decoder state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    AwaitingDelimiter,
    LengthHigh,
    LengthLow(u8),
    Payload(usize),
    Checksum,
}

/// Streaming codec for API frames
///
/// Bytes may arrive in arbitrary chunks; state (including a pending escape)
/// is kept between calls. Corrupt frames are reported as
/// `FrameEvent::Malformed` and the codec goes back to hunting for `0x7E`,
/// so noise on the line never stops the stream.
///
/// # Example
///
/// ```
/// use xbee_api::codec::{ApiFrameCodec, Codec, FrameEvent, OperatingMode};
///
/// let mut codec = ApiFrameCodec::new(OperatingMode::Api);
/// let mut events = Vec::new();
/// codec.decode(&[0x7E, 0x00, 0x02, 0x8A, 0x06, 0x6F], |e| events.push(e));
///
/// assert!(matches!(&events[0], FrameEvent::Frame(p) if p[..] == [0x8A, 0x06]));
/// ```
#[derive(Debug)]
pub struct ApiFrameCodec {
    mode: OperatingMode,
    max_payload_len: usize,
    state: State,
    unescaper: Unescaper,
    payload: BytesMut,
    sum: u8,
}

impl ApiFrameCodec {
    /// Create a codec with the default payload limit
    pub fn new(mode: OperatingMode) -> Self {
        Self::with_max_payload(mode, DEFAULT_MAX_PAYLOAD_LEN)
    }

    /// Create a codec rejecting frames longer than `max_payload_len`
    ///
    /// The limit is capped at what the 16-bit length field can express.
    pub fn with_max_payload(mode: OperatingMode, max_payload_len: usize) -> Self {
        Self {
            mode,
            max_payload_len: max_payload_len.min(MAX_WIRE_PAYLOAD_LEN),
            state: State::AwaitingDelimiter,
            unescaper: Unescaper::new(),
            payload: BytesMut::with_capacity(256),
            sum: 0,
        }
    }

    /// Operating mode this codec frames for
    pub fn mode(&self) -> OperatingMode {
        self.mode
    }

    /// Longest payload accepted in either direction
    pub fn max_payload_len(&self) -> usize {
        self.max_payload_len
    }

    /// Whether the codec is between frames
    pub fn is_idle(&self) -> bool {
        self.state == State::AwaitingDelimiter
    }

    /// Decode `data`, collecting events into a vector
    pub fn decode_all(&mut self, data: &[u8]) -> Vec<FrameEvent> {
        let mut events = Vec::new();
        self.decode(data, |e| events.push(e));
        events
    }

    /// Drop any partial frame
    pub fn reset(&mut self) {
        self.state = State::AwaitingDelimiter;
        self.unescaper.reset();
        self.payload.clear();
        self.sum = 0;
    }

    fn begin_frame(&mut self) {
        self.reset();
        self.state = State::LengthHigh;
    }

    fn step(&mut self, byte: u8, on_event: &mut impl FnMut(FrameEvent)) {
        match self.state {
            State::AwaitingDelimiter => {
                if byte == START_DELIMITER {
                    self.begin_frame();
                }
            }
            State::LengthHigh => self.state = State::LengthLow(byte),
            State::LengthLow(high) => {
                let len = u16::from_be_bytes([high, byte]) as usize;
                if len == 0 {
                    self.reset();
                    on_event(FrameEvent::Malformed(MalformedFrame::ZeroLength));
                } else if len > self.max_payload_len {
                    self.reset();
                    on_event(FrameEvent::Malformed(MalformedFrame::Oversized {
                        len,
                        max: self.max_payload_len,
                    }));
                } else {
                    self.payload.reserve(len);
                    self.state = State::Payload(len);
                }
            }
            State::Payload(len) => {
                self.payload.extend_from_slice(&[byte]);
                self.sum = self.sum.wrapping_add(byte);
                if self.payload.len() == len {
                    self.state = State::Checksum;
                }
            }
            State::Checksum => {
                let event = if self.sum.wrapping_add(byte) == 0xFF {
                    FrameEvent::Frame(self.payload.split().freeze())
                } else {
                    FrameEvent::Malformed(MalformedFrame::ChecksumMismatch {
                        expected: 0xFF - self.sum,
                        actual: byte,
                    })
                };
                self.reset();
                on_event(event);
            }
        }
    }
}

impl Codec for ApiFrameCodec {
    fn decode(&mut self, data: &[u8], mut on_event: impl FnMut(FrameEvent)) {
        for &raw in data {
            if self.state == State::AwaitingDelimiter {
                // Noise between frames is never unescaped
                self.step(raw, &mut on_event);
                continue;
            }

            match self.mode {
                OperatingMode::Api => self.step(raw, &mut on_event),
                OperatingMode::ApiEscaped => {
                    if raw == START_DELIMITER {
                        // A literal 0x7E can only be a delimiter here
                        if let State::Payload(expected) = self.state {
                            on_event(FrameEvent::Malformed(MalformedFrame::Interrupted {
                                received: self.payload.len(),
                                expected,
                            }));
                        } else if self.state == State::Checksum {
                            on_event(FrameEvent::Malformed(MalformedFrame::Interrupted {
                                received: self.payload.len(),
                                expected: self.payload.len(),
                            }));
                        }
                        self.begin_frame();
                        continue;
                    }
                    if let Some(byte) = self.unescaper.push(raw) {
                        self.step(byte, &mut on_event);
                    }
                }
            }
        }
    }

    fn encode(&self, payload: &[u8], output: &mut Vec<u8>) -> Result<(), MalformedFrame> {
        if payload.is_empty() {
            return Err(MalformedFrame::ZeroLength);
        }
        let len = match u16::try_from(payload.len()) {
            Ok(len) if payload.len() <= self.max_payload_len => len,
            _ => {
                return Err(MalformedFrame::Oversized {
                    len: payload.len(),
                    max: self.max_payload_len,
                })
            }
        };
        output.reserve(payload.len() + ENVELOPE_OVERHEAD);
        output.push(START_DELIMITER);

        match self.mode {
            OperatingMode::Api => {
                output.extend_from_slice(&len.to_be_bytes());
                output.extend_from_slice(payload);
                output.push(checksum(payload));
            }
            OperatingMode::ApiEscaped => {
                escape_into(&len.to_be_bytes(), output);
                escape_into(payload, output);
                escape_into(&[checksum(payload)], output);
            }
        }
        Ok(())
    }
}

/// Frame `payload` for `mode` into a new buffer
///
/// Fails with `Oversized` when the payload does not fit in the 16-bit
/// length field, and with `ZeroLength` when it is empty.
pub fn encode_frame(payload: &[u8], mode: OperatingMode) -> Result<Vec<u8>, MalformedFrame> {
    let mut output = Vec::with_capacity(payload.len() + ENVELOPE_OVERHEAD);
    ApiFrameCodec::with_max_payload(mode, MAX_WIRE_PAYLOAD_LEN).encode(payload, &mut output)?;
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn frames(events: &[FrameEvent]) -> Vec<Vec<u8>> {
        events
            .iter()
            .filter_map(|e| match e {
                FrameEvent::Frame(p) => Some(p.to_vec()),
                FrameEvent::Malformed(_) => None,
            })
            .collect()
    }

    #[test]
    fn test_decode_modem_status() {
        let mut codec = ApiFrameCodec::new(OperatingMode::Api);
        let events = codec.decode_all(&[0x7E, 0x00, 0x02, 0x8A, 0x06, 0x6F]);

        assert_eq!(events, vec![FrameEvent::Frame(vec![0x8A, 0x06].into())]);
        assert!(codec.is_idle());
    }

    #[test]
    fn test_encode_modem_status() {
        assert_eq!(
            encode_frame(&[0x8A, 0x06], OperatingMode::Api).unwrap(),
            vec![0x7E, 0x00, 0x02, 0x8A, 0x06, 0x6F]
        );
    }

    #[test]
    fn test_decode_partial() {
        let mut codec = ApiFrameCodec::new(OperatingMode::Api);

        assert!(codec.decode_all(&[0x7E, 0x00]).is_empty());
        assert!(codec.decode_all(&[0x02, 0x8A]).is_empty());
        assert!(!codec.is_idle());

        let events = codec.decode_all(&[0x06, 0x6F]);
        assert_eq!(frames(&events), vec![vec![0x8A, 0x06]]);
    }

    #[test]
    fn test_decode_skips_leading_noise() {
        let mut codec = ApiFrameCodec::new(OperatingMode::Api);
        let events = codec.decode_all(&[0x00, 0x55, 0xAA, 0x7E, 0x00, 0x02, 0x8A, 0x06, 0x6F]);
        assert_eq!(frames(&events), vec![vec![0x8A, 0x06]]);
    }

    #[test]
    fn test_decode_checksum_error_then_recovers() {
        let mut codec = ApiFrameCodec::new(OperatingMode::Api);
        let mut data = vec![0x7E, 0x00, 0x02, 0x8A, 0x06, 0x75];
        data.extend_from_slice(&[0x7E, 0x00, 0x02, 0x8A, 0x02, 0x73]);

        let events = codec.decode_all(&data);
        assert_eq!(
            events[0],
            FrameEvent::Malformed(MalformedFrame::ChecksumMismatch {
                expected: 0x6F,
                actual: 0x75,
            })
        );
        assert_eq!(frames(&events), vec![vec![0x8A, 0x02]]);
    }

    #[test]
    fn test_decode_zero_length() {
        let mut codec = ApiFrameCodec::new(OperatingMode::Api);
        let events = codec.decode_all(&[0x7E, 0x00, 0x00]);
        assert_eq!(events, vec![FrameEvent::Malformed(MalformedFrame::ZeroLength)]);
        assert!(codec.is_idle());
    }

    #[test]
    fn test_decode_oversized() {
        let mut codec = ApiFrameCodec::with_max_payload(OperatingMode::Api, 8);
        let events = codec.decode_all(&[0x7E, 0x00, 0x09]);
        assert_eq!(
            events,
            vec![FrameEvent::Malformed(MalformedFrame::Oversized { len: 9, max: 8 })]
        );
    }

    #[test]
    fn test_encode_refuses_payload_beyond_length_field() {
        let payload = vec![0x08; MAX_WIRE_PAYLOAD_LEN + 1];
        assert_eq!(
            encode_frame(&payload, OperatingMode::Api),
            Err(MalformedFrame::Oversized {
                len: MAX_WIRE_PAYLOAD_LEN + 1,
                max: MAX_WIRE_PAYLOAD_LEN,
            })
        );

        // Largest payload still gets an exact length field
        let payload = vec![0x08; MAX_WIRE_PAYLOAD_LEN];
        let encoded = encode_frame(&payload, OperatingMode::Api).unwrap();
        assert_eq!(&encoded[1..3], &[0xFF, 0xFF]);
        assert_eq!(encoded.len(), MAX_WIRE_PAYLOAD_LEN + ENVELOPE_OVERHEAD);
    }

    #[test]
    fn test_encode_respects_configured_limit() {
        let codec = ApiFrameCodec::with_max_payload(OperatingMode::ApiEscaped, 4);
        let mut output = vec![0xAA];

        assert_eq!(
            codec.encode(&[0x08, 0x01, 0x4E, 0x49, 0x00], &mut output),
            Err(MalformedFrame::Oversized { len: 5, max: 4 })
        );
        assert_eq!(codec.encode(&[], &mut output), Err(MalformedFrame::ZeroLength));
        assert_eq!(output, vec![0xAA]);
    }

    #[test]
    fn test_limit_capped_at_length_field() {
        let codec = ApiFrameCodec::with_max_payload(OperatingMode::Api, 100_000);
        assert_eq!(codec.max_payload_len(), MAX_WIRE_PAYLOAD_LEN);
    }

    #[test]
    fn test_delimiter_is_data_in_unescaped_mode() {
        // 0x7E inside the payload is legal without escaping
        let payload = [0x90, 0x7E];
        let encoded = encode_frame(&payload, OperatingMode::Api).unwrap();
        let mut codec = ApiFrameCodec::new(OperatingMode::Api);
        assert_eq!(frames(&codec.decode_all(&encoded)), vec![payload.to_vec()]);
    }

    #[test]
    fn test_escaped_encode() {
        // Payload containing 0x11 and a checksum needing no escape
        let payload = [0x08, 0x01, 0x11];
        let encoded = encode_frame(&payload, OperatingMode::ApiEscaped).unwrap();
        assert_eq!(encoded[0], 0x7E);
        assert_eq!(&encoded[1..3], &[0x00, 0x03]);
        assert_eq!(&encoded[3..7], &[0x08, 0x01, 0x7D, 0x31]);
        assert_eq!(encoded[7], checksum(&payload));
    }

    #[test]
    fn test_escaped_length_and_checksum() {
        // Length 0x11 must itself be escaped
        let payload: Vec<u8> = (0..0x11u8).map(|i| i + 0x20).collect();
        let encoded = encode_frame(&payload, OperatingMode::ApiEscaped).unwrap();
        assert_eq!(&encoded[1..4], &[0x00, 0x7D, 0x31]);

        let mut codec = ApiFrameCodec::new(OperatingMode::ApiEscaped);
        assert_eq!(frames(&codec.decode_all(&encoded)), vec![payload]);
    }

    #[test]
    fn test_escaped_split_across_reads() {
        let payload = [0x10, 0x7E, 0x7D, 0x13];
        let encoded = encode_frame(&payload, OperatingMode::ApiEscaped).unwrap();
        let mut codec = ApiFrameCodec::new(OperatingMode::ApiEscaped);

        let mut events = Vec::new();
        for byte in &encoded {
            codec.decode(std::slice::from_ref(byte), |e| events.push(e));
        }
        assert_eq!(frames(&events), vec![payload.to_vec()]);
    }

    #[test]
    fn test_escaped_delimiter_interrupts_frame() {
        let mut codec = ApiFrameCodec::new(OperatingMode::ApiEscaped);
        let mut data = vec![0x7E, 0x00, 0x05, 0x90, 0x01];
        data.extend_from_slice(&[0x7E, 0x00, 0x02, 0x8A, 0x06, 0x6F]);

        let events = codec.decode_all(&data);
        assert_eq!(
            events[0],
            FrameEvent::Malformed(MalformedFrame::Interrupted {
                received: 2,
                expected: 5,
            })
        );
        assert_eq!(frames(&events), vec![vec![0x8A, 0x06]]);
    }

    proptest! {
        #[test]
        fn prop_frames_survive_arbitrary_chunking(
            payloads in proptest::collection::vec(proptest::collection::vec(any::<u8>(), 1..64), 1..6),
            escaped in any::<bool>(),
            chunk in 1usize..16,
        ) {
            let mode = if escaped { OperatingMode::ApiEscaped } else { OperatingMode::Api };
            let mut wire = Vec::new();
            for p in &payloads {
                wire.extend_from_slice(&encode_frame(p, mode).unwrap());
            }

            let mut codec = ApiFrameCodec::new(mode);
            let mut events = Vec::new();
            for piece in wire.chunks(chunk) {
                codec.decode(piece, |e| events.push(e));
            }

            prop_assert_eq!(frames(&events), payloads);
            prop_assert!(codec.is_idle());
        }
    }
}
