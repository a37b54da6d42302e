//! Local and remote AT command frames (`0x08`, `0x09`, `0x17`, `0x88`, `0x97`)

use super::{
    check_payload, optional, put_optional, trailing, Address16, Address64, AtCommandStatus,
    FramePayload, FrameType, IoSample, SampleLayout,
};
use crate::error::{ConstructionError, DecodeError};
use bytes::{Buf, BufMut, Bytes, BytesMut};
use std::fmt;

/// Two-character AT command name (`NI`, `D0`, `IS`, ...)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AtCommandName([u8; 2]);

impl AtCommandName {
    /// Validate a command name typed by a caller
    pub fn new(name: &str) -> Result<Self, ConstructionError> {
        match name.as_bytes() {
            &[a, b] if a.is_ascii_graphic() && b.is_ascii_graphic() => Ok(Self([a, b])),
            _ => Err(ConstructionError::InvalidAtCommand(name.to_string())),
        }
    }

    /// Command name as found on the wire (not validated)
    pub const fn from_bytes(bytes: [u8; 2]) -> Self {
        Self(bytes)
    }

    pub const fn as_bytes(&self) -> [u8; 2] {
        self.0
    }
}

impl fmt::Display for AtCommandName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.0[0] as char, self.0[1] as char)
    }
}

fn get_command(buf: &mut &[u8]) -> AtCommandName {
    AtCommandName([buf.get_u8(), buf.get_u8()])
}

macro_rules! at_request {
    ($(#[$meta:meta])* $name:ident, $frame_type:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq)]
        pub struct $name {
            frame_id: u8,
            command: AtCommandName,
            parameter: Option<Bytes>,
        }

        impl $name {
            /// An empty `parameter` reads the setting instead of writing it
            pub fn new(frame_id: u8, command: AtCommandName, parameter: impl Into<Bytes>) -> Self {
                Self {
                    frame_id,
                    command,
                    parameter: optional(parameter),
                }
            }

            pub fn command(&self) -> AtCommandName {
                self.command
            }

            pub fn parameter(&self) -> Option<&[u8]> {
                self.parameter.as_deref()
            }

            pub fn with_frame_id(mut self, frame_id: u8) -> Self {
                self.frame_id = frame_id;
                self
            }

            pub fn with_parameter(mut self, parameter: impl Into<Bytes>) -> Self {
                self.parameter = optional(parameter);
                self
            }
        }

        impl FramePayload for $name {
            const FRAME_TYPE: FrameType = $frame_type;
            const MIN_LENGTH: usize = 4;

            fn decode(payload: &[u8]) -> Result<Self, DecodeError> {
                let mut buf = check_payload::<Self>(payload)?;
                let frame_id = buf.get_u8();
                let command = get_command(&mut buf);
                Ok(Self {
                    frame_id,
                    command,
                    parameter: trailing(buf),
                })
            }

            fn encode_body(&self, buf: &mut BytesMut) {
                buf.put_u8(self.frame_id);
                buf.put_slice(&self.command.0);
                put_optional(buf, &self.parameter);
            }

            fn frame_id(&self) -> Option<u8> {
                Some(self.frame_id)
            }
        }
    };
}

at_request! {
    /// AT Command (`0x08`): read or set a local setting, applied immediately
    AtCommand, FrameType::AtCommand
}

at_request! {
    /// AT Command Queue (`0x09`): set a local setting, applied on `AC`
    AtCommandQueue, FrameType::AtCommandQueue
}

/// AT Command Response (`0x88`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtCommandResponse {
    frame_id: u8,
    command: AtCommandName,
    status: AtCommandStatus,
    value: Option<Bytes>,
}

impl AtCommandResponse {
    pub fn new(
        frame_id: u8,
        command: AtCommandName,
        status: AtCommandStatus,
        value: impl Into<Bytes>,
    ) -> Self {
        Self {
            frame_id,
            command,
            status,
            value: optional(value),
        }
    }

    pub fn command(&self) -> AtCommandName {
        self.command
    }

    pub fn status(&self) -> AtCommandStatus {
        self.status
    }

    pub fn value(&self) -> Option<&[u8]> {
        self.value.as_deref()
    }

    /// IO sample carried by an `IS` response
    pub fn io_sample(&self) -> Option<IoSample> {
        IoSample::decode_with(SampleLayout::Counted, self.value.as_deref()?)
    }
}

impl FramePayload for AtCommandResponse {
    const FRAME_TYPE: FrameType = FrameType::AtCommandResponse;
    const MIN_LENGTH: usize = 5;

    fn decode(payload: &[u8]) -> Result<Self, DecodeError> {
        let mut buf = check_payload::<Self>(payload)?;
        let frame_id = buf.get_u8();
        let command = get_command(&mut buf);
        let status = AtCommandStatus::from(buf.get_u8());
        Ok(Self {
            frame_id,
            command,
            status,
            value: trailing(buf),
        })
    }

    fn encode_body(&self, buf: &mut BytesMut) {
        buf.put_u8(self.frame_id);
        buf.put_slice(&self.command.0);
        buf.put_u8(self.status.code());
        put_optional(buf, &self.value);
    }

    fn frame_id(&self) -> Option<u8> {
        Some(self.frame_id)
    }
}

/// Remote AT Command Request (`0x17`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteAtCommand {
    frame_id: u8,
    addr64: Address64,
    addr16: Address16,
    options: u8,
    command: AtCommandName,
    parameter: Option<Bytes>,
}

impl RemoteAtCommand {
    /// `options` is a combination of [`super::options::remote_at`] flags
    pub fn new(
        frame_id: u8,
        addr64: Address64,
        addr16: Address16,
        options: u8,
        command: AtCommandName,
        parameter: impl Into<Bytes>,
    ) -> Self {
        Self {
            frame_id,
            addr64,
            addr16,
            options,
            command,
            parameter: optional(parameter),
        }
    }

    pub fn addr64(&self) -> Address64 {
        self.addr64
    }

    pub fn addr16(&self) -> Address16 {
        self.addr16
    }

    pub fn options(&self) -> u8 {
        self.options
    }

    pub fn command(&self) -> AtCommandName {
        self.command
    }

    pub fn parameter(&self) -> Option<&[u8]> {
        self.parameter.as_deref()
    }

    pub fn with_frame_id(mut self, frame_id: u8) -> Self {
        self.frame_id = frame_id;
        self
    }
}

impl FramePayload for RemoteAtCommand {
    const FRAME_TYPE: FrameType = FrameType::RemoteAtCommand;
    const MIN_LENGTH: usize = 15;

    fn decode(payload: &[u8]) -> Result<Self, DecodeError> {
        let mut buf = check_payload::<Self>(payload)?;
        let frame_id = buf.get_u8();
        let addr64 = Address64::new(buf.get_u64());
        let addr16 = Address16::new(buf.get_u16());
        let options = buf.get_u8();
        let command = get_command(&mut buf);
        Ok(Self {
            frame_id,
            addr64,
            addr16,
            options,
            command,
            parameter: trailing(buf),
        })
    }

    fn encode_body(&self, buf: &mut BytesMut) {
        buf.put_u8(self.frame_id);
        buf.put_u64(self.addr64.value());
        buf.put_u16(self.addr16.value());
        buf.put_u8(self.options);
        buf.put_slice(&self.command.0);
        put_optional(buf, &self.parameter);
    }

    fn frame_id(&self) -> Option<u8> {
        Some(self.frame_id)
    }

    fn is_broadcast(&self) -> bool {
        self.addr64.is_broadcast() || self.addr16.is_broadcast()
    }
}

/// Remote AT Command Response (`0x97`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteAtCommandResponse {
    frame_id: u8,
    addr64: Address64,
    addr16: Address16,
    command: AtCommandName,
    status: AtCommandStatus,
    value: Option<Bytes>,
}

impl RemoteAtCommandResponse {
    pub fn new(
        frame_id: u8,
        addr64: Address64,
        addr16: Address16,
        command: AtCommandName,
        status: AtCommandStatus,
        value: impl Into<Bytes>,
    ) -> Self {
        Self {
            frame_id,
            addr64,
            addr16,
            command,
            status,
            value: optional(value),
        }
    }

    pub fn addr64(&self) -> Address64 {
        self.addr64
    }

    pub fn addr16(&self) -> Address16 {
        self.addr16
    }

    pub fn command(&self) -> AtCommandName {
        self.command
    }

    pub fn status(&self) -> AtCommandStatus {
        self.status
    }

    pub fn value(&self) -> Option<&[u8]> {
        self.value.as_deref()
    }
}

impl FramePayload for RemoteAtCommandResponse {
    const FRAME_TYPE: FrameType = FrameType::RemoteAtCommandResponse;
    const MIN_LENGTH: usize = 15;

    fn decode(payload: &[u8]) -> Result<Self, DecodeError> {
        let mut buf = check_payload::<Self>(payload)?;
        let frame_id = buf.get_u8();
        let addr64 = Address64::new(buf.get_u64());
        let addr16 = Address16::new(buf.get_u16());
        let command = get_command(&mut buf);
        let status = AtCommandStatus::from(buf.get_u8());
        Ok(Self {
            frame_id,
            addr64,
            addr16,
            command,
            status,
            value: trailing(buf),
        })
    }

    fn encode_body(&self, buf: &mut BytesMut) {
        buf.put_u8(self.frame_id);
        buf.put_u64(self.addr64.value());
        buf.put_u16(self.addr16.value());
        buf.put_slice(&self.command.0);
        buf.put_u8(self.status.code());
        put_optional(buf, &self.value);
    }

    fn frame_id(&self) -> Option<u8> {
        Some(self.frame_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::hex::parse_hex;

    #[test]
    fn test_command_name_validation() {
        assert_eq!(AtCommandName::new("NI").unwrap().to_string(), "NI");
        assert!(matches!(
            AtCommandName::new("N"),
            Err(ConstructionError::InvalidAtCommand(_))
        ));
        assert!(AtCommandName::new("NID").is_err());
        assert!(AtCommandName::new("N\u{e9}").is_err());
        assert!(AtCommandName::new("N ").is_err());
    }

    #[test]
    fn test_at_command_wire_bytes() {
        let cmd = AtCommand::new(0x52, AtCommandName::new("NJ").unwrap(), Vec::new());
        assert_eq!(cmd.to_payload()[..], parse_hex("08 52 4E 4A").unwrap()[..]);
        assert_eq!(AtCommand::decode(&cmd.to_payload()).unwrap(), cmd);
        assert_eq!(cmd.parameter(), None);
    }

    #[test]
    fn test_at_command_with_parameter() {
        let payload = parse_hex("08 01 4E 49 41 42").unwrap();
        let cmd = AtCommand::decode(&payload).unwrap();
        assert_eq!(cmd.frame_id(), Some(1));
        assert_eq!(cmd.command().to_string(), "NI");
        assert_eq!(cmd.parameter(), Some(&b"AB"[..]));
        assert_eq!(cmd.to_payload()[..], payload[..]);
    }

    #[test]
    fn test_queue_rejects_plain_at_type() {
        let payload = parse_hex("08 01 4E 49").unwrap();
        assert_eq!(
            AtCommandQueue::decode(&payload),
            Err(DecodeError::WrongFrameType {
                expected: 0x09,
                actual: 0x08
            })
        );
    }

    #[test]
    fn test_at_response_roundtrip() {
        let payload = parse_hex("88 01 4E 49 00 20").unwrap();
        let rsp = AtCommandResponse::decode(&payload).unwrap();
        assert_eq!(rsp.status(), AtCommandStatus::Ok);
        assert_eq!(rsp.value(), Some(&b" "[..]));
        assert_eq!(rsp.to_payload()[..], payload[..]);
    }

    #[test]
    fn test_at_response_unknown_status() {
        let rsp = AtCommandResponse::decode(&parse_hex("88 01 4E 49 09").unwrap()).unwrap();
        assert_eq!(rsp.status(), AtCommandStatus::Unknown(0x09));
        assert_eq!(rsp.value(), None);
    }

    #[test]
    fn test_at_response_incomplete() {
        assert_eq!(
            AtCommandResponse::decode(&parse_hex("88 01 4E 49").unwrap()),
            Err(DecodeError::Incomplete {
                expected: 5,
                actual: 4
            })
        );
    }

    #[test]
    fn test_is_response_sample() {
        let rsp = AtCommandResponse::decode(&parse_hex("88 01 49 53 00 01 00 01 00 00 01").unwrap())
            .unwrap();
        let sample = rsp.io_sample().unwrap();
        assert_eq!(sample.digital_mask(), 0x0001);
    }

    #[test]
    fn test_remote_at_roundtrip_and_broadcast() {
        let cmd = RemoteAtCommand::new(
            3,
            Address64::BROADCAST,
            Address16::UNKNOWN,
            crate::packet::options::remote_at::APPLY_CHANGES,
            AtCommandName::new("D1").unwrap(),
            vec![0x05],
        );
        assert!(cmd.is_broadcast());
        let payload = cmd.to_payload();
        assert_eq!(payload.len(), 16);
        assert_eq!(RemoteAtCommand::decode(&payload).unwrap(), cmd);

        let unicast = RemoteAtCommand::new(
            3,
            Address64::new(0x0013_A200_4052_2BAA),
            Address16::UNKNOWN,
            0,
            AtCommandName::new("D1").unwrap(),
            Vec::new(),
        );
        assert!(!unicast.is_broadcast());
    }

    #[test]
    fn test_remote_at_response_roundtrip() {
        let payload =
            parse_hex("97 05 00 13 A2 00 40 52 2B AA 7D 84 53 4C 00 40 52 2B AA").unwrap();
        let rsp = RemoteAtCommandResponse::decode(&payload).unwrap();
        assert_eq!(rsp.frame_id(), Some(5));
        assert_eq!(rsp.addr16(), Address16::new(0x7D84));
        assert_eq!(rsp.command().to_string(), "SL");
        assert_eq!(rsp.status(), AtCommandStatus::Ok);
        assert_eq!(rsp.value().map(<[u8]>::len), Some(4));
        assert_eq!(rsp.to_payload()[..], payload[..]);
        assert!(!rsp.is_broadcast());
    }
}
