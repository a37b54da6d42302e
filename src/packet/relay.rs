//! User data relay frames (`0x2D`, `0xAD`)

use super::{
    check_payload, optional, put_optional, trailing, FramePayload, FrameType, RelayInterface,
};
use crate::error::DecodeError;
use bytes::{Buf, BufMut, Bytes, BytesMut};

/// User Data Relay (`0x2D`): forward data to another local interface
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserDataRelay {
    frame_id: u8,
    dest_interface: RelayInterface,
    data: Option<Bytes>,
}

impl UserDataRelay {
    pub fn new(frame_id: u8, dest_interface: RelayInterface, data: impl Into<Bytes>) -> Self {
        Self {
            frame_id,
            dest_interface,
            data: optional(data),
        }
    }

    pub fn dest_interface(&self) -> RelayInterface {
        self.dest_interface
    }

    pub fn data(&self) -> Option<&[u8]> {
        self.data.as_deref()
    }

    pub fn with_frame_id(mut self, frame_id: u8) -> Self {
        self.frame_id = frame_id;
        self
    }
}

impl FramePayload for UserDataRelay {
    const FRAME_TYPE: FrameType = FrameType::UserDataRelay;
    const MIN_LENGTH: usize = 3;

    fn decode(payload: &[u8]) -> Result<Self, DecodeError> {
        let mut buf = check_payload::<Self>(payload)?;
        Ok(Self {
            frame_id: buf.get_u8(),
            dest_interface: RelayInterface::from(buf.get_u8()),
            data: trailing(buf),
        })
    }

    fn encode_body(&self, buf: &mut BytesMut) {
        buf.put_u8(self.frame_id);
        buf.put_u8(self.dest_interface.code());
        put_optional(buf, &self.data);
    }

    fn frame_id(&self) -> Option<u8> {
        Some(self.frame_id)
    }
}

/// User Data Relay Output (`0xAD`): data relayed from another interface
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserDataRelayOutput {
    source_interface: RelayInterface,
    data: Option<Bytes>,
}

impl UserDataRelayOutput {
    pub fn new(source_interface: RelayInterface, data: impl Into<Bytes>) -> Self {
        Self {
            source_interface,
            data: optional(data),
        }
    }

    pub fn source_interface(&self) -> RelayInterface {
        self.source_interface
    }

    pub fn data(&self) -> Option<&[u8]> {
        self.data.as_deref()
    }
}

impl FramePayload for UserDataRelayOutput {
    const FRAME_TYPE: FrameType = FrameType::UserDataRelayOutput;
    const MIN_LENGTH: usize = 2;

    fn decode(payload: &[u8]) -> Result<Self, DecodeError> {
        let mut buf = check_payload::<Self>(payload)?;
        Ok(Self {
            source_interface: RelayInterface::from(buf.get_u8()),
            data: trailing(buf),
        })
    }

    fn encode_body(&self, buf: &mut BytesMut) {
        buf.put_u8(self.source_interface.code());
        put_optional(buf, &self.data);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_data_relay() {
        let relay = UserDataRelay::new(1, RelayInterface::MicroPython, b"hi".to_vec());
        let payload = relay.to_payload();
        assert_eq!(payload[..], [0x2D, 0x01, 0x02, b'h', b'i']);
        assert_eq!(UserDataRelay::decode(&payload).unwrap(), relay);
    }

    #[test]
    fn test_user_data_relay_output() {
        let out = UserDataRelayOutput::decode(&[0xAD, 0x01]).unwrap();
        assert_eq!(out.source_interface(), RelayInterface::Bluetooth);
        assert_eq!(out.data(), None);
        assert_eq!(out.frame_id(), None);
    }
}
