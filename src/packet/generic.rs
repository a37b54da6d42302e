//! Generic frame (`0xFF`)

use super::{check_payload, optional, put_optional, trailing, FramePayload, FrameType};
use crate::error::DecodeError;
use bytes::{Bytes, BytesMut};

/// Opaque frame with no fixed fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generic {
    data: Option<Bytes>,
}

impl Generic {
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self {
            data: optional(data),
        }
    }

    pub fn data(&self) -> Option<&[u8]> {
        self.data.as_deref()
    }
}

impl FramePayload for Generic {
    const FRAME_TYPE: FrameType = FrameType::Generic;
    const MIN_LENGTH: usize = 1;

    fn decode(payload: &[u8]) -> Result<Self, DecodeError> {
        let body = check_payload::<Self>(payload)?;
        Ok(Self {
            data: trailing(body),
        })
    }

    fn encode_body(&self, buf: &mut BytesMut) {
        put_optional(buf, &self.data);
    }
}
