//! Modem Status (`0x8A`) and Frame Error (`0xFE`)

use super::{check_payload, FrameErrorCode, FramePayload, FrameType, ModemStatusEvent};
use crate::error::DecodeError;
use bytes::{Buf, BufMut, BytesMut};

/// Modem Status (`0x8A`), sent unsolicited on resets and network events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModemStatus {
    status: ModemStatusEvent,
}

impl ModemStatus {
    pub fn new(status: ModemStatusEvent) -> Self {
        Self { status }
    }

    pub fn status(&self) -> ModemStatusEvent {
        self.status
    }
}

impl FramePayload for ModemStatus {
    const FRAME_TYPE: FrameType = FrameType::ModemStatus;
    const MIN_LENGTH: usize = 2;

    fn decode(payload: &[u8]) -> Result<Self, DecodeError> {
        let mut buf = check_payload::<Self>(payload)?;
        Ok(Self {
            status: ModemStatusEvent::from(buf.get_u8()),
        })
    }

    fn encode_body(&self, buf: &mut BytesMut) {
        buf.put_u8(self.status.code());
    }
}

/// Frame Error (`0xFE`), reported by the module for a frame it rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameError {
    error: FrameErrorCode,
}

impl FrameError {
    pub fn new(error: FrameErrorCode) -> Self {
        Self { error }
    }

    pub fn error(&self) -> FrameErrorCode {
        self.error
    }
}

impl FramePayload for FrameError {
    const FRAME_TYPE: FrameType = FrameType::FrameError;
    const MIN_LENGTH: usize = 2;

    fn decode(payload: &[u8]) -> Result<Self, DecodeError> {
        let mut buf = check_payload::<Self>(payload)?;
        Ok(Self {
            error: FrameErrorCode::from(buf.get_u8()),
        })
    }

    fn encode_body(&self, buf: &mut BytesMut) {
        buf.put_u8(self.error.code());
    }
}
