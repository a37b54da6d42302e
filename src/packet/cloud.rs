//! Cloud data and device request frames (`0x28`, `0x2A`, `0xB8`, `0xB9`, `0xBA`)
//!
//! Path, content type and target strings are length-prefixed by one byte and
//! therefore limited to 255 bytes. They are kept as raw bytes so a decoded
//! frame re-encodes exactly; the `str` accessors decode them lossily.
//! Transport and reserved bytes are written as 0 by the constructors and
//! kept as received on decode.

use super::{
    check_payload, optional, put_optional, trailing, CloudStatus, FramePayload, FrameType,
    SendDataOptions,
};
use crate::error::{ConstructionError, DecodeError};
use bytes::{Buf, BufMut, Bytes, BytesMut};
use std::borrow::Cow;

const MAX_STRING_LEN: usize = u8::MAX as usize;

fn check_string(field: &'static str, value: &str) -> Result<Bytes, ConstructionError> {
    ConstructionError::check_range(field, value.len() as u64, 0, MAX_STRING_LEN as u64)?;
    Ok(Bytes::copy_from_slice(value.as_bytes()))
}

/// Read a string of `len` bytes, failing like a short payload if cut off
fn get_string(buf: &mut &[u8], len: usize, payload_len: usize) -> Result<Bytes, DecodeError> {
    if buf.remaining() < len {
        return Err(DecodeError::Incomplete {
            expected: payload_len - buf.remaining() + len,
            actual: payload_len,
        });
    }
    Ok(buf.copy_to_bytes(len))
}

fn put_string(buf: &mut BytesMut, value: &Bytes) {
    // Length is bounded at construction and on decode
    buf.put_u8(value.len() as u8);
    buf.put_slice(value);
}

/// Send Data Request (`0x28`): upload a file to the cloud
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendDataRequest {
    frame_id: u8,
    path: Bytes,
    content_type: Bytes,
    transport: u8,
    options: SendDataOptions,
    file_data: Option<Bytes>,
}

impl SendDataRequest {
    pub fn new(
        frame_id: u8,
        path: &str,
        content_type: &str,
        options: SendDataOptions,
        file_data: impl Into<Bytes>,
    ) -> Result<Self, ConstructionError> {
        Ok(Self {
            frame_id,
            path: check_string("path length", path)?,
            content_type: check_string("content type length", content_type)?,
            transport: 0,
            options,
            file_data: optional(file_data),
        })
    }

    pub fn path(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.path)
    }

    pub fn content_type(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.content_type)
    }

    /// Transport byte, 0 on current firmware
    pub fn transport(&self) -> u8 {
        self.transport
    }

    pub fn options(&self) -> SendDataOptions {
        self.options
    }

    pub fn file_data(&self) -> Option<&[u8]> {
        self.file_data.as_deref()
    }

    pub fn with_frame_id(mut self, frame_id: u8) -> Self {
        self.frame_id = frame_id;
        self
    }
}

impl FramePayload for SendDataRequest {
    const FRAME_TYPE: FrameType = FrameType::SendDataRequest;
    const MIN_LENGTH: usize = 6;

    fn decode(payload: &[u8]) -> Result<Self, DecodeError> {
        let mut buf = check_payload::<Self>(payload)?;
        let frame_id = buf.get_u8();
        let path_len = usize::from(buf.get_u8());
        let path = get_string(&mut buf, path_len, payload.len())?;
        // content type length, transport and options still to come
        if buf.remaining() < 3 {
            return Err(DecodeError::Incomplete {
                expected: Self::MIN_LENGTH + path_len,
                actual: payload.len(),
            });
        }
        let content_type_len = usize::from(buf.get_u8());
        let content_type = get_string(&mut buf, content_type_len, payload.len())?;
        if buf.remaining() < 2 {
            return Err(DecodeError::Incomplete {
                expected: Self::MIN_LENGTH + path_len + content_type_len,
                actual: payload.len(),
            });
        }
        let transport = buf.get_u8();
        let options = SendDataOptions::from(buf.get_u8());
        Ok(Self {
            frame_id,
            path,
            content_type,
            transport,
            options,
            file_data: trailing(buf),
        })
    }

    fn encode_body(&self, buf: &mut BytesMut) {
        buf.put_u8(self.frame_id);
        put_string(buf, &self.path);
        put_string(buf, &self.content_type);
        buf.put_u8(self.transport);
        buf.put_u8(self.options.code());
        put_optional(buf, &self.file_data);
    }

    fn frame_id(&self) -> Option<u8> {
        Some(self.frame_id)
    }
}

macro_rules! cloud_status {
    ($(#[$meta:meta])* $name:ident, $frame_type:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub struct $name {
            frame_id: u8,
            status: CloudStatus,
        }

        impl $name {
            pub fn new(frame_id: u8, status: CloudStatus) -> Self {
                Self { frame_id, status }
            }

            pub fn status(&self) -> CloudStatus {
                self.status
            }
        }

        impl FramePayload for $name {
            const FRAME_TYPE: FrameType = $frame_type;
            const MIN_LENGTH: usize = 3;

            fn decode(payload: &[u8]) -> Result<Self, DecodeError> {
                let mut buf = check_payload::<Self>(payload)?;
                Ok(Self {
                    frame_id: buf.get_u8(),
                    status: CloudStatus::from(buf.get_u8()),
                })
            }

            fn encode_body(&self, buf: &mut BytesMut) {
                buf.put_u8(self.frame_id);
                buf.put_u8(self.status.code());
            }

            fn frame_id(&self) -> Option<u8> {
                Some(self.frame_id)
            }
        }
    };
}

cloud_status! {
    /// Send Data Response (`0xB8`)
    SendDataResponse, FrameType::SendDataResponse
}

cloud_status! {
    /// Device Response Status (`0xBA`)
    DeviceResponseStatus, FrameType::DeviceResponseStatus
}

/// Device Request (`0xB9`): a request from the cloud addressed to the module
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceRequest {
    request_id: u8,
    transport: u8,
    flags: u8,
    target: Bytes,
    request_data: Option<Bytes>,
}

impl DeviceRequest {
    pub fn new(
        request_id: u8,
        flags: u8,
        target: &str,
        request_data: impl Into<Bytes>,
    ) -> Result<Self, ConstructionError> {
        Ok(Self {
            request_id,
            transport: 0,
            flags,
            target: check_string("target length", target)?,
            request_data: optional(request_data),
        })
    }

    /// ID to echo in the matching [`DeviceResponse`]
    pub fn request_id(&self) -> u8 {
        self.request_id
    }

    /// Transport byte, 0 on current firmware
    pub fn transport(&self) -> u8 {
        self.transport
    }

    pub fn flags(&self) -> u8 {
        self.flags
    }

    pub fn target(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.target)
    }

    pub fn request_data(&self) -> Option<&[u8]> {
        self.request_data.as_deref()
    }
}

impl FramePayload for DeviceRequest {
    const FRAME_TYPE: FrameType = FrameType::DeviceRequest;
    const MIN_LENGTH: usize = 5;

    fn decode(payload: &[u8]) -> Result<Self, DecodeError> {
        let mut buf = check_payload::<Self>(payload)?;
        let request_id = buf.get_u8();
        let transport = buf.get_u8();
        let flags = buf.get_u8();
        let target_len = usize::from(buf.get_u8());
        let target = get_string(&mut buf, target_len, payload.len())?;
        Ok(Self {
            request_id,
            transport,
            flags,
            target,
            request_data: trailing(buf),
        })
    }

    fn encode_body(&self, buf: &mut BytesMut) {
        buf.put_u8(self.request_id);
        buf.put_u8(self.transport);
        buf.put_u8(self.flags);
        put_string(buf, &self.target);
        put_optional(buf, &self.request_data);
    }
}

/// Device Response (`0x2A`): answer to a [`DeviceRequest`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceResponse {
    frame_id: u8,
    request_id: u8,
    reserved: u8,
    response_data: Option<Bytes>,
}

impl DeviceResponse {
    pub fn new(frame_id: u8, request_id: u8, response_data: impl Into<Bytes>) -> Self {
        Self {
            frame_id,
            request_id,
            reserved: 0,
            response_data: optional(response_data),
        }
    }

    pub fn request_id(&self) -> u8 {
        self.request_id
    }

    pub fn response_data(&self) -> Option<&[u8]> {
        self.response_data.as_deref()
    }

    pub fn with_frame_id(mut self, frame_id: u8) -> Self {
        self.frame_id = frame_id;
        self
    }
}

impl FramePayload for DeviceResponse {
    const FRAME_TYPE: FrameType = FrameType::DeviceResponse;
    const MIN_LENGTH: usize = 4;

    fn decode(payload: &[u8]) -> Result<Self, DecodeError> {
        let mut buf = check_payload::<Self>(payload)?;
        let frame_id = buf.get_u8();
        let request_id = buf.get_u8();
        let reserved = buf.get_u8();
        Ok(Self {
            frame_id,
            request_id,
            reserved,
            response_data: trailing(buf),
        })
    }

    fn encode_body(&self, buf: &mut BytesMut) {
        buf.put_u8(self.frame_id);
        buf.put_u8(self.request_id);
        buf.put_u8(self.reserved);
        put_optional(buf, &self.response_data);
    }

    fn frame_id(&self) -> Option<u8> {
        Some(self.frame_id)
    }
}
