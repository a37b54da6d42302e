//! 802.15.4 (legacy) transmit and receive frames
//!
//! `0x00`/`0x01` transmit requests, the `0x89` status and the
//! `0x80`–`0x83` receive indicators. Each comes in a 64-bit and a 16-bit
//! address flavour with otherwise identical layout.

use super::options::receive;
use super::{
    check_payload, optional, put_optional, trailing, Address16, Address64, DeliveryStatus,
    FramePayload, FrameType, IoSample, SampleLayout,
};
use crate::error::{ConstructionError, DecodeError};
use bytes::{Buf, BufMut, Bytes, BytesMut};

/// Largest RSSI a legacy receive frame reports (-100 dBm)
pub const MAX_RSSI: u8 = 100;

fn check_rssi(rssi: u8) -> Result<(), ConstructionError> {
    ConstructionError::check_range("rssi", u64::from(rssi), 0, u64::from(MAX_RSSI))
}

/// Read/write an address of either width through the same macro
trait WireAddress: Copy {
    const LEN: usize;
    fn get(buf: &mut &[u8]) -> Self;
    fn put(self, buf: &mut BytesMut);
}

impl WireAddress for Address64 {
    const LEN: usize = 8;

    fn get(buf: &mut &[u8]) -> Self {
        Address64::new(buf.get_u64())
    }

    fn put(self, buf: &mut BytesMut) {
        buf.put_u64(self.value());
    }
}

impl WireAddress for Address16 {
    const LEN: usize = 2;

    fn get(buf: &mut &[u8]) -> Self {
        Address16::new(buf.get_u16())
    }

    fn put(self, buf: &mut BytesMut) {
        buf.put_u16(self.value());
    }
}

macro_rules! legacy_tx {
    ($(#[$meta:meta])* $name:ident, $addr:ty, $frame_type:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq)]
        pub struct $name {
            frame_id: u8,
            addr: $addr,
            options: u8,
            rf_data: Option<Bytes>,
        }

        impl $name {
            /// `options` is a combination of [`super::options::transmit`] flags
            pub fn new(frame_id: u8, addr: $addr, options: u8, rf_data: impl Into<Bytes>) -> Self {
                Self {
                    frame_id,
                    addr,
                    options,
                    rf_data: optional(rf_data),
                }
            }

            /// Destination address
            pub fn addr(&self) -> $addr {
                self.addr
            }

            pub fn options(&self) -> u8 {
                self.options
            }

            pub fn rf_data(&self) -> Option<&[u8]> {
                self.rf_data.as_deref()
            }

            pub fn with_frame_id(mut self, frame_id: u8) -> Self {
                self.frame_id = frame_id;
                self
            }
        }

        impl FramePayload for $name {
            const FRAME_TYPE: FrameType = $frame_type;
            const MIN_LENGTH: usize = 3 + <$addr as WireAddress>::LEN;

            fn decode(payload: &[u8]) -> Result<Self, DecodeError> {
                let mut buf = check_payload::<Self>(payload)?;
                Ok(Self {
                    frame_id: buf.get_u8(),
                    addr: <$addr as WireAddress>::get(&mut buf),
                    options: buf.get_u8(),
                    rf_data: trailing(buf),
                })
            }

            fn encode_body(&self, buf: &mut BytesMut) {
                buf.put_u8(self.frame_id);
                self.addr.put(buf);
                buf.put_u8(self.options);
                put_optional(buf, &self.rf_data);
            }

            fn frame_id(&self) -> Option<u8> {
                Some(self.frame_id)
            }

            fn is_broadcast(&self) -> bool {
                self.addr.is_broadcast()
            }
        }
    };
}

legacy_tx! {
    /// TX Request, 64-bit address (`0x00`)
    Tx64Request, Address64, FrameType::Tx64Request
}

legacy_tx! {
    /// TX Request, 16-bit address (`0x01`)
    Tx16Request, Address16, FrameType::Tx16Request
}

/// TX Status (`0x89`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxStatus {
    frame_id: u8,
    status: DeliveryStatus,
}

impl TxStatus {
    pub fn new(frame_id: u8, status: DeliveryStatus) -> Self {
        Self { frame_id, status }
    }

    pub fn status(&self) -> DeliveryStatus {
        self.status
    }
}

impl FramePayload for TxStatus {
    const FRAME_TYPE: FrameType = FrameType::TxStatus;
    const MIN_LENGTH: usize = 3;

    fn decode(payload: &[u8]) -> Result<Self, DecodeError> {
        let mut buf = check_payload::<Self>(payload)?;
        Ok(Self {
            frame_id: buf.get_u8(),
            status: DeliveryStatus::from(buf.get_u8()),
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

macro_rules! legacy_rx {
    ($(#[$meta:meta])* $name:ident, $addr:ty, $frame_type:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq)]
        pub struct $name {
            addr: $addr,
            rssi: u8,
            options: u8,
            rf_data: Option<Bytes>,
        }

        impl $name {
            /// `rssi` is the received signal strength as -dBm, `0..=100`
            pub fn new(
                addr: $addr,
                rssi: u8,
                options: u8,
                rf_data: impl Into<Bytes>,
            ) -> Result<Self, ConstructionError> {
                check_rssi(rssi)?;
                Ok(Self {
                    addr,
                    rssi,
                    options,
                    rf_data: optional(rf_data),
                })
            }

            /// Sender's address
            pub fn addr(&self) -> $addr {
                self.addr
            }

            pub fn rssi(&self) -> u8 {
                self.rssi
            }

            pub fn options(&self) -> u8 {
                self.options
            }

            pub fn rf_data(&self) -> Option<&[u8]> {
                self.rf_data.as_deref()
            }
        }

        impl FramePayload for $name {
            const FRAME_TYPE: FrameType = $frame_type;
            const MIN_LENGTH: usize = 3 + <$addr as WireAddress>::LEN;

            fn decode(payload: &[u8]) -> Result<Self, DecodeError> {
                let mut buf = check_payload::<Self>(payload)?;
                Ok(Self {
                    addr: <$addr as WireAddress>::get(&mut buf),
                    rssi: buf.get_u8(),
                    options: buf.get_u8(),
                    rf_data: trailing(buf),
                })
            }

            fn encode_body(&self, buf: &mut BytesMut) {
                self.addr.put(buf);
                buf.put_u8(self.rssi);
                buf.put_u8(self.options);
                put_optional(buf, &self.rf_data);
            }

            fn is_broadcast(&self) -> bool {
                receive::is_broadcast(self.options)
            }
        }
    };
}

legacy_rx! {
    /// RX Packet, 64-bit address (`0x80`)
    Rx64, Address64, FrameType::Rx64
}

legacy_rx! {
    /// RX Packet, 16-bit address (`0x81`)
    Rx16, Address16, FrameType::Rx16
}

macro_rules! legacy_rx_io {
    ($(#[$meta:meta])* $name:ident, $addr:ty, $frame_type:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq)]
        pub struct $name {
            addr: $addr,
            rssi: u8,
            options: u8,
            sample_data: Option<Bytes>,
            io_sample: Option<IoSample>,
        }

        impl $name {
            pub fn new(
                addr: $addr,
                rssi: u8,
                options: u8,
                sample_data: impl Into<Bytes>,
            ) -> Result<Self, ConstructionError> {
                check_rssi(rssi)?;
                let sample_data = optional(sample_data);
                Ok(Self {
                    addr,
                    rssi,
                    options,
                    io_sample: parse_sample(&sample_data),
                    sample_data,
                })
            }

            pub fn addr(&self) -> $addr {
                self.addr
            }

            pub fn rssi(&self) -> u8 {
                self.rssi
            }

            pub fn options(&self) -> u8 {
                self.options
            }

            /// Raw sample block (count byte and channel indicator included)
            pub fn sample_data(&self) -> Option<&[u8]> {
                self.sample_data.as_deref()
            }

            /// First sample of the block
            pub fn io_sample(&self) -> Option<&IoSample> {
                self.io_sample.as_ref()
            }

            pub fn with_sample_data(mut self, sample_data: impl Into<Bytes>) -> Self {
                self.sample_data = optional(sample_data);
                self.io_sample = parse_sample(&self.sample_data);
                self
            }
        }

        impl FramePayload for $name {
            const FRAME_TYPE: FrameType = $frame_type;
            const MIN_LENGTH: usize = 3 + <$addr as WireAddress>::LEN;

            fn decode(payload: &[u8]) -> Result<Self, DecodeError> {
                let mut buf = check_payload::<Self>(payload)?;
                let addr = <$addr as WireAddress>::get(&mut buf);
                let rssi = buf.get_u8();
                let options = buf.get_u8();
                let sample_data = trailing(buf);
                Ok(Self {
                    addr,
                    rssi,
                    options,
                    io_sample: parse_sample(&sample_data),
                    sample_data,
                })
            }

            fn encode_body(&self, buf: &mut BytesMut) {
                self.addr.put(buf);
                buf.put_u8(self.rssi);
                buf.put_u8(self.options);
                put_optional(buf, &self.sample_data);
            }

            fn is_broadcast(&self) -> bool {
                receive::is_broadcast(self.options)
            }
        }
    };
}

fn parse_sample(data: &Option<Bytes>) -> Option<IoSample> {
    IoSample::decode_with(SampleLayout::Legacy, data.as_deref()?)
}

legacy_rx_io! {
    /// IO Data Sample RX, 64-bit address (`0x82`)
    Rx64Io, Address64, FrameType::Rx64Io
}

legacy_rx_io! {
    /// IO Data Sample RX, 16-bit address (`0x83`)
    Rx16Io, Address16, FrameType::Rx16Io
}
