//! Receive indicator frames (`0x90`, `0x91`, `0x92`)

use super::options::receive;
use super::{
    check_payload, optional, put_optional, trailing, Address16, Address64, FramePayload,
    FrameType, IoSample, SampleLayout,
};
use crate::error::DecodeError;
use bytes::{Buf, BufMut, Bytes, BytesMut};

/// Receive Packet (`0x90`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceivePacket {
    addr64: Address64,
    addr16: Address16,
    options: u8,
    rf_data: Option<Bytes>,
}

impl ReceivePacket {
    /// `options` is a combination of [`super::options::receive`] flags
    pub fn new(addr64: Address64, addr16: Address16, options: u8, rf_data: impl Into<Bytes>) -> Self {
        Self {
            addr64,
            addr16,
            options,
            rf_data: optional(rf_data),
        }
    }

    /// Sender's 64-bit address
    pub fn addr64(&self) -> Address64 {
        self.addr64
    }

    /// Sender's 16-bit address
    pub fn addr16(&self) -> Address16 {
        self.addr16
    }

    pub fn options(&self) -> u8 {
        self.options
    }

    pub fn rf_data(&self) -> Option<&[u8]> {
        self.rf_data.as_deref()
    }
}

impl FramePayload for ReceivePacket {
    const FRAME_TYPE: FrameType = FrameType::ReceivePacket;
    const MIN_LENGTH: usize = 12;

    fn decode(payload: &[u8]) -> Result<Self, DecodeError> {
        let mut buf = check_payload::<Self>(payload)?;
        Ok(Self {
            addr64: Address64::new(buf.get_u64()),
            addr16: Address16::new(buf.get_u16()),
            options: buf.get_u8(),
            rf_data: trailing(buf),
        })
    }

    fn encode_body(&self, buf: &mut BytesMut) {
        buf.put_u64(self.addr64.value());
        buf.put_u16(self.addr16.value());
        buf.put_u8(self.options);
        put_optional(buf, &self.rf_data);
    }

    fn is_broadcast(&self) -> bool {
        receive::is_broadcast(self.options)
    }
}

/// Explicit RX Indicator (`0x91`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExplicitRxIndicator {
    addr64: Address64,
    addr16: Address16,
    source_endpoint: u8,
    dest_endpoint: u8,
    cluster_id: u16,
    profile_id: u16,
    options: u8,
    rf_data: Option<Bytes>,
}

impl ExplicitRxIndicator {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        addr64: Address64,
        addr16: Address16,
        source_endpoint: u8,
        dest_endpoint: u8,
        cluster_id: u16,
        profile_id: u16,
        options: u8,
        rf_data: impl Into<Bytes>,
    ) -> Self {
        Self {
            addr64,
            addr16,
            source_endpoint,
            dest_endpoint,
            cluster_id,
            profile_id,
            options,
            rf_data: optional(rf_data),
        }
    }

    pub fn addr64(&self) -> Address64 {
        self.addr64
    }

    pub fn addr16(&self) -> Address16 {
        self.addr16
    }

    pub fn source_endpoint(&self) -> u8 {
        self.source_endpoint
    }

    pub fn dest_endpoint(&self) -> u8 {
        self.dest_endpoint
    }

    pub fn cluster_id(&self) -> u16 {
        self.cluster_id
    }

    pub fn profile_id(&self) -> u16 {
        self.profile_id
    }

    pub fn options(&self) -> u8 {
        self.options
    }

    pub fn rf_data(&self) -> Option<&[u8]> {
        self.rf_data.as_deref()
    }
}

impl FramePayload for ExplicitRxIndicator {
    const FRAME_TYPE: FrameType = FrameType::ExplicitRxIndicator;
    const MIN_LENGTH: usize = 18;

    fn decode(payload: &[u8]) -> Result<Self, DecodeError> {
        let mut buf = check_payload::<Self>(payload)?;
        Ok(Self {
            addr64: Address64::new(buf.get_u64()),
            addr16: Address16::new(buf.get_u16()),
            source_endpoint: buf.get_u8(),
            dest_endpoint: buf.get_u8(),
            cluster_id: buf.get_u16(),
            profile_id: buf.get_u16(),
            options: buf.get_u8(),
            rf_data: trailing(buf),
        })
    }

    fn encode_body(&self, buf: &mut BytesMut) {
        buf.put_u64(self.addr64.value());
        buf.put_u16(self.addr16.value());
        buf.put_u8(self.source_endpoint);
        buf.put_u8(self.dest_endpoint);
        buf.put_u16(self.cluster_id);
        buf.put_u16(self.profile_id);
        buf.put_u8(self.options);
        put_optional(buf, &self.rf_data);
    }

    fn is_broadcast(&self) -> bool {
        receive::is_broadcast(self.options)
    }
}

/// IO Data Sample RX Indicator (`0x92`)
///
/// The sample block starts with a sample count byte. The decoded
/// [`IoSample`] is derived from the raw block and recomputed whenever the
/// block is replaced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IoDataSampleRx {
    addr64: Address64,
    addr16: Address16,
    options: u8,
    sample_data: Option<Bytes>,
    io_sample: Option<IoSample>,
}

impl IoDataSampleRx {
    pub fn new(
        addr64: Address64,
        addr16: Address16,
        options: u8,
        sample_data: impl Into<Bytes>,
    ) -> Self {
        let sample_data = optional(sample_data);
        Self {
            addr64,
            addr16,
            options,
            io_sample: parse_sample(&sample_data),
            sample_data,
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

    /// Raw sample block, count byte included
    pub fn sample_data(&self) -> Option<&[u8]> {
        self.sample_data.as_deref()
    }

    pub fn io_sample(&self) -> Option<&IoSample> {
        self.io_sample.as_ref()
    }

    pub fn with_sample_data(mut self, sample_data: impl Into<Bytes>) -> Self {
        self.sample_data = optional(sample_data);
        self.io_sample = parse_sample(&self.sample_data);
        self
    }
}

fn parse_sample(data: &Option<Bytes>) -> Option<IoSample> {
    IoSample::decode_with(SampleLayout::Counted, data.as_deref()?)
}

impl FramePayload for IoDataSampleRx {
    const FRAME_TYPE: FrameType = FrameType::IoDataSampleRx;
    const MIN_LENGTH: usize = 12;

    fn decode(payload: &[u8]) -> Result<Self, DecodeError> {
        let mut buf = check_payload::<Self>(payload)?;
        let addr64 = Address64::new(buf.get_u64());
        let addr16 = Address16::new(buf.get_u16());
        let options = buf.get_u8();
        let sample_data = trailing(buf);
        Ok(Self {
            addr64,
            addr16,
            options,
            io_sample: parse_sample(&sample_data),
            sample_data,
        })
    }

    fn encode_body(&self, buf: &mut BytesMut) {
        buf.put_u64(self.addr64.value());
        buf.put_u16(self.addr16.value());
        buf.put_u8(self.options);
        put_optional(buf, &self.sample_data);
    }

    fn is_broadcast(&self) -> bool {
        receive::is_broadcast(self.options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::hex::parse_hex;
    use crate::packet::{DigitalLevel, IoLine};

    #[test]
    fn test_receive_packet() {
        let payload =
            parse_hex("90 00 13 A2 00 40 52 2B AA 7D 84 01 52 78 44 61 74 61").unwrap();
        let rx = ReceivePacket::decode(&payload).unwrap();
        assert_eq!(rx.addr64(), Address64::new(0x0013_A200_4052_2BAA));
        assert_eq!(rx.addr16(), Address16::new(0x7D84));
        assert_eq!(rx.options(), receive::PACKET_ACKNOWLEDGED);
        assert_eq!(rx.rf_data(), Some(&b"RxData"[..]));
        assert!(!rx.is_broadcast());
        assert_eq!(rx.to_payload()[..], payload[..]);
    }

    #[test]
    fn test_receive_packet_broadcast_options() {
        let rx = ReceivePacket::new(
            Address64::new(1),
            Address16::new(2),
            receive::BROADCAST_PACKET,
            Vec::new(),
        );
        assert!(rx.is_broadcast());
        let pan = ReceivePacket::new(Address64::new(1), Address16::new(2), receive::PAN_BROADCAST, Vec::new());
        assert!(pan.is_broadcast());
        assert_eq!(ReceivePacket::decode(&rx.to_payload()).unwrap(), rx);
    }

    #[test]
    fn test_explicit_rx_roundtrip() {
        let rx = ExplicitRxIndicator::new(
            Address64::new(0x0013_A200_4052_2BAA),
            Address16::new(0x7D84),
            0xE8,
            0xE8,
            0x0011,
            0xC105,
            receive::BROADCAST_PACKET,
            b"data".to_vec(),
        );
        assert!(rx.is_broadcast());
        let payload = rx.to_payload();
        assert_eq!(payload.len(), 22);
        assert_eq!(ExplicitRxIndicator::decode(&payload).unwrap(), rx);
    }

    #[test]
    fn test_io_data_sample() {
        let payload = parse_hex(
            "92 00 13 A2 00 40 52 2B AA 7D 84 01 01 00 1C 02 00 14 02 25 0C E4",
        )
        .unwrap();
        let rx = IoDataSampleRx::decode(&payload).unwrap();
        let sample = rx.io_sample().unwrap();
        assert_eq!(sample.sample_count(), Some(1));
        assert_eq!(sample.digital_value(IoLine::Dio2Ad2), Some(DigitalLevel::High));
        assert_eq!(sample.digital_value(IoLine::Dio3Ad3), Some(DigitalLevel::Low));
        assert_eq!(sample.digital_value(IoLine::Dio4Ad4), Some(DigitalLevel::High));
        assert_eq!(sample.analog_value(IoLine::Dio1Ad1), Some(0x0225));
        assert!(!sample.has_power_supply_value());
        assert_eq!(rx.to_payload()[..], payload[..]);
    }

    #[test]
    fn test_io_data_sample_short_block() {
        let payload = parse_hex("92 00 13 A2 00 40 52 2B AA 7D 84 01 01 00").unwrap();
        let rx = IoDataSampleRx::decode(&payload).unwrap();
        assert!(rx.io_sample().is_none());
        assert_eq!(rx.sample_data(), Some(&[0x01, 0x00][..]));
    }

    #[test]
    fn test_io_sample_recomputed_on_replace() {
        let rx = IoDataSampleRx::new(Address64::new(1), Address16::new(2), 0, Vec::new());
        assert!(rx.io_sample().is_none());
        let rx = rx.with_sample_data(vec![0x01, 0x00, 0x00, 0x80, 0x0C, 0xE4]);
        assert_eq!(rx.io_sample().unwrap().power_supply_value().unwrap(), 0x0CE4);
    }
}
