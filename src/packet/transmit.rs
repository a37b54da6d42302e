//! Transmit request and status frames (`0x10`, `0x11`, `0x8B`)

use super::{
    check_payload, optional, put_optional, trailing, Address16, Address64, DeliveryStatus,
    DiscoveryStatus, FramePayload, FrameType,
};
use crate::error::DecodeError;
use bytes::{Buf, BufMut, Bytes, BytesMut};

/// Transmit Request (`0x10`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransmitRequest {
    frame_id: u8,
    addr64: Address64,
    addr16: Address16,
    broadcast_radius: u8,
    options: u8,
    rf_data: Option<Bytes>,
}

impl TransmitRequest {
    /// `broadcast_radius` 0 means the network maximum; `options` is a
    /// combination of [`super::options::transmit`] flags
    pub fn new(
        frame_id: u8,
        addr64: Address64,
        addr16: Address16,
        broadcast_radius: u8,
        options: u8,
        rf_data: impl Into<Bytes>,
    ) -> Self {
        Self {
            frame_id,
            addr64,
            addr16,
            broadcast_radius,
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

    pub fn broadcast_radius(&self) -> u8 {
        self.broadcast_radius
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

    pub fn with_rf_data(mut self, rf_data: impl Into<Bytes>) -> Self {
        self.rf_data = optional(rf_data);
        self
    }
}

impl FramePayload for TransmitRequest {
    const FRAME_TYPE: FrameType = FrameType::TransmitRequest;
    const MIN_LENGTH: usize = 14;

    fn decode(payload: &[u8]) -> Result<Self, DecodeError> {
        let mut buf = check_payload::<Self>(payload)?;
        Ok(Self {
            frame_id: buf.get_u8(),
            addr64: Address64::new(buf.get_u64()),
            addr16: Address16::new(buf.get_u16()),
            broadcast_radius: buf.get_u8(),
            options: buf.get_u8(),
            rf_data: trailing(buf),
        })
    }

    fn encode_body(&self, buf: &mut BytesMut) {
        buf.put_u8(self.frame_id);
        buf.put_u64(self.addr64.value());
        buf.put_u16(self.addr16.value());
        buf.put_u8(self.broadcast_radius);
        buf.put_u8(self.options);
        put_optional(buf, &self.rf_data);
    }

    fn frame_id(&self) -> Option<u8> {
        Some(self.frame_id)
    }

    fn is_broadcast(&self) -> bool {
        self.addr64.is_broadcast() || self.addr16.is_broadcast()
    }
}

/// Explicit Addressing Command Frame (`0x11`)
///
/// Transmit request with application-layer addressing (endpoints, cluster
/// and profile IDs).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExplicitAddressing {
    frame_id: u8,
    addr64: Address64,
    addr16: Address16,
    source_endpoint: u8,
    dest_endpoint: u8,
    cluster_id: u16,
    profile_id: u16,
    broadcast_radius: u8,
    options: u8,
    rf_data: Option<Bytes>,
}

impl ExplicitAddressing {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        frame_id: u8,
        addr64: Address64,
        addr16: Address16,
        source_endpoint: u8,
        dest_endpoint: u8,
        cluster_id: u16,
        profile_id: u16,
        broadcast_radius: u8,
        options: u8,
        rf_data: impl Into<Bytes>,
    ) -> Self {
        Self {
            frame_id,
            addr64,
            addr16,
            source_endpoint,
            dest_endpoint,
            cluster_id,
            profile_id,
            broadcast_radius,
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

    pub fn broadcast_radius(&self) -> u8 {
        self.broadcast_radius
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

impl FramePayload for ExplicitAddressing {
    const FRAME_TYPE: FrameType = FrameType::ExplicitAddressing;
    const MIN_LENGTH: usize = 20;

    fn decode(payload: &[u8]) -> Result<Self, DecodeError> {
        let mut buf = check_payload::<Self>(payload)?;
        Ok(Self {
            frame_id: buf.get_u8(),
            addr64: Address64::new(buf.get_u64()),
            addr16: Address16::new(buf.get_u16()),
            source_endpoint: buf.get_u8(),
            dest_endpoint: buf.get_u8(),
            cluster_id: buf.get_u16(),
            profile_id: buf.get_u16(),
            broadcast_radius: buf.get_u8(),
            options: buf.get_u8(),
            rf_data: trailing(buf),
        })
    }

    fn encode_body(&self, buf: &mut BytesMut) {
        buf.put_u8(self.frame_id);
        buf.put_u64(self.addr64.value());
        buf.put_u16(self.addr16.value());
        buf.put_u8(self.source_endpoint);
        buf.put_u8(self.dest_endpoint);
        buf.put_u16(self.cluster_id);
        buf.put_u16(self.profile_id);
        buf.put_u8(self.broadcast_radius);
        buf.put_u8(self.options);
        put_optional(buf, &self.rf_data);
    }

    fn frame_id(&self) -> Option<u8> {
        Some(self.frame_id)
    }

    fn is_broadcast(&self) -> bool {
        self.addr64.is_broadcast() || self.addr16.is_broadcast()
    }
}

/// Transmit Status (`0x8B`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransmitStatus {
    frame_id: u8,
    addr16: Address16,
    retry_count: u8,
    delivery_status: DeliveryStatus,
    discovery_status: DiscoveryStatus,
}

impl TransmitStatus {
    pub fn new(
        frame_id: u8,
        addr16: Address16,
        retry_count: u8,
        delivery_status: DeliveryStatus,
        discovery_status: DiscoveryStatus,
    ) -> Self {
        Self {
            frame_id,
            addr16,
            retry_count,
            delivery_status,
            discovery_status,
        }
    }

    /// 16-bit address the packet was delivered to
    pub fn addr16(&self) -> Address16 {
        self.addr16
    }

    pub fn retry_count(&self) -> u8 {
        self.retry_count
    }

    pub fn delivery_status(&self) -> DeliveryStatus {
        self.delivery_status
    }

    pub fn discovery_status(&self) -> DiscoveryStatus {
        self.discovery_status
    }
}

impl FramePayload for TransmitStatus {
    const FRAME_TYPE: FrameType = FrameType::TransmitStatus;
    const MIN_LENGTH: usize = 7;

    fn decode(payload: &[u8]) -> Result<Self, DecodeError> {
        let mut buf = check_payload::<Self>(payload)?;
        Ok(Self {
            frame_id: buf.get_u8(),
            addr16: Address16::new(buf.get_u16()),
            retry_count: buf.get_u8(),
            delivery_status: DeliveryStatus::from(buf.get_u8()),
            discovery_status: DiscoveryStatus::from(buf.get_u8()),
        })
    }

    fn encode_body(&self, buf: &mut BytesMut) {
        buf.put_u8(self.frame_id);
        buf.put_u16(self.addr16.value());
        buf.put_u8(self.retry_count);
        buf.put_u8(self.delivery_status.code());
        buf.put_u8(self.discovery_status.code());
    }

    fn frame_id(&self) -> Option<u8> {
        Some(self.frame_id)
    }
}
