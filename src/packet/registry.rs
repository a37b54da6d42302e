//! Frame type registry
//!
//! Maps the frame type byte of a payload to the codec for that type.

use super::*;
use crate::error::DecodeError;

/// Decoder producing a [`Packet`] from a full payload
pub type Decoder = fn(&[u8]) -> Result<Packet, DecodeError>;

fn decode_as<P>(payload: &[u8]) -> Result<Packet, DecodeError>
where
    P: FramePayload + Into<Packet>,
{
    P::decode(payload).map(Into::into)
}

/// Codec registered for a frame type
pub fn decoder_for(frame_type: FrameType) -> Decoder {
    match frame_type {
        FrameType::Tx64Request => decode_as::<Tx64Request>,
        FrameType::Tx16Request => decode_as::<Tx16Request>,
        FrameType::AtCommand => decode_as::<AtCommand>,
        FrameType::AtCommandQueue => decode_as::<AtCommandQueue>,
        FrameType::TransmitRequest => decode_as::<TransmitRequest>,
        FrameType::ExplicitAddressing => decode_as::<ExplicitAddressing>,
        FrameType::RemoteAtCommand => decode_as::<RemoteAtCommand>,
        FrameType::SendDataRequest => decode_as::<SendDataRequest>,
        FrameType::DeviceResponse => decode_as::<DeviceResponse>,
        FrameType::UserDataRelay => decode_as::<UserDataRelay>,
        FrameType::Rx64 => decode_as::<Rx64>,
        FrameType::Rx16 => decode_as::<Rx16>,
        FrameType::Rx64Io => decode_as::<Rx64Io>,
        FrameType::Rx16Io => decode_as::<Rx16Io>,
        FrameType::AtCommandResponse => decode_as::<AtCommandResponse>,
        FrameType::TxStatus => decode_as::<TxStatus>,
        FrameType::ModemStatus => decode_as::<ModemStatus>,
        FrameType::TransmitStatus => decode_as::<TransmitStatus>,
        FrameType::ReceivePacket => decode_as::<ReceivePacket>,
        FrameType::ExplicitRxIndicator => decode_as::<ExplicitRxIndicator>,
        FrameType::IoDataSampleRx => decode_as::<IoDataSampleRx>,
        FrameType::RemoteAtCommandResponse => decode_as::<RemoteAtCommandResponse>,
        FrameType::UserDataRelayOutput => decode_as::<UserDataRelayOutput>,
        FrameType::SendDataResponse => decode_as::<SendDataResponse>,
        FrameType::DeviceRequest => decode_as::<DeviceRequest>,
        FrameType::DeviceResponseStatus => decode_as::<DeviceResponseStatus>,
        FrameType::FrameError => decode_as::<FrameError>,
        FrameType::Generic => decode_as::<Generic>,
    }
}

/// Decode a verified frame payload into a typed packet
///
/// Fails with `NullPayload` for an empty payload and `UnknownFrameType` when
/// no codec is registered for `payload[0]`; both only reject this frame.
pub fn decode_frame(payload: &[u8]) -> Result<Packet, DecodeError> {
    let &code = payload.first().ok_or(DecodeError::NullPayload)?;
    let frame_type = FrameType::from_u8(code).ok_or(DecodeError::UnknownFrameType(code))?;
    decoder_for(frame_type)(payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::hex::parse_hex;

    fn samples() -> Vec<Packet> {
        let ni = AtCommandName::new("NI").unwrap();
        let addr64 = Address64::new(0x0013_A200_4052_2BAA);
        let addr16 = Address16::new(0x7D84);
        vec![
            Tx64Request::new(1, addr64, 0, b"a".to_vec()).into(),
            Tx16Request::new(2, addr16, 0, Vec::new()).into(),
            AtCommand::new(3, ni, Vec::new()).into(),
            AtCommandQueue::new(4, ni, b"x".to_vec()).into(),
            TransmitRequest::new(5, addr64, addr16, 0, 0, b"data".to_vec()).into(),
            ExplicitAddressing::new(6, addr64, addr16, 1, 2, 3, 4, 0, 0, Vec::new()).into(),
            RemoteAtCommand::new(7, addr64, addr16, 2, ni, Vec::new()).into(),
            SendDataRequest::new(8, "p", "t", SendDataOptions::Append, b"f".to_vec())
                .unwrap()
                .into(),
            DeviceResponse::new(9, 1, Vec::new()).into(),
            UserDataRelay::new(10, RelayInterface::Serial, b"r".to_vec()).into(),
            Rx64::new(addr64, 40, 0, b"a".to_vec()).unwrap().into(),
            Rx16::new(addr16, 40, 2, Vec::new()).unwrap().into(),
            Rx64Io::new(addr64, 40, 0, vec![1, 0x02, 0x00, 0x01, 0x00])
                .unwrap()
                .into(),
            Rx16Io::new(addr16, 40, 0, Vec::new()).unwrap().into(),
            AtCommandResponse::new(11, ni, AtCommandStatus::Ok, b"n".to_vec()).into(),
            TxStatus::new(12, DeliveryStatus::NoBuffers).into(),
            ModemStatus::new(ModemStatusEvent::JoinedNetwork).into(),
            TransmitStatus::new(13, addr16, 0, DeliveryStatus::Success, DiscoveryStatus::AddressDiscovery)
                .into(),
            ReceivePacket::new(addr64, addr16, 1, b"rx".to_vec()).into(),
            ExplicitRxIndicator::new(addr64, addr16, 1, 2, 3, 4, 0, Vec::new()).into(),
            IoDataSampleRx::new(addr64, addr16, 1, vec![1, 0, 1, 0, 0, 1]).into(),
            RemoteAtCommandResponse::new(14, addr64, addr16, ni, AtCommandStatus::Error, Vec::new())
                .into(),
            UserDataRelayOutput::new(RelayInterface::Bluetooth, b"o".to_vec()).into(),
            SendDataResponse::new(15, CloudStatus::BadRequest).into(),
            DeviceRequest::new(2, 0, "target", b"q".to_vec()).unwrap().into(),
            DeviceResponseStatus::new(16, CloudStatus::Success).into(),
            FrameError::new(FrameErrorCode::InvalidLength).into(),
            Generic::new(b"g".to_vec()).into(),
        ]
    }

    #[test]
    fn test_every_type_registered() {
        let packets = samples();
        assert_eq!(packets.len(), FrameType::ALL.len());
        for (packet, &frame_type) in packets.iter().zip(FrameType::ALL) {
            assert_eq!(packet.frame_type(), frame_type);
        }
    }

    #[test]
    fn test_every_variant_roundtrips() {
        for packet in samples() {
            let payload = packet.to_payload();
            let decoded = decode_frame(&payload).unwrap();
            assert_eq!(decoded, packet, "{}", packet.frame_type());
            assert_eq!(decoded.to_payload(), payload);
        }
    }

    #[test]
    fn test_frame_id_presence_is_per_type() {
        for packet in samples() {
            assert_eq!(
                packet.frame_id().is_some(),
                packet.needs_frame_id(),
                "{}",
                packet.frame_type()
            );
        }
    }

    #[test]
    fn test_decode_frame_errors() {
        assert_eq!(decode_frame(&[]), Err(DecodeError::NullPayload));
        assert_eq!(decode_frame(&[0x42, 0x00]), Err(DecodeError::UnknownFrameType(0x42)));
        assert_eq!(
            decode_frame(&[0x90, 0x00]),
            Err(DecodeError::Incomplete {
                expected: 12,
                actual: 2
            })
        );
    }

    #[test]
    fn test_decode_modem_status() {
        let packet = decode_frame(&parse_hex("8A 06").unwrap()).unwrap();
        match packet {
            Packet::ModemStatus(status) => assert_eq!(status.status().code(), 6),
            other => panic!("unexpected packet: {other:?}"),
        }
    }

    #[test]
    fn test_broadcast_detection() {
        let packets = samples();
        let broadcast: Vec<FrameType> = packets
            .iter()
            .filter(|p| p.is_broadcast())
            .map(Packet::frame_type)
            .collect();
        // Only Rx16 has the broadcast option bit set in the samples
        assert_eq!(broadcast, vec![FrameType::Rx16]);
    }
}
