//! Typed API frame payloads
//!
//! Every frame type has its own struct implementing [`FramePayload`]; the
//! [`Packet`] enum wraps them so the dispatcher can move any frame around.
//!
//! Decoding checks, in order: a non-empty payload, the minimum length for the
//! type, and the frame type byte. Fixed fields are then read positionally and
//! whatever follows the last fixed field is the trailing region (RF data, AT
//! parameter, IO sample block, ...). An empty trailing region is `None` and
//! encodes to zero bytes.

pub mod address;
pub mod at;
pub mod cloud;
pub mod frame_type;
pub mod generic;
pub mod io_sample;
pub mod legacy;
pub mod modem;
pub mod options;
pub mod receive;
pub mod registry;
pub mod relay;
pub mod status;
pub mod transmit;

pub use address::{Address16, Address64};
pub use at::{
    AtCommand, AtCommandName, AtCommandQueue, AtCommandResponse, RemoteAtCommand,
    RemoteAtCommandResponse,
};
pub use cloud::{
    DeviceRequest, DeviceResponse, DeviceResponseStatus, SendDataRequest, SendDataResponse,
};
pub use frame_type::FrameType;
pub use generic::Generic;
pub use io_sample::{DigitalLevel, IoLine, IoSample, SampleLayout};
pub use legacy::{Rx16, Rx16Io, Rx64, Rx64Io, Tx16Request, Tx64Request, TxStatus};
pub use modem::{FrameError, ModemStatus};
pub use receive::{ExplicitRxIndicator, IoDataSampleRx, ReceivePacket};
pub use registry::decode_frame;
pub use relay::{UserDataRelay, UserDataRelayOutput};
pub use status::{
    AtCommandStatus, CloudStatus, DeliveryStatus, DiscoveryStatus, FrameErrorCode,
    ModemStatusEvent, RelayInterface, SendDataOptions,
};
pub use transmit::{ExplicitAddressing, TransmitRequest, TransmitStatus};

use crate::codec::{encode_frame, OperatingMode};
use crate::error::{DecodeError, MalformedFrame};
use bytes::{BufMut, Bytes, BytesMut};

/// Codec for one API frame type
pub trait FramePayload: Sized {
    /// Frame type byte this codec handles
    const FRAME_TYPE: FrameType;

    /// Smallest valid payload, frame type byte included
    const MIN_LENGTH: usize;

    /// Decode a full payload (frame type byte first)
    fn decode(payload: &[u8]) -> Result<Self, DecodeError>;

    /// Append everything after the frame type byte
    fn encode_body(&self, buf: &mut BytesMut);

    /// Full payload, frame type byte first
    fn to_payload(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(Self::MIN_LENGTH + 32);
        buf.put_u8(Self::FRAME_TYPE.code());
        self.encode_body(&mut buf);
        buf.freeze()
    }

    /// Frame ID, for types that carry one
    fn frame_id(&self) -> Option<u8> {
        None
    }

    /// Whether the frame is addressed to (or was received as) a broadcast
    fn is_broadcast(&self) -> bool {
        false
    }
}

/// Validate a payload for `P` and return the bytes after the type byte
pub(crate) fn check_payload<P: FramePayload>(payload: &[u8]) -> Result<&[u8], DecodeError> {
    let Some(&actual) = payload.first() else {
        return Err(DecodeError::NullPayload);
    };
    if payload.len() < P::MIN_LENGTH {
        return Err(DecodeError::Incomplete {
            expected: P::MIN_LENGTH,
            actual: payload.len(),
        });
    }
    let expected = P::FRAME_TYPE.code();
    if actual != expected {
        return Err(DecodeError::WrongFrameType { expected, actual });
    }
    Ok(&payload[1..])
}

/// Trailing region; empty means absent
pub(crate) fn trailing(rest: &[u8]) -> Option<Bytes> {
    if rest.is_empty() {
        None
    } else {
        Some(Bytes::copy_from_slice(rest))
    }
}

/// Normalise caller-supplied trailing data
pub(crate) fn optional(data: impl Into<Bytes>) -> Option<Bytes> {
    let data = data.into();
    if data.is_empty() {
        None
    } else {
        Some(data)
    }
}

pub(crate) fn put_optional(buf: &mut BytesMut, data: &Option<Bytes>) {
    if let Some(data) = data {
        buf.put_slice(data);
    }
}

macro_rules! packets {
    ($($variant:ident($ty:ty),)+) => {
        /// Any decoded or constructed API frame payload
        #[derive(Debug, Clone, PartialEq, Eq)]
        pub enum Packet {
            $($variant($ty),)+
        }

        impl Packet {
            /// Registered frame type code
            pub fn frame_type(&self) -> FrameType {
                match self {
                    $(Self::$variant(_) => <$ty as FramePayload>::FRAME_TYPE,)+
                }
            }

            /// Frame ID, for variants that use frame-ID correlation
            pub fn frame_id(&self) -> Option<u8> {
                match self {
                    $(Self::$variant(p) => p.frame_id(),)+
                }
            }

            /// Broadcast flag as each variant defines it: the destination
            /// address for requests, the receive options for received frames,
            /// and `false` for everything else
            pub fn is_broadcast(&self) -> bool {
                match self {
                    $(Self::$variant(p) => p.is_broadcast(),)+
                }
            }

            /// Payload bytes, frame type byte first
            pub fn to_payload(&self) -> Bytes {
                match self {
                    $(Self::$variant(p) => p.to_payload(),)+
                }
            }
        }

        $(
            impl From<$ty> for Packet {
                fn from(packet: $ty) -> Self {
                    Self::$variant(packet)
                }
            }
        )+
    };
}

packets! {
    Tx64Request(Tx64Request),
    Tx16Request(Tx16Request),
    AtCommand(AtCommand),
    AtCommandQueue(AtCommandQueue),
    TransmitRequest(TransmitRequest),
    ExplicitAddressing(ExplicitAddressing),
    RemoteAtCommand(RemoteAtCommand),
    SendDataRequest(SendDataRequest),
    DeviceResponse(DeviceResponse),
    UserDataRelay(UserDataRelay),
    Rx64(Rx64),
    Rx16(Rx16),
    Rx64Io(Rx64Io),
    Rx16Io(Rx16Io),
    AtCommandResponse(AtCommandResponse),
    TxStatus(TxStatus),
    ModemStatus(ModemStatus),
    TransmitStatus(TransmitStatus),
    ReceivePacket(ReceivePacket),
    ExplicitRxIndicator(ExplicitRxIndicator),
    IoDataSampleRx(IoDataSampleRx),
    RemoteAtCommandResponse(RemoteAtCommandResponse),
    UserDataRelayOutput(UserDataRelayOutput),
    SendDataResponse(SendDataResponse),
    DeviceRequest(DeviceRequest),
    DeviceResponseStatus(DeviceResponseStatus),
    FrameError(FrameError),
    Generic(Generic),
}

impl Packet {
    /// Decode a payload through the frame type registry
    pub fn decode(payload: &[u8]) -> Result<Self, DecodeError> {
        decode_frame(payload)
    }

    /// Whether this variant carries a frame ID byte
    pub fn needs_frame_id(&self) -> bool {
        self.frame_type().needs_frame_id()
    }

    /// Complete wire frame in the given mode
    ///
    /// Fails when the payload is too long for the 16-bit length field.
    pub fn to_frame(&self, mode: OperatingMode) -> Result<Vec<u8>, MalformedFrame> {
        encode_frame(&self.to_payload(), mode)
    }
}
