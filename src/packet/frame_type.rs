//! API frame type codes

use std::fmt;

macro_rules! frame_types {
    ($($variant:ident = $code:literal, $name:literal, $needs_id:literal;)+) => {
        /// Frame type byte (first byte of every API payload)
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[repr(u8)]
        pub enum FrameType {
            $($variant = $code,)+
        }

        impl FrameType {
            /// Every registered frame type, in code order
            pub const ALL: &'static [FrameType] = &[$(FrameType::$variant,)+];

            /// Look up a registered frame type by its code
            pub fn from_u8(code: u8) -> Option<Self> {
                match code {
                    $($code => Some(Self::$variant),)+
                    _ => None,
                }
            }

            /// Display name used in logs
            pub fn name(self) -> &'static str {
                match self {
                    $(Self::$variant => $name,)+
                }
            }

            /// Whether frames of this type carry a frame ID byte
            pub fn needs_frame_id(self) -> bool {
                match self {
                    $(Self::$variant => $needs_id,)+
                }
            }
        }
    };
}

frame_types! {
    Tx64Request = 0x00, "TX (Transmit) Request 64-bit address", true;
    Tx16Request = 0x01, "TX (Transmit) Request 16-bit address", true;
    AtCommand = 0x08, "AT Command", true;
    AtCommandQueue = 0x09, "AT Command Queue", true;
    TransmitRequest = 0x10, "Transmit Request", true;
    ExplicitAddressing = 0x11, "Explicit Addressing Command Frame", true;
    RemoteAtCommand = 0x17, "Remote AT Command Request", true;
    SendDataRequest = 0x28, "Send Data Request", true;
    DeviceResponse = 0x2A, "Device Response", true;
    UserDataRelay = 0x2D, "User Data Relay", true;
    Rx64 = 0x80, "RX (Receive) Packet 64-bit Address", false;
    Rx16 = 0x81, "RX (Receive) Packet 16-bit Address", false;
    Rx64Io = 0x82, "IO Data Sample RX 64-bit Address Indicator", false;
    Rx16Io = 0x83, "IO Data Sample RX 16-bit Address Indicator", false;
    AtCommandResponse = 0x88, "AT Command Response", true;
    TxStatus = 0x89, "TX (Transmit) Status", true;
    ModemStatus = 0x8A, "Modem Status", false;
    TransmitStatus = 0x8B, "Transmit Status", true;
    ReceivePacket = 0x90, "Receive Packet", false;
    ExplicitRxIndicator = 0x91, "Explicit RX Indicator", false;
    IoDataSampleRx = 0x92, "IO Data Sample RX Indicator", false;
    RemoteAtCommandResponse = 0x97, "Remote Command Response", true;
    UserDataRelayOutput = 0xAD, "User Data Relay Output", false;
    SendDataResponse = 0xB8, "Send Data Response", true;
    DeviceRequest = 0xB9, "Device Request", false;
    DeviceResponseStatus = 0xBA, "Device Response Status", true;
    FrameError = 0xFE, "Frame Error", false;
    Generic = 0xFF, "Generic", false;
}

impl FrameType {
    /// Wire code
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Frame types that answer a request of this type
    ///
    /// Empty for types that never get a correlated response.
    pub fn response_types(self) -> &'static [FrameType] {
        match self {
            Self::AtCommand | Self::AtCommandQueue => &[Self::AtCommandResponse],
            Self::RemoteAtCommand => &[Self::RemoteAtCommandResponse],
            Self::TransmitRequest | Self::ExplicitAddressing | Self::UserDataRelay => {
                &[Self::TransmitStatus]
            }
            Self::Tx64Request | Self::Tx16Request => &[Self::TxStatus],
            Self::SendDataRequest => &[Self::SendDataResponse],
            Self::DeviceResponse => &[Self::DeviceResponseStatus],
            _ => &[],
        }
    }

    /// Whether a frame of type `other` answers a request of this type
    pub fn is_answered_by(self, other: FrameType) -> bool {
        self.response_types().contains(&other)
    }
}

impl From<FrameType> for u8 {
    fn from(frame_type: FrameType) -> Self {
        frame_type.code()
    }
}

impl fmt::Display for FrameType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (0x{:02X})", self.name(), self.code())
    }
}
