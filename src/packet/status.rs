//! Enumerated status and option codes
//!
//! Every enum keeps codes it does not know as `Unknown(raw)`, so frames from
//! newer firmware pass through unchanged.

use std::fmt;

macro_rules! code_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $($(#[$vmeta:meta])* $variant:ident = $code:literal => $desc:literal,)+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($(#[$vmeta])* $variant,)+
            /// Code not known to this library
            Unknown(u8),
        }

        impl $name {
            /// Raw wire code
            pub fn code(self) -> u8 {
                match self {
                    $(Self::$variant => $code,)+
                    Self::Unknown(code) => code,
                }
            }

            /// Human readable description
            pub fn description(self) -> &'static str {
                match self {
                    $(Self::$variant => $desc,)+
                    Self::Unknown(_) => "Unknown",
                }
            }
        }

        impl From<u8> for $name {
            fn from(code: u8) -> Self {
                match code {
                    $($code => Self::$variant,)+
                    other => Self::Unknown(other),
                }
            }
        }

        impl From<$name> for u8 {
            fn from(value: $name) -> Self {
                value.code()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{} (0x{:02X})", self.description(), self.code())
            }
        }
    };
}

code_enum! {
    /// Status of a local or remote AT command
    AtCommandStatus {
        Ok = 0x00 => "Status OK",
        Error = 0x01 => "Status Error",
        InvalidCommand = 0x02 => "Invalid command",
        InvalidParameter = 0x03 => "Invalid parameter",
        TxFailure = 0x04 => "TX failure",
    }
}

code_enum! {
    /// Event reported by a Modem Status frame
    ModemStatusEvent {
        HardwareReset = 0x00 => "Device was reset",
        WatchdogReset = 0x01 => "Watchdog timer was reset",
        JoinedNetwork = 0x02 => "Device joined to network",
        Disassociated = 0x03 => "Device disassociated",
        SyncLost = 0x04 => "Configuration error/synchronization lost",
        CoordinatorRealignment = 0x05 => "Coordinator realignment",
        CoordinatorStarted = 0x06 => "The coordinator started",
        SecurityKeyUpdated = 0x07 => "Network security key was updated",
        NetworkWokeUp = 0x0B => "Network woke up",
        NetworkWentToSleep = 0x0C => "Network went to sleep",
        VoltageLimitExceeded = 0x0D => "Voltage supply limit exceeded",
        RemoteManagerConnected = 0x0E => "Remote Manager connected",
        RemoteManagerDisconnected = 0x0F => "Remote Manager disconnected",
        ConfigChangedDuringJoin = 0x11 => "Modem configuration changed while joining",
        AccessFault = 0x12 => "Access fault",
        FatalStackError = 0x13 => "Fatal stack error",
        BluetoothConnected = 0x32 => "Bluetooth connected",
        BluetoothDisconnected = 0x33 => "Bluetooth disconnected",
        BandmaskConfigFailed = 0x34 => "Bandmask configuration failed",
        SecureSessionEstablished = 0x3B => "Secure session successfully established",
        SecureSessionEnded = 0x3C => "Secure session ended",
        SecureSessionAuthFailed = 0x3D => "Secure session authentication failed",
        PanIdConflict = 0x3E => "PAN ID conflict detected",
        PanIdChanged = 0x3F => "PAN ID changed due to conflict",
        StackError = 0x80 => "Stack error",
    }
}

code_enum! {
    /// Delivery status of a transmit request (`0x8B` and legacy `0x89`)
    DeliveryStatus {
        Success = 0x00 => "Success",
        MacAckFailure = 0x01 => "MAC ACK failure",
        CcaFailure = 0x02 => "CCA/LBT failure",
        Purged = 0x03 => "Purged, transmission not attempted",
        PhysicalError = 0x04 => "Physical error on the interface",
        InvalidDestinationEndpoint = 0x15 => "Invalid destination endpoint",
        NoBuffers = 0x18 => "No buffers",
        NetworkAckFailure = 0x21 => "Network ACK failure",
        NotJoined = 0x22 => "Not joined to network",
        SelfAddressed = 0x23 => "Self-addressed",
        AddressNotFound = 0x24 => "Address not found",
        RouteNotFound = 0x25 => "Route not found",
        BroadcastRelayNotHeard = 0x26 => "Broadcast source failed to hear a neighbor relay",
        InvalidBindingTableIndex = 0x2B => "Invalid binding table index",
        ResourceError = 0x2C => "Resource error, lack of free buffers or timers",
        ApsBroadcast = 0x2D => "Attempted broadcast with APS transmission",
        ApsUnicastWithoutEncryption = 0x2E => "Attempted unicast with APS transmission, but EE=0",
        PayloadTooLarge = 0x74 => "Data payload too large",
        IndirectMessageUnrequested = 0x75 => "Indirect message unrequested",
    }
}

code_enum! {
    /// Discovery overhead reported by a Transmit Status frame
    DiscoveryStatus {
        NoDiscoveryOverhead = 0x00 => "No discovery overhead",
        AddressDiscovery = 0x01 => "Address discovery",
        RouteDiscovery = 0x02 => "Route discovery",
        AddressAndRoute = 0x03 => "Address and route discovery",
        ExtendedTimeoutDiscovery = 0x40 => "Extended timeout discovery",
    }
}

code_enum! {
    /// Result of a cloud data or device response request
    CloudStatus {
        Success = 0x00 => "Success",
        BadRequest = 0x01 => "Bad request",
        ResponseUnavailable = 0x02 => "Response unavailable",
        CloudError = 0x03 => "Device Cloud error",
    }
}

code_enum! {
    /// Reason reported by a Frame Error frame
    FrameErrorCode {
        InvalidType = 0x02 => "Invalid frame type",
        InvalidLength = 0x03 => "Invalid frame length",
        InvalidChecksum = 0x04 => "Invalid checksum",
        PayloadTooBig = 0x05 => "Payload too big",
        StringEntryTooBig = 0x06 => "String entry too big",
        WrongState = 0x07 => "Wrong state",
        WrongRequestId = 0x08 => "Wrong request ID",
    }
}

code_enum! {
    /// How the cloud stores data sent with a Send Data Request
    SendDataOptions {
        Overwrite = 0x00 => "Overwrite",
        Archive = 0x01 => "Archive",
        Append = 0x02 => "Append",
        TransientData = 0x03 => "Transient data (do not store)",
    }
}

code_enum! {
    /// Local interface addressed by User Data Relay frames
    RelayInterface {
        Serial = 0x00 => "Serial port",
        Bluetooth = 0x01 => "Bluetooth Low Energy",
        MicroPython = 0x02 => "MicroPython",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_code_roundtrip() {
        assert_eq!(AtCommandStatus::from(0x02), AtCommandStatus::InvalidCommand);
        assert_eq!(u8::from(AtCommandStatus::InvalidCommand), 0x02);
        assert_eq!(ModemStatusEvent::from(0x06), ModemStatusEvent::CoordinatorStarted);
        assert_eq!(DeliveryStatus::from(0x24).code(), 0x24);
    }

    #[test]
    fn test_unknown_code_is_preserved() {
        let status = ModemStatusEvent::from(0xEE);
        assert_eq!(status, ModemStatusEvent::Unknown(0xEE));
        assert_eq!(status.code(), 0xEE);
        assert_eq!(status.description(), "Unknown");
    }

    #[test]
    fn test_display() {
        assert_eq!(AtCommandStatus::Ok.to_string(), "Status OK (0x00)");
        assert_eq!(DeliveryStatus::Unknown(0x99).to_string(), "Unknown (0x99)");
    }

    #[test]
    fn test_every_code_decodes_to_itself() {
        for code in 0..=u8::MAX {
            assert_eq!(DeliveryStatus::from(code).code(), code);
            assert_eq!(ModemStatusEvent::from(code).code(), code);
            assert_eq!(FrameErrorCode::from(code).code(), code);
        }
    }
}
