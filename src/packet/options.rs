//! Option bitfields carried by transmit and receive frames

/// Receive options (`0x80`–`0x83`, `0x90`–`0x92`)
pub mod receive {
    /// Packet was acknowledged
    pub const PACKET_ACKNOWLEDGED: u8 = 0x01;
    /// Packet was sent to the broadcast address
    pub const BROADCAST_PACKET: u8 = 0x02;
    /// Packet was sent to the broadcast PAN
    pub const PAN_BROADCAST: u8 = 0x04;
    /// Packet was encrypted with APS encryption
    pub const APS_ENCRYPTED: u8 = 0x20;
    /// Packet was sent from an end device
    pub const FROM_END_DEVICE: u8 = 0x40;

    /// Whether the options mark an address or PAN broadcast
    pub fn is_broadcast(options: u8) -> bool {
        options & (BROADCAST_PACKET | PAN_BROADCAST) != 0
    }
}

/// Transmit options (`0x00`, `0x01`, `0x10`, `0x11`)
pub mod transmit {
    /// No options
    pub const NONE: u8 = 0x00;
    /// Disable retries and acknowledgements
    pub const DISABLE_ACK: u8 = 0x01;
    /// Skip route discovery (DigiMesh)
    pub const DISABLE_ROUTE_DISCOVERY: u8 = 0x02;
    /// Send to the broadcast PAN (802.15.4)
    pub const BROADCAST_PAN: u8 = 0x04;
    /// Enable APS end-to-end encryption
    pub const ENABLE_APS_ENCRYPTION: u8 = 0x20;
    /// Use the extended transmission timeout
    pub const USE_EXTENDED_TIMEOUT: u8 = 0x40;
}

/// Remote AT command options (`0x17`)
pub mod remote_at {
    /// No options
    pub const NONE: u8 = 0x00;
    /// Disable retries and acknowledgements
    pub const DISABLE_ACK: u8 = 0x01;
    /// Apply changes on the remote immediately
    pub const APPLY_CHANGES: u8 = 0x02;
    /// Use the extended transmission timeout
    pub const USE_EXTENDED_TIMEOUT: u8 = 0x40;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_receive_broadcast_bits() {
        assert!(!receive::is_broadcast(0x00));
        assert!(!receive::is_broadcast(receive::PACKET_ACKNOWLEDGED));
        assert!(receive::is_broadcast(receive::BROADCAST_PACKET));
        assert!(receive::is_broadcast(receive::PAN_BROADCAST));
        assert!(receive::is_broadcast(receive::BROADCAST_PACKET | receive::APS_ENCRYPTED));
    }
}
