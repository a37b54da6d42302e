//! 16-bit and 64-bit XBee addresses

use std::fmt;

/// 16-bit network address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Address16(u16);

impl Address16 {
    /// Network address of the coordinator
    pub const COORDINATOR: Self = Self(0x0000);
    /// Network address used when the 16-bit address is not known
    pub const UNKNOWN: Self = Self(0xFFFE);
    /// 16-bit broadcast address
    pub const BROADCAST: Self = Self(0xFFFF);

    /// Create an address from its numeric value
    pub const fn new(value: u16) -> Self {
        Self(value)
    }

    /// Create an address from big-endian wire bytes
    pub const fn from_bytes(bytes: [u8; 2]) -> Self {
        Self(u16::from_be_bytes(bytes))
    }

    /// Numeric value
    pub const fn value(self) -> u16 {
        self.0
    }

    /// Big-endian wire bytes
    pub const fn to_bytes(self) -> [u8; 2] {
        self.0.to_be_bytes()
    }

    /// Whether this is the 16-bit broadcast address
    pub fn is_broadcast(self) -> bool {
        self == Self::BROADCAST
    }
}

impl From<u16> for Address16 {
    fn from(value: u16) -> Self {
        Self(value)
    }
}

impl From<Address16> for u16 {
    fn from(addr: Address16) -> Self {
        addr.0
    }
}

impl fmt::Display for Address16 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04X}", self.0)
    }
}

/// 64-bit IEEE (serial number) address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Address64(u64);

impl Address64 {
    /// 64-bit address of the coordinator
    pub const COORDINATOR: Self = Self(0x0000_0000_0000_0000);
    /// 64-bit broadcast address
    pub const BROADCAST: Self = Self(0x0000_0000_0000_FFFF);
    /// Address used when the 64-bit address is not known
    pub const UNKNOWN: Self = Self(0xFFFF_FFFF_FFFF_FFFF);

    /// Create an address from its numeric value
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Create an address from big-endian wire bytes
    pub const fn from_bytes(bytes: [u8; 8]) -> Self {
        Self(u64::from_be_bytes(bytes))
    }

    /// Numeric value
    pub const fn value(self) -> u64 {
        self.0
    }

    /// Big-endian wire bytes
    pub const fn to_bytes(self) -> [u8; 8] {
        self.0.to_be_bytes()
    }

    /// Whether this is the 64-bit broadcast address
    pub fn is_broadcast(self) -> bool {
        self == Self::BROADCAST
    }
}

impl From<u64> for Address64 {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<Address64> for u64 {
    fn from(addr: Address64) -> Self {
        addr.0
    }
}

impl fmt::Display for Address64 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016X}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address16_constants() {
        assert_eq!(Address16::COORDINATOR.value(), 0x0000);
        assert_eq!(Address16::UNKNOWN.value(), 0xFFFE);
        assert!(Address16::BROADCAST.is_broadcast());
        assert!(!Address16::UNKNOWN.is_broadcast());
    }

    #[test]
    fn test_address64_bytes_are_big_endian() {
        let addr = Address64::new(0x0013_A200_4052_2BAA);
        assert_eq!(addr.to_bytes(), [0x00, 0x13, 0xA2, 0x00, 0x40, 0x52, 0x2B, 0xAA]);
        assert_eq!(Address64::from_bytes(addr.to_bytes()), addr);
    }

    #[test]
    fn test_address64_broadcast() {
        assert_eq!(Address64::BROADCAST.to_bytes(), [0, 0, 0, 0, 0, 0, 0xFF, 0xFF]);
        assert!(Address64::BROADCAST.is_broadcast());
        assert!(!Address64::UNKNOWN.is_broadcast());
    }

    #[test]
    fn test_display() {
        assert_eq!(Address16::new(0x1A2B).to_string(), "1A2B");
        assert_eq!(Address64::new(0x0013_A200_4052_2BAA).to_string(), "0013A20040522BAA");
    }
}
