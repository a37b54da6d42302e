//! Digital/analog IO sample blocks
//!
//! A sample block is the trailing region of the IO sample frames (`0x82`,
//! `0x83`, `0x92`) and of some AT responses (`IS`). It is bit-packed:
//! a digital mask, an analog mask, an optional digital word, one word per
//! enabled analog line and an optional power-supply reading.
//!
//! Blocks that are too short or truncated decode to `None`.

use crate::error::IoSampleError;
use bytes::{Buf, BufMut};
use std::collections::BTreeMap;
use std::fmt;

/// Smallest block that can hold a sample
pub const MIN_SAMPLE_LEN: usize = 5;

/// Bit of the analog mask announcing a power-supply reading
const POWER_SUPPLY_BIT: u8 = 0x80;

/// Analog lines that can appear in a sample (A0..A5)
const ANALOG_LINES: usize = 6;

/// Legacy channel indicator: analog lines live in bits 14..9
const LEGACY_ANALOG_SHIFT: u16 = 9;
const LEGACY_ANALOG_MASK: u16 = 0x3F;
/// Legacy channel indicator: digital lines live in bits 8..0
const LEGACY_DIGITAL_MASK: u16 = 0x01FF;

/// IO line of an XBee module
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum IoLine {
    Dio0Ad0,
    Dio1Ad1,
    Dio2Ad2,
    Dio3Ad3,
    Dio4Ad4,
    Dio5Ad5,
    Dio6,
    Dio7,
    Dio8,
    Dio9,
    Dio10Pwm0,
    Dio11Pwm1,
    Dio12,
    Dio13,
    Dio14,
    Dio15,
}

impl IoLine {
    pub const ALL: [IoLine; 16] = [
        IoLine::Dio0Ad0,
        IoLine::Dio1Ad1,
        IoLine::Dio2Ad2,
        IoLine::Dio3Ad3,
        IoLine::Dio4Ad4,
        IoLine::Dio5Ad5,
        IoLine::Dio6,
        IoLine::Dio7,
        IoLine::Dio8,
        IoLine::Dio9,
        IoLine::Dio10Pwm0,
        IoLine::Dio11Pwm1,
        IoLine::Dio12,
        IoLine::Dio13,
        IoLine::Dio14,
        IoLine::Dio15,
    ];

    /// Bit index of the line in sample masks
    pub fn index(self) -> u8 {
        self as u8
    }

    pub fn from_index(index: u8) -> Option<Self> {
        Self::ALL.get(usize::from(index)).copied()
    }

    /// Pin name as printed on the module datasheet
    pub fn name(self) -> &'static str {
        match self {
            Self::Dio0Ad0 => "DIO0/AD0",
            Self::Dio1Ad1 => "DIO1/AD1",
            Self::Dio2Ad2 => "DIO2/AD2",
            Self::Dio3Ad3 => "DIO3/AD3",
            Self::Dio4Ad4 => "DIO4/AD4",
            Self::Dio5Ad5 => "DIO5/AD5",
            Self::Dio6 => "DIO6",
            Self::Dio7 => "DIO7",
            Self::Dio8 => "DIO8",
            Self::Dio9 => "DIO9",
            Self::Dio10Pwm0 => "DIO10/PWM0",
            Self::Dio11Pwm1 => "DIO11/PWM1",
            Self::Dio12 => "DIO12",
            Self::Dio13 => "DIO13",
            Self::Dio14 => "DIO14",
            Self::Dio15 => "DIO15",
        }
    }
}

impl fmt::Display for IoLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Level of a digital line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DigitalLevel {
    Low,
    High,
}

impl DigitalLevel {
    fn from_bit(set: bool) -> Self {
        if set {
            Self::High
        } else {
            Self::Low
        }
    }
}

/// Wire layout of a sample block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SampleLayout {
    /// Digital mask, analog mask, values
    #[default]
    Plain,
    /// Sample count byte followed by a `Plain` block (`0x92`)
    Counted,
    /// Sample count byte and a packed channel indicator (`0x82`, `0x83`)
    Legacy,
}

/// A decoded IO sample
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IoSample {
    layout: SampleLayout,
    sample_count: Option<u8>,
    digital_mask: u16,
    analog_mask: u8,
    digital_word: Option<u16>,
    digital_values: BTreeMap<IoLine, DigitalLevel>,
    analog_values: BTreeMap<IoLine, u16>,
    power_supply: Option<u16>,
}

impl IoSample {
    /// Decode a `Plain` block
    pub fn decode(block: &[u8]) -> Option<Self> {
        Self::decode_with(SampleLayout::Plain, block)
    }

    /// Decode a block in the given layout
    ///
    /// Returns `None` for blocks shorter than [`MIN_SAMPLE_LEN`] or truncated
    /// before the last value the masks announce.
    pub fn decode_with(layout: SampleLayout, block: &[u8]) -> Option<Self> {
        if block.len() < MIN_SAMPLE_LEN {
            return None;
        }
        let mut buf = block;
        match layout {
            SampleLayout::Plain => {
                let digital_mask = buf.get_u16();
                let analog_mask = buf.get_u8();
                Self::read_values(layout, None, digital_mask, analog_mask, buf, true)
            }
            SampleLayout::Counted => {
                let count = buf.get_u8();
                if buf.remaining() < 3 {
                    return None;
                }
                let digital_mask = buf.get_u16();
                let analog_mask = buf.get_u8();
                Self::read_values(layout, Some(count), digital_mask, analog_mask, buf, true)
            }
            SampleLayout::Legacy => {
                let count = buf.get_u8();
                let header = buf.get_u16();
                let analog_mask = ((header >> LEGACY_ANALOG_SHIFT) & LEGACY_ANALOG_MASK) as u8;
                let digital_mask = header & LEGACY_DIGITAL_MASK;
                Self::read_values(layout, Some(count), digital_mask, analog_mask, buf, false)
            }
        }
    }

    fn read_values(
        layout: SampleLayout,
        sample_count: Option<u8>,
        digital_mask: u16,
        analog_mask: u8,
        mut buf: &[u8],
        allow_power_supply: bool,
    ) -> Option<Self> {
        let mut digital_word = None;
        let mut digital_values = BTreeMap::new();
        if digital_mask != 0 {
            if buf.remaining() < 2 {
                return None;
            }
            let word = buf.get_u16();
            digital_word = Some(word);
            for line in IoLine::ALL {
                let bit = 1u16 << line.index();
                if digital_mask & bit != 0 {
                    digital_values.insert(line, DigitalLevel::from_bit(word & bit != 0));
                }
            }
        }

        let mut analog_values = BTreeMap::new();
        for line in IoLine::ALL.iter().take(ANALOG_LINES) {
            if analog_mask & (1 << line.index()) != 0 {
                if buf.remaining() < 2 {
                    return None;
                }
                analog_values.insert(*line, buf.get_u16());
            }
        }

        let mut power_supply = None;
        if allow_power_supply && analog_mask & POWER_SUPPLY_BIT != 0 {
            if buf.remaining() < 2 {
                return None;
            }
            power_supply = Some(buf.get_u16());
        }

        Some(Self {
            layout,
            sample_count,
            digital_mask,
            analog_mask,
            digital_word,
            digital_values,
            analog_values,
            power_supply,
        })
    }

    /// Encode the sample in the given layout
    ///
    /// Legacy blocks cannot carry a power-supply reading or digital lines
    /// above DIO8; those are left out.
    pub fn encode(&self, layout: SampleLayout) -> Vec<u8> {
        let mut out = Vec::with_capacity(16);
        let count = self.sample_count.unwrap_or(1);
        let (digital_mask, analog_mask) = match layout {
            SampleLayout::Plain => (self.digital_mask, self.analog_mask),
            SampleLayout::Counted => {
                out.put_u8(count);
                (self.digital_mask, self.analog_mask)
            }
            SampleLayout::Legacy => {
                let digital_mask = self.digital_mask & LEGACY_DIGITAL_MASK;
                let analog_mask = self.analog_mask & LEGACY_ANALOG_MASK as u8;
                out.put_u8(count);
                out.put_u16((u16::from(analog_mask) << LEGACY_ANALOG_SHIFT) | digital_mask);
                (digital_mask, analog_mask)
            }
        };
        if layout != SampleLayout::Legacy {
            out.put_u16(digital_mask);
            out.put_u8(analog_mask);
        }

        if digital_mask != 0 {
            out.put_u16(self.digital_word.unwrap_or_else(|| self.packed_digital_word()));
        }
        for (line, value) in &self.analog_values {
            if analog_mask & (1 << line.index()) != 0 {
                out.put_u16(*value);
            }
        }
        if layout != SampleLayout::Legacy && analog_mask & POWER_SUPPLY_BIT != 0 {
            out.put_u16(self.power_supply.unwrap_or(0));
        }
        out
    }

    fn packed_digital_word(&self) -> u16 {
        self.digital_values
            .iter()
            .filter(|(_, level)| **level == DigitalLevel::High)
            .fold(0, |word, (line, _)| word | (1 << line.index()))
    }

    /// Layout the sample was decoded from
    pub fn layout(&self) -> SampleLayout {
        self.layout
    }

    /// Number of samples announced by the block, for counted layouts
    pub fn sample_count(&self) -> Option<u8> {
        self.sample_count
    }

    pub fn digital_mask(&self) -> u16 {
        self.digital_mask
    }

    pub fn analog_mask(&self) -> u8 {
        self.analog_mask
    }

    pub fn has_digital_values(&self) -> bool {
        !self.digital_values.is_empty()
    }

    pub fn has_analog_values(&self) -> bool {
        !self.analog_values.is_empty()
    }

    pub fn has_power_supply_value(&self) -> bool {
        self.power_supply.is_some()
    }

    pub fn digital_values(&self) -> &BTreeMap<IoLine, DigitalLevel> {
        &self.digital_values
    }

    pub fn analog_values(&self) -> &BTreeMap<IoLine, u16> {
        &self.analog_values
    }

    pub fn digital_value(&self, line: IoLine) -> Option<DigitalLevel> {
        self.digital_values.get(&line).copied()
    }

    pub fn analog_value(&self, line: IoLine) -> Option<u16> {
        self.analog_values.get(&line).copied()
    }

    /// Power-supply reading, if the sample carries one
    pub fn power_supply_value(&self) -> Result<u16, IoSampleError> {
        self.power_supply
            .ok_or(IoSampleError::NotSupported("power supply value"))
    }
}

impl fmt::Display for IoSample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        let mut first = true;
        for (line, level) in &self.digital_values {
            if !first {
                write!(f, ", ")?;
            }
            first = false;
            write!(f, "{line}: {level:?}")?;
        }
        for (line, value) in &self.analog_values {
            if !first {
                write!(f, ", ")?;
            }
            first = false;
            write!(f, "{line}: {value}")?;
        }
        if let Some(supply) = self.power_supply {
            if !first {
                write!(f, ", ")?;
            }
            write!(f, "Power supply: {supply}")?;
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_block_is_none() {
        assert!(IoSample::decode(&[]).is_none());
        assert!(IoSample::decode(&[0x00, 0x01, 0x00, 0x00]).is_none());
        assert!(IoSample::decode_with(SampleLayout::Counted, &[0x01, 0x00, 0x01, 0x00]).is_none());
    }

    #[test]
    fn test_power_supply_only() {
        let sample = IoSample::decode(&[0x00, 0x00, 0x80, 0x0C, 0xE4]).unwrap();
        assert!(!sample.has_digital_values());
        assert!(!sample.has_analog_values());
        assert_eq!(sample.power_supply_value().unwrap(), 0x0CE4);
    }

    #[test]
    fn test_single_digital_line() {
        let sample = IoSample::decode(&[0x00, 0x01, 0x00, 0xFF, 0xFF]).unwrap();
        assert_eq!(sample.digital_values().len(), 1);
        assert_eq!(sample.digital_value(IoLine::Dio0Ad0), Some(DigitalLevel::High));
        assert_eq!(sample.digital_value(IoLine::Dio1Ad1), None);
        assert!(!sample.has_analog_values());
        assert!(matches!(
            sample.power_supply_value(),
            Err(IoSampleError::NotSupported(_))
        ));
    }

    #[test]
    fn test_digital_and_analog() {
        // DIO3 + DIO4 digital, AD1 + AD2 analog
        let block = [0x00, 0x18, 0x06, 0x00, 0x08, 0x02, 0x25, 0x00, 0x1F];
        let sample = IoSample::decode(&block).unwrap();
        assert_eq!(sample.digital_value(IoLine::Dio3Ad3), Some(DigitalLevel::High));
        assert_eq!(sample.digital_value(IoLine::Dio4Ad4), Some(DigitalLevel::Low));
        assert_eq!(sample.analog_value(IoLine::Dio1Ad1), Some(0x0225));
        assert_eq!(sample.analog_value(IoLine::Dio2Ad2), Some(0x001F));
        assert_eq!(sample.encode(SampleLayout::Plain), block);
    }

    #[test]
    fn test_truncated_analog_is_none() {
        assert!(IoSample::decode(&[0x00, 0x00, 0x03, 0x01, 0x02, 0x03]).is_none());
    }

    #[test]
    fn test_counted_layout() {
        let block = [0x01, 0x00, 0x01, 0x80, 0x00, 0x01, 0x0C, 0xE4];
        let sample = IoSample::decode_with(SampleLayout::Counted, &block).unwrap();
        assert_eq!(sample.sample_count(), Some(1));
        assert_eq!(sample.digital_value(IoLine::Dio0Ad0), Some(DigitalLevel::High));
        assert_eq!(sample.power_supply_value().unwrap(), 0x0CE4);
        assert_eq!(sample.encode(SampleLayout::Counted), block);
    }

    #[test]
    fn test_legacy_layout() {
        // 1 sample, A0 enabled (bit 9), D0 + D1 enabled
        let block = [0x01, 0x02, 0x03, 0x00, 0x02, 0x01, 0xFF];
        let sample = IoSample::decode_with(SampleLayout::Legacy, &block).unwrap();
        assert_eq!(sample.sample_count(), Some(1));
        assert_eq!(sample.digital_mask(), 0x0003);
        assert_eq!(sample.analog_mask(), 0x01);
        assert_eq!(sample.digital_value(IoLine::Dio0Ad0), Some(DigitalLevel::Low));
        assert_eq!(sample.digital_value(IoLine::Dio1Ad1), Some(DigitalLevel::High));
        assert_eq!(sample.analog_value(IoLine::Dio0Ad0), Some(0x01FF));
        assert!(!sample.has_power_supply_value());
        assert_eq!(sample.encode(SampleLayout::Legacy), block);
    }

    #[test]
    fn test_io_line_index() {
        for line in IoLine::ALL {
            assert_eq!(IoLine::from_index(line.index()), Some(line));
        }
        assert_eq!(IoLine::from_index(16), None);
        assert_eq!(IoLine::Dio10Pwm0.to_string(), "DIO10/PWM0");
    }
}
