use core::convert::TryFrom;
use fixed::types::I12F4;

/// Temperature in degrees Celsius, 0.0625 per least significant bit
pub type Celsius = I12F4;

/// Conversion resolution, as encoded in the configuration register
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum Resolution {
    /// 0.5 °C steps
    Bits9 = 0b0001_1111,
    /// 0.25 °C steps
    Bits10 = 0b0011_1111,
    /// 0.125 °C steps
    Bits11 = 0b0101_1111,
    /// 0.0625 °C steps
    #[default]
    Bits12 = 0b0111_1111,
}

impl Resolution {
    pub fn bits(&self) -> u8 {
        match self {
            Resolution::Bits9 => 9,
            Resolution::Bits10 => 10,
            Resolution::Bits11 => 11,
            Resolution::Bits12 => 12,
        }
    }

    /// Maximum conversion time
    pub fn conversion_time_us(&self) -> u32 {
        match self {
            Resolution::Bits9 => 93_750,
            Resolution::Bits10 => 187_500,
            Resolution::Bits11 => 375_000,
            Resolution::Bits12 => 750_000,
        }
    }

    pub fn conversion_time_ms(&self) -> u16 {
        ((self.conversion_time_us() + 999) / 1_000) as u16
    }

    pub fn config_byte(&self) -> u8 {
        *self as u8
    }

    /// Smallest representable temperature step
    pub fn step(&self) -> Celsius {
        Celsius::from_bits(1 << self.insignificant_bits())
    }

    fn insignificant_bits(&self) -> u8 {
        12 - self.bits()
    }

    /// Mask keeping only the bits the device fills in at this resolution
    pub fn mask(&self) -> i16 {
        !((1i16 << self.insignificant_bits()) - 1)
    }
}

impl TryFrom<u8> for Resolution {
    type Error = u8;

    /// Decodes a configuration register byte; the low five bits are ignored
    fn try_from(config: u8) -> Result<Self, Self::Error> {
        // bit 7 reads as zero on a healthy device
        if config & 0x80 != 0 {
            return Err(config);
        }
        Ok(match (config >> 5) & 0b11 {
            0b00 => Resolution::Bits9,
            0b01 => Resolution::Bits10,
            0b10 => Resolution::Bits11,
            _ => Resolution::Bits12,
        })
    }
}

/// Assembles the two temperature bytes and drops the bits below `resolution`
pub fn decode_temperature(lsb: u8, msb: u8, resolution: Resolution) -> Celsius {
    let raw = i16::from_le_bytes([lsb, msb]);
    Celsius::from_bits(raw & resolution.mask())
}

/// Split raw value to two parts: integer and fraction N
/// Original value may be calculated as: integer + fraction/10000
pub fn split_temp(raw: i16) -> (i16, i16) {
    if raw >= 0 {
        (raw >> 4, (raw & 0xF) * 625)
    } else {
        let abs = raw.unsigned_abs();
        (-((abs >> 4) as i16), -625 * (abs & 0xF) as i16)
    }
}
