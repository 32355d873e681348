use crate::{result::ensure_crc8, temperature::decode_temperature, Celsius, Error, Resolution};
use byteorder::{ByteOrder, LittleEndian};
use core::{convert::TryFrom, fmt::Debug};

/// The nine scratchpad bytes as read with READ_SCRATCH
///
/// | byte | content                     |
/// |------|-----------------------------|
/// | 0    | temperature LSB             |
/// | 1    | temperature MSB             |
/// | 2    | TH alarm / user byte 1      |
/// | 3    | TL alarm / user byte 2      |
/// | 4    | configuration register      |
/// | 5-7  | reserved                    |
/// | 8    | CRC-8 of bytes 0-7          |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(transparent)]
pub struct Scratchpad {
    raw: [u8; Self::BYTES],
}

impl Scratchpad {
    pub const BYTES: usize = 9;

    /// Accepts the bytes only when their trailing CRC matches
    pub fn from_bytes<E: Debug>(raw: [u8; Self::BYTES]) -> Result<Self, Error<E>> {
        ensure_crc8::<E>(&raw)?;
        Ok(Self { raw })
    }

    /// Wraps bytes without looking at the CRC
    pub fn from_bytes_unchecked(raw: [u8; Self::BYTES]) -> Self {
        Self { raw }
    }

    pub fn as_bytes(&self) -> &[u8; Self::BYTES] {
        &self.raw
    }

    pub fn temperature_lsb(&self) -> u8 {
        self.raw[0]
    }

    pub fn temperature_msb(&self) -> u8 {
        self.raw[1]
    }

    pub fn raw_temperature(&self) -> i16 {
        LittleEndian::read_i16(&self.raw[0..2])
    }

    pub fn alarm_high(&self) -> i8 {
        self.raw[2] as i8
    }

    pub fn alarm_low(&self) -> i8 {
        self.raw[3] as i8
    }

    pub fn configuration(&self) -> u8 {
        self.raw[4]
    }

    pub fn crc(&self) -> u8 {
        self.raw[8]
    }

    pub fn resolution<E: Debug>(&self) -> Result<Resolution, Error<E>> {
        Resolution::try_from(self.configuration())
            .map_err(|_| Error::InvalidParameter("configuration register holds no resolution"))
    }

    /// Temperature truncated to the resolution the device is configured for
    pub fn temperature<E: Debug>(&self) -> Result<Celsius, Error<E>> {
        let resolution = self.resolution::<E>()?;
        Ok(decode_temperature(
            self.temperature_lsb(),
            self.temperature_msb(),
            resolution,
        ))
    }
}
