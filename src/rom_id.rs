use crate::{result::ensure_crc8, Command, Driver, Error, IoWire};
use core::{
    fmt::{Debug, Display, Formatter, Result as FmtResult},
    ops::Deref,
    str::FromStr,
};
use embedded_hal::delay::DelayNs;

/// 64-bit device address: family code, 48-bit serial number, CRC-8
#[derive(Debug, Clone, Copy, PartialOrd, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct RomId {
    raw: [u8; Self::BYTES],
}

impl Default for RomId {
    fn default() -> Self {
        Self::from([0; Self::BYTES])
    }
}

impl From<[u8; Self::BYTES]> for RomId {
    fn from(raw: [u8; Self::BYTES]) -> Self {
        RomId { raw }
    }
}

impl From<RomId> for [u8; RomId::BYTES] {
    fn from(rom: RomId) -> [u8; RomId::BYTES] {
        rom.raw
    }
}

impl Deref for RomId {
    type Target = [u8; Self::BYTES];

    fn deref(&self) -> &Self::Target {
        &self.raw
    }
}

impl AsRef<[u8]> for RomId {
    fn as_ref(&self) -> &[u8] {
        &self.raw
    }
}

impl RomId {
    /// The length of a ROM id in bytes
    pub const BYTES: usize = 8;

    pub fn family_code(&self) -> u8 {
        self.raw[0]
    }

    pub fn serial_number(&self) -> u64 {
        let mut serial = [0u8; 8];
        serial[..6].copy_from_slice(&self.raw[1..7]);
        u64::from_le_bytes(serial)
    }

    pub fn crc(&self) -> u8 {
        self.raw[7]
    }

    pub fn is_valid(&self) -> bool {
        crate::validate_crc8(&self.raw)
    }

    pub fn ensure_valid<E: Debug>(&self) -> Result<(), Error<E>> {
        ensure_crc8(&self.raw)
    }
}

/// Error type
#[derive(Debug, PartialEq, Eq)]
pub enum RomIdError {
    NotEnough,
    Invalid,
}

fn hex_to_u8(c: char) -> Option<u8> {
    c.to_digit(16).map(|d| d as u8)
}

impl FromStr for RomId {
    type Err = RomIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut raw = [0u8; Self::BYTES];
        let mut chars = s.chars().filter(|c| !c.is_whitespace() && *c != ':');

        for byte in raw.iter_mut() {
            match (chars.next(), chars.next()) {
                (Some(h), Some(l)) => match (hex_to_u8(h), hex_to_u8(l)) {
                    (Some(h), Some(l)) => *byte = (h << 4) | l,
                    _ => return Err(RomIdError::Invalid),
                },
                _ => return Err(RomIdError::NotEnough),
            }
        }
        if chars.next().is_some() {
            return Err(RomIdError::Invalid);
        }

        Ok(RomId::from(raw))
    }
}

impl Display for RomId {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        write!(
            f,
            "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
            self.raw[0],
            self.raw[1],
            self.raw[2],
            self.raw[3],
            self.raw[4],
            self.raw[5],
            self.raw[6],
            self.raw[7],
        )
    }
}

impl RomId {
    /// Reads the id of the only device on the bus
    pub fn read_single<W: IoWire>(
        driver: &mut Driver<W>,
        delay: &mut impl DelayNs,
    ) -> Result<Self, Error<W::Error>> {
        let raw = driver.transact::<{ RomId::BYTES }>(delay, Command::ReadRom, None, &[])?;
        Ok(RomId::from(raw))
    }
}
