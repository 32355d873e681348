use crate::{Driver, Error, IoWire, RomId};
use core::fmt::Debug;
use embedded_hal::delay::DelayNs;

/// Generic device interface
pub trait Device: Sized {
    /// Device family code
    const FAMILY_CODE: u8;

    /// Get device ROM id
    fn rom_id(&self) -> &RomId;

    /// Instantiate device from a ROM id without checking its family code
    fn from_rom_id_unchecked(rom: RomId) -> Self;

    /// Instantiate device from ROM id
    fn from_rom_id<E: Sized + Debug>(rom: RomId) -> Result<Self, Error<E>> {
        if rom.family_code() != Self::FAMILY_CODE {
            Err(Error::FamilyCodeMismatch(Self::FAMILY_CODE, rom.family_code()))
        } else {
            Ok(Self::from_rom_id_unchecked(rom))
        }
    }

    /// Reads the ROM id of the only device on the bus
    fn get_single<W: IoWire>(
        driver: &mut Driver<W>,
        delay: &mut impl DelayNs,
    ) -> Result<Self, Error<W::Error>> {
        let rom = RomId::read_single(driver, delay)?;
        Self::from_rom_id(rom)
    }
}
