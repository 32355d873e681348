use embedded_hal::delay::DelayNs;

use crate::{
    driver::check_alarm, Celsius, Command, Device, Driver, Error, IoWire, Resolution, RomId,
    Scratchpad, Sensor,
};

#[derive(Debug, Clone, Copy)]
pub struct Ds18b20 {
    rom: RomId,
    resolution: Resolution,
}

impl From<Ds18b20> for RomId {
    fn from(device: Ds18b20) -> Self {
        device.rom
    }
}

impl Ds18b20 {
    /// Resolution assumed for conversions until [`Ds18b20::write_config`] or
    /// [`Ds18b20::recall_eeprom`] changes it
    pub fn with_resolution(mut self, resolution: Resolution) -> Self {
        self.resolution = resolution;
        self
    }

    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    /// Starts a conversion and polls until the device reports it finished
    pub fn measure_temperature<W: IoWire>(
        &self,
        driver: &mut Driver<W>,
        delay: &mut impl DelayNs,
    ) -> Result<Resolution, Error<W::Error>> {
        driver.transact_with_resolution::<0>(
            delay,
            Command::ConvertT,
            Some(&self.rom),
            &[],
            self.resolution,
        )?;
        Ok(self.resolution)
    }

    /// Starts a conversion on every device of the bus at once
    pub fn measure_all<W: IoWire>(
        driver: &mut Driver<W>,
        delay: &mut impl DelayNs,
        resolution: Resolution,
    ) -> Result<(), Error<W::Error>> {
        driver.transact_with_resolution::<0>(delay, Command::ConvertT, None, &[], resolution)?;
        Ok(())
    }

    pub fn read_scratchpad<W: IoWire>(
        &self,
        driver: &mut Driver<W>,
        delay: &mut impl DelayNs,
    ) -> Result<Scratchpad, Error<W::Error>> {
        // a full scratchpad read is CRC-checked by the driver
        let raw = driver.transact::<{ Scratchpad::BYTES }>(
            delay,
            Command::ReadScratch,
            Some(&self.rom),
            &[],
        )?;
        Ok(Scratchpad::from_bytes_unchecked(raw))
    }

    pub fn read_temperature<W: IoWire>(
        &self,
        driver: &mut Driver<W>,
        delay: &mut impl DelayNs,
    ) -> Result<Celsius, Error<W::Error>> {
        self.read_scratchpad(driver, delay)?.temperature()
    }

    /// Writes the alarm thresholds and the resolution to the scratchpad
    pub fn write_config<W: IoWire>(
        &mut self,
        driver: &mut Driver<W>,
        delay: &mut impl DelayNs,
        alarm_high: i8,
        alarm_low: i8,
        resolution: Resolution,
    ) -> Result<(), Error<W::Error>> {
        check_alarm::<W::Error>(alarm_high)?;
        check_alarm::<W::Error>(alarm_low)?;
        if alarm_low > alarm_high {
            return Err(Error::InvalidParameter("low alarm above high alarm"));
        }
        driver.transact::<0>(
            delay,
            Command::WriteScratch,
            Some(&self.rom),
            &[alarm_high as u8, alarm_low as u8, resolution.config_byte()],
        )?;
        self.resolution = resolution;
        Ok(())
    }

    /// Stores TH, TL and the configuration register in EEPROM
    pub fn copy_scratchpad<W: IoWire>(
        &self,
        driver: &mut Driver<W>,
        delay: &mut impl DelayNs,
    ) -> Result<(), Error<W::Error>> {
        driver.transact::<0>(delay, Command::CopyScratch, Some(&self.rom), &[])?;
        Ok(())
    }

    /// Reloads TH, TL and the configuration register from EEPROM and adopts
    /// the resolution stored there
    pub fn recall_eeprom<W: IoWire>(
        &mut self,
        driver: &mut Driver<W>,
        delay: &mut impl DelayNs,
    ) -> Result<(), Error<W::Error>> {
        driver.transact::<0>(delay, Command::RecallEe, Some(&self.rom), &[])?;
        self.resolution = self.read_scratchpad(driver, delay)?.resolution::<W::Error>()?;
        Ok(())
    }

    /// `true` if the device has its own supply, `false` if it runs parasite powered
    pub fn read_power_supply<W: IoWire>(
        &self,
        driver: &mut Driver<W>,
        delay: &mut impl DelayNs,
    ) -> Result<bool, Error<W::Error>> {
        let [supply] =
            driver.transact::<1>(delay, Command::ReadPowerSupply, Some(&self.rom), &[])?;
        Ok(supply & 0x01 != 0)
    }
}

impl Device for Ds18b20 {
    const FAMILY_CODE: u8 = 0x28;

    fn rom_id(&self) -> &RomId {
        &self.rom
    }

    fn from_rom_id_unchecked(rom: RomId) -> Self {
        Self {
            rom,
            resolution: Resolution::Bits12,
        }
    }
}

impl Sensor for Ds18b20 {
    fn start_measurement<W: IoWire>(
        &self,
        driver: &mut Driver<W>,
        delay: &mut impl DelayNs,
    ) -> Result<u16, Error<W::Error>> {
        Ok(self.measure_temperature(driver, delay)?.conversion_time_ms())
    }

    fn read_measurement<W: IoWire>(
        &self,
        driver: &mut Driver<W>,
        delay: &mut impl DelayNs,
    ) -> Result<Celsius, Error<W::Error>> {
        self.read_temperature(driver, delay)
    }

    fn read_measurement_raw<W: IoWire>(
        &self,
        driver: &mut Driver<W>,
        delay: &mut impl DelayNs,
    ) -> Result<i16, Error<W::Error>> {
        Ok(self.read_scratchpad(driver, delay)?.raw_temperature())
    }
}
