use crate::{Celsius, Device, Driver, Error, IoWire};
use embedded_hal::delay::DelayNs;

pub trait Sensor: Device {
    /// Runs a measurement to completion and returns the bound it was given, in milliseconds
    fn start_measurement<W: IoWire>(
        &self,
        driver: &mut Driver<W>,
        delay: &mut impl DelayNs,
    ) -> Result<u16, Error<W::Error>>;

    /// returns the measured value
    fn read_measurement<W: IoWire>(
        &self,
        driver: &mut Driver<W>,
        delay: &mut impl DelayNs,
    ) -> Result<Celsius, Error<W::Error>>;

    fn read_measurement_raw<W: IoWire>(
        &self,
        driver: &mut Driver<W>,
        delay: &mut impl DelayNs,
    ) -> Result<i16, Error<W::Error>>;
}
