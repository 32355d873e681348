use core::fmt::Debug;

/// Error type
#[derive(Debug, PartialEq, Eq)]
pub enum Error<E: Sized + Debug> {
    /// No presence pulse after reset
    NoDevice,
    /// Wire not high before reset
    WireFault,
    /// CRC mismatch: (computed, received)
    CrcError(u8, u8),
    /// Device kept the bus low past the conversion or EEPROM write bound
    BusyTimeout,
    /// Captured pulse widths do not separate into short and long pulses
    AmbiguousTiming,
    InvalidParameter(&'static str),
    FamilyCodeMismatch(u8, u8),
    PortError(E),
}

impl<E: Sized + Debug> From<E> for Error<E> {
    fn from(e: E) -> Self {
        Error::PortError(e)
    }
}

/// Maps a failed CRC check of `data` (trailing CRC byte included) to an error
pub(crate) fn ensure_crc8<E: Debug>(data: &[u8]) -> Result<(), Error<E>> {
    match data.split_last() {
        Some((received, payload)) => {
            let computed = crate::compute_crc8(payload);
            if computed != *received {
                log::warn!(
                    "crc mismatch: computed {:#04x}, received {:#04x}",
                    computed,
                    received
                );
                Err(Error::CrcError(computed, *received))
            } else {
                Ok(())
            }
        }
        None => Err(Error::InvalidParameter("no crc byte to check")),
    }
}
