use crate::{Resolution, Timing};

/// Driver configuration, fixed at construction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    pub timing: Timing,
    /// Bounds busy-polling after a temperature conversion
    pub resolution: Resolution,
    /// Bounds busy-polling after an EEPROM copy or recall
    pub eeprom_timeout_us: u32,
    /// Pause between two busy-poll read slots
    pub poll_interval_us: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            timing: Timing::standard(),
            resolution: Resolution::Bits12,
            eeprom_timeout_us: 10_000,
            poll_interval_us: 1_000,
        }
    }
}

impl Config {
    pub fn with_timing(mut self, timing: Timing) -> Self {
        self.timing = timing;
        self
    }

    pub fn with_resolution(mut self, resolution: Resolution) -> Self {
        self.resolution = resolution;
        self
    }

    pub fn with_eeprom_timeout_us(mut self, timeout: u32) -> Self {
        self.eeprom_timeout_us = timeout;
        self
    }

    pub fn with_poll_interval_us(mut self, interval: u32) -> Self {
        self.poll_interval_us = interval;
        self
    }
}
