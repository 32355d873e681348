#![cfg_attr(not(test), no_std)]
#![doc = include_str!("../README.md")]

mod command;
mod config;
mod crc;
mod device;
mod driver;
#[cfg(feature = "ds18b20")]
pub mod ds18b20;
mod iowire;
pub mod pulse;
mod result;
mod rom_id;
mod scratchpad;
mod sensor;
mod temperature;
pub mod timing;

pub use command::{Command, OpCode};
pub use config::Config;
pub use crc::{compute_crc8, compute_partial_crc8, validate_crc8};
pub use device::Device;
pub use driver::{Driver, Phase, ALARM_RANGE};
pub use iowire::{Inverted, IoWire};
pub use pulse::{decode_pulse_widths, PulseDecoder};
pub use result::Error;
pub use rom_id::{RomId, RomIdError};
pub use scratchpad::Scratchpad;
pub use sensor::Sensor;
pub use temperature::{decode_temperature, split_temp, Celsius, Resolution};
pub use timing::Timing;
