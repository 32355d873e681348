//! A DS18B20 simulated at the line level on a virtual clock.
//!
//! Time only moves when the driver waits on [`SimDelay`]. The device reacts to
//! the master's falling and rising edges the way the datasheet describes it:
//! low pulses of 480us and more reset it, shorter pulses written to it are
//! decoded by their width and read slots are answered by holding the line low.
#![allow(dead_code)]

use std::{cell::RefCell, convert::Infallible, rc::Rc};

use embedded_hal::delay::DelayNs;
use onewire_ds18b20::{compute_crc8, IoWire};

pub const ROM: [u8; 8] = [0x28, 0xff, 0x4c, 0x74, 0x50, 0x17, 0x04, 0xbe];
pub const POWER_ON_SCRATCH: [u8; 8] = [0x50, 0x05, 0x4b, 0x46, 0x7f, 0xff, 0x0c, 0x10];

const US: u64 = 1_000;
const RESET_MIN: u64 = 480 * US;
const WRITE_ONE_MAX: u64 = 15 * US;
const PRESENCE_WAIT: u64 = 30 * US;
const PRESENCE_LOW: u64 = 100 * US;
const READ_ZERO_LOW: u64 = 30 * US;

#[derive(Debug)]
enum Mode {
    Idle,
    RomCommand,
    MatchRom(Vec<u8>),
    FunctionCommand,
    WriteScratch(Vec<u8>),
    Sending { bytes: Vec<u8>, bit: usize },
    Busy { until: u64 },
}

impl Mode {
    fn receives(&self) -> bool {
        matches!(
            self,
            Mode::RomCommand | Mode::MatchRom(_) | Mode::FunctionCommand | Mode::WriteScratch(_)
        )
    }
}

pub struct Bus {
    now: u64,
    master_low: bool,
    low_since: u64,
    pull: Option<(u64, u64)>,
    mode: Mode,
    shift: u8,
    bits: u8,

    pub present: bool,
    pub corrupt_crc: bool,
    pub conversion_ns: u64,
    pub eeprom_ns: u64,
    pub rom: [u8; 8],
    pub scratch: [u8; 8],
    pub eeprom: [u8; 3],
    /// Raw temperature latched by the next conversion
    pub next_temperature: i16,
    /// Function commands the device accepted, in order
    pub commands: Vec<u8>,
}

impl Bus {
    fn new() -> Self {
        Bus {
            now: 0,
            master_low: false,
            low_since: 0,
            pull: None,
            mode: Mode::Idle,
            shift: 0,
            bits: 0,
            present: true,
            corrupt_crc: false,
            conversion_ns: 100_000 * US,
            eeprom_ns: 2_000 * US,
            rom: ROM,
            scratch: POWER_ON_SCRATCH,
            eeprom: [POWER_ON_SCRATCH[2], POWER_ON_SCRATCH[3], POWER_ON_SCRATCH[4]],
            next_temperature: 0x0191,
            commands: Vec::new(),
        }
    }

    pub fn now_us(&self) -> u64 {
        self.now / US
    }

    pub fn scratchpad(&self) -> [u8; 9] {
        let mut raw = [0u8; 9];
        raw[..8].copy_from_slice(&self.scratch);
        raw[8] = compute_crc8(&self.scratch) ^ u8::from(self.corrupt_crc);
        raw
    }

    fn device_pulls(&self) -> bool {
        self.pull.map_or(false, |(from, to)| (from..to).contains(&self.now))
    }

    fn level(&self) -> bool {
        !(self.master_low || self.device_pulls())
    }

    fn fall(&mut self) {
        if self.master_low {
            return;
        }
        self.master_low = true;
        self.low_since = self.now;

        let send_zero = match &mut self.mode {
            Mode::Sending { bytes, bit } => {
                let one = bytes
                    .get(*bit / 8)
                    .map_or(true, |byte| (byte >> (*bit % 8)) & 0x01 == 0x01);
                *bit += 1;
                !one
            }
            Mode::Busy { until } => self.now < *until,
            _ => false,
        };
        if send_zero {
            self.pull = Some((self.now, self.now + READ_ZERO_LOW));
        }
    }

    fn rise(&mut self) {
        if !self.master_low {
            return;
        }
        self.master_low = false;
        let width = self.now - self.low_since;

        if width >= RESET_MIN {
            self.shift = 0;
            self.bits = 0;
            if self.present {
                let from = self.now + PRESENCE_WAIT;
                self.pull = Some((from, from + PRESENCE_LOW));
                self.mode = Mode::RomCommand;
            } else {
                self.mode = Mode::Idle;
            }
            return;
        }

        if self.mode.receives() {
            self.shift >>= 1;
            if width < WRITE_ONE_MAX {
                self.shift |= 0x80;
            }
            self.bits += 1;
            if self.bits == 8 {
                let byte = self.shift;
                self.shift = 0;
                self.bits = 0;
                self.receive(byte);
            }
        }
    }

    fn receive(&mut self, byte: u8) {
        self.mode = match std::mem::replace(&mut self.mode, Mode::Idle) {
            Mode::RomCommand => match byte {
                0x33 => Mode::Sending {
                    bytes: self.rom.to_vec(),
                    bit: 0,
                },
                0xCC => Mode::FunctionCommand,
                0x55 => Mode::MatchRom(Vec::new()),
                _ => Mode::Idle,
            },
            Mode::MatchRom(mut received) => {
                received.push(byte);
                if received.len() < 8 {
                    Mode::MatchRom(received)
                } else if received[..] == self.rom[..] {
                    Mode::FunctionCommand
                } else {
                    Mode::Idle
                }
            }
            Mode::FunctionCommand => {
                self.commands.push(byte);
                self.function(byte)
            }
            Mode::WriteScratch(mut received) => {
                received.push(byte);
                if received.len() < 3 {
                    Mode::WriteScratch(received)
                } else {
                    self.scratch[2..5].copy_from_slice(&received);
                    Mode::Idle
                }
            }
            other => other,
        };
    }

    fn function(&mut self, byte: u8) -> Mode {
        match byte {
            0x44 => {
                self.scratch[..2].copy_from_slice(&self.next_temperature.to_le_bytes());
                Mode::Busy {
                    until: self.now + self.conversion_ns,
                }
            }
            0xBE => Mode::Sending {
                bytes: self.scratchpad().to_vec(),
                bit: 0,
            },
            0x4E => Mode::WriteScratch(Vec::new()),
            0x48 => {
                self.eeprom.copy_from_slice(&self.scratch[2..5]);
                Mode::Busy {
                    until: self.now + self.eeprom_ns,
                }
            }
            0xB8 => {
                self.scratch[2..5].copy_from_slice(&self.eeprom);
                Mode::Busy {
                    until: self.now + self.eeprom_ns,
                }
            }
            // externally powered: every read slot stays high
            0xB4 => Mode::Sending {
                bytes: Vec::new(),
                bit: 0,
            },
            _ => Mode::Idle,
        }
    }
}

pub type SharedBus = Rc<RefCell<Bus>>;

pub struct SimWire {
    bus: SharedBus,
}

impl IoWire for SimWire {
    type Error = Infallible;

    fn drive_low(&mut self) -> Result<(), Self::Error> {
        self.bus.borrow_mut().fall();
        Ok(())
    }

    fn release(&mut self) -> Result<(), Self::Error> {
        self.bus.borrow_mut().rise();
        Ok(())
    }

    fn read_level(&mut self) -> Result<bool, Self::Error> {
        Ok(self.bus.borrow().level())
    }
}

pub struct SimDelay {
    bus: SharedBus,
}

impl DelayNs for SimDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.bus.borrow_mut().now += u64::from(ns);
    }
}

/// A bus with one powered-up DS18B20 on it
pub fn bus() -> (SharedBus, SimWire, SimDelay) {
    let bus = Rc::new(RefCell::new(Bus::new()));
    let wire = SimWire { bus: bus.clone() };
    let delay = SimDelay { bus: bus.clone() };
    (bus, wire, delay)
}
