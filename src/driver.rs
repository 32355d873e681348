use crate::{
    command::Busy, result::ensure_crc8, Command, Config, Error, IoWire, OpCode, Resolution, RomId,
};
use core::{convert::TryFrom, fmt::Debug};
use embedded_hal::delay::DelayNs;

/// Where a transaction currently is, or where the last one stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Reset,
    Command,
    Data,
}

pub struct Driver<W: IoWire> {
    io_wire: W,
    config: Config,
    phase: Phase,
}

impl<E: Debug, W: IoWire<Error = E>> Driver<W> {
    pub fn new(io_wire: W) -> Self {
        Self::with_config(io_wire, Config::default())
    }

    pub fn with_config(io_wire: W, config: Config) -> Self {
        Driver {
            io_wire,
            config,
            phase: Phase::Idle,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// [`Phase::Idle`] after a completed transaction, otherwise the phase that failed
    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn into_inner(self) -> W {
        self.io_wire
    }

    /// Runs one complete bus transaction and returns the `N` bytes read back.
    ///
    /// The steps always run in this order: reset and presence detection, ROM
    /// selection, function command, payload write, `N` byte reads, busy-polling
    /// for commands that keep the device busy, and a CRC check when a full ROM
    /// id or scratchpad was read. Function commands are addressed with
    /// MATCH_ROM when `rom` is given and SKIP_ROM otherwise.
    ///
    /// Conversion polling is bounded by the configured [`Resolution`].
    pub fn transact<const N: usize>(
        &mut self,
        delay: &mut impl DelayNs,
        command: Command,
        rom: Option<&RomId>,
        payload: &[u8],
    ) -> Result<[u8; N], Error<E>> {
        let resolution = self.config.resolution;
        self.transact_with_resolution(delay, command, rom, payload, resolution)
    }

    /// [`Driver::transact`] with the conversion bound of `resolution`
    pub fn transact_with_resolution<const N: usize>(
        &mut self,
        delay: &mut impl DelayNs,
        command: Command,
        rom: Option<&RomId>,
        payload: &[u8],
        resolution: Resolution,
    ) -> Result<[u8; N], Error<E>> {
        self.phase = Phase::Idle;
        check_request::<E>(command, rom, payload)?;
        log::debug!(
            "transact {:?} rom={} write={} read={}",
            command,
            rom.is_some(),
            payload.len(),
            N
        );

        self.enter(Phase::Reset);
        self.reset(delay)?;

        self.enter(Phase::Command);
        self.select(delay, command, rom)?;

        self.enter(Phase::Data);
        self.write_bytes(delay, payload)?;
        let mut read = [0u8; N];
        self.read_bytes(delay, &mut read)?;

        if let Some(busy) = command.busy() {
            let bound_us = match busy {
                Busy::Conversion => resolution.conversion_time_us(),
                Busy::Eeprom => self.config.eeprom_timeout_us,
            };
            self.wait_while_busy(delay, bound_us)?;
        }

        if carries_crc(command, N) {
            ensure_crc8::<E>(&read)?;
        }

        self.enter(Phase::Idle);
        Ok(read)
    }

    fn enter(&mut self, phase: Phase) {
        log::trace!("phase {:?} -> {:?}", self.phase, phase);
        self.phase = phase;
    }

    fn select(
        &mut self,
        delay: &mut impl DelayNs,
        command: Command,
        rom: Option<&RomId>,
    ) -> Result<(), E> {
        match (command.is_rom_command(), rom) {
            // only MATCH_ROM is let through with an id
            (true, Some(rom)) => self.select_rom(delay, rom),
            (true, None) => self.write_command(delay, command),
            (false, Some(rom)) => {
                self.select_rom(delay, rom)?;
                self.write_command(delay, command)
            }
            (false, None) => {
                self.skip(delay)?;
                self.write_command(delay, command)
            }
        }
    }

    pub fn skip(&mut self, delay: &mut impl DelayNs) -> Result<(), E> {
        self.write_command(delay, Command::SkipRom)
    }

    pub fn select_rom(&mut self, delay: &mut impl DelayNs, rom: &RomId) -> Result<(), E> {
        self.write_command(delay, Command::MatchRom)?;
        self.write_bytes(delay, rom.as_ref())
    }

    /// Issues read slots until the device releases the line or `bound_us` passes
    pub fn wait_while_busy(
        &mut self,
        delay: &mut impl DelayNs,
        bound_us: u32,
    ) -> Result<(), Error<E>> {
        let interval_us = self.config.poll_interval_us;
        let step_us = self.config.timing.read_slot_us() + interval_us;
        let mut elapsed_us = 0u32;
        loop {
            if self.read_bit(delay)? {
                log::trace!("device ready after ~{}us", elapsed_us);
                return Ok(());
            }
            elapsed_us = elapsed_us.saturating_add(step_us);
            if elapsed_us > bound_us {
                log::warn!("device still busy after {}us", bound_us);
                return Err(Error::BusyTimeout);
            }
            delay.delay_us(interval_us);
        }
    }

    /// Performs a reset and requires a presence pulse
    pub fn reset(&mut self, delay: &mut impl DelayNs) -> Result<(), Error<E>> {
        if self.detect_presence(delay)? {
            Ok(())
        } else {
            log::warn!("no presence pulse after reset");
            Err(Error::NoDevice)
        }
    }

    /// Performs a reset and listens for a presence pulse
    /// Returns Err(WireFault) if the wire seems to be shortened,
    /// Ok(true) if presence pulse has been received and Ok(false)
    /// if no other device was detected but the wire seems to be ok
    pub fn detect_presence(&mut self, delay: &mut impl DelayNs) -> Result<bool, Error<E>> {
        let timing = self.config.timing;
        self.release()?;
        self.ensure_wire_high(delay)?;

        let presence = critical_section::with(|_| -> Result<bool, E> {
            self.drive_low()?;
            timing.delay(delay, timing.reset_low);
            self.release()?;
            timing.delay(delay, timing.presence_sample);
            Ok(!self.read_level()?)
        })?;
        timing.delay(delay, timing.reset_recovery);

        log::trace!("reset: presence {}", presence);
        Ok(presence)
    }

    fn ensure_wire_high(&mut self, delay: &mut impl DelayNs) -> Result<(), Error<E>> {
        let timing = self.config.timing;
        for _ in 0..125 {
            if self.read_level()? {
                return Ok(());
            }
            timing.delay(delay, timing.wire_high_poll);
        }
        log::warn!("bus held low, not starting a reset");
        Err(Error::WireFault)
    }

    pub fn read_bytes(&mut self, delay: &mut impl DelayNs, dst: &mut [u8]) -> Result<(), E> {
        for d in dst {
            *d = self.read_byte(delay)?;
        }
        Ok(())
    }

    pub fn read_byte(&mut self, delay: &mut impl DelayNs) -> Result<u8, E> {
        let mut byte = 0_u8;
        for _ in 0..8 {
            byte >>= 1;
            if self.read_bit(delay)? {
                byte |= 0x80;
            }
        }
        Ok(byte)
    }

    pub fn read_bit(&mut self, delay: &mut impl DelayNs) -> Result<bool, E> {
        let timing = self.config.timing;
        let val = critical_section::with(|_| -> Result<bool, E> {
            self.drive_low()?;
            timing.delay(delay, timing.read_init_low);
            self.release()?;
            timing.delay(delay, timing.read_sample);
            self.read_level()
        })?;
        timing.delay(delay, timing.read_recovery);
        Ok(val)
    }

    pub fn write_command(&mut self, delay: &mut impl DelayNs, cmd: impl OpCode) -> Result<(), E> {
        self.write_byte(delay, cmd.op_code())
    }

    pub fn write_bytes(&mut self, delay: &mut impl DelayNs, bytes: &[u8]) -> Result<(), E> {
        for b in bytes {
            self.write_byte(delay, *b)?;
        }
        Ok(())
    }

    pub fn write_byte(&mut self, delay: &mut impl DelayNs, byte: u8) -> Result<(), E> {
        let mut byte = byte;
        for _ in 0..8 {
            self.write_bit(delay, (byte & 0x01) == 0x01)?;
            byte >>= 1;
        }
        Ok(())
    }

    pub fn write_bit(&mut self, delay: &mut impl DelayNs, high: bool) -> Result<(), E> {
        let timing = self.config.timing;
        let (low, recovery) = if high {
            (timing.write_one_low, timing.write_one_recovery)
        } else {
            (timing.write_zero_low, timing.write_zero_recovery)
        };
        critical_section::with(|_| -> Result<(), E> {
            self.drive_low()?;
            timing.delay(delay, low);
            self.release()
        })?;
        timing.delay(delay, recovery);
        Ok(())
    }

    /// Samples the line every `interval` ticks into `levels` (`true` = high)
    ///
    /// Only listens: a DS18B20 drives data solely in read slots the master
    /// starts, use [`Driver::capture_read_slots`] for that. The whole capture
    /// runs with interrupts disabled; keep it short.
    pub fn capture_levels(
        &mut self,
        delay: &mut impl DelayNs,
        levels: &mut [bool],
        interval: u32,
    ) -> Result<(), E> {
        let timing = self.config.timing;
        critical_section::with(|_| -> Result<(), E> {
            for level in levels.iter_mut() {
                *level = self.read_level()?;
                timing.delay(delay, interval);
            }
            Ok(())
        })
    }

    /// Starts a read slot every `slot_samples` samples and captures the line
    /// every `interval` ticks, the master's own falling edge included.
    ///
    /// A 1 leaves a low run as long as the slot's initiation pulse, a 0 the
    /// device's much longer one, so [`runs_from_levels`](crate::pulse::runs_from_levels)
    /// yields one run per slot. `slot_samples * interval` has to cover a full
    /// slot, recovery included.
    pub fn capture_read_slots(
        &mut self,
        delay: &mut impl DelayNs,
        levels: &mut [bool],
        slot_samples: usize,
        interval: u32,
    ) -> Result<(), Error<E>> {
        let timing = self.config.timing;
        let interval = interval.max(1);
        let release_at = timing.read_init_low.div_ceil(interval).max(1) as usize;
        if slot_samples <= release_at {
            return Err(Error::InvalidParameter(
                "read slot shorter than its initiation pulse",
            ));
        }

        critical_section::with(|_| -> Result<(), E> {
            for slot in levels.chunks_mut(slot_samples) {
                self.drive_low()?;
                for (i, level) in slot.iter_mut().enumerate() {
                    if i == release_at {
                        self.release()?;
                    }
                    *level = self.read_level()?;
                    timing.delay(delay, interval);
                }
                self.release()?;
            }
            Ok(())
        })?;
        Ok(())
    }

    #[inline(always)]
    fn drive_low(&mut self) -> Result<(), E> {
        self.io_wire.drive_low()
    }

    #[inline(always)]
    fn release(&mut self) -> Result<(), E> {
        self.io_wire.release()
    }

    #[inline(always)]
    fn read_level(&mut self) -> Result<bool, E> {
        self.io_wire.read_level()
    }
}

/// Rejects requests that cannot form a valid bus exchange, before touching the bus
fn check_request<E: Debug>(
    command: Command,
    rom: Option<&RomId>,
    payload: &[u8],
) -> Result<(), Error<E>> {
    match (command, rom) {
        (Command::SearchRom | Command::AlarmSearch, _) => {
            Err(Error::InvalidParameter("rom search is not supported"))
        }
        (Command::MatchRom, None) => Err(Error::InvalidParameter("match rom needs a rom id")),
        (Command::ReadRom | Command::SkipRom, Some(_)) => Err(Error::InvalidParameter(
            "rom id given to a command that does not address",
        )),
        (Command::WriteScratch, _) => check_scratch_payload(payload),
        _ if !payload.is_empty() => Err(Error::InvalidParameter(
            "only a scratchpad write carries a payload",
        )),
        _ => Ok(()),
    }
}

/// Lowest and highest alarm the device can trigger on, in °C
pub const ALARM_RANGE: (i8, i8) = (-55, 125);

pub(crate) fn check_alarm<E: Debug>(alarm: i8) -> Result<(), Error<E>> {
    if alarm < ALARM_RANGE.0 || alarm > ALARM_RANGE.1 {
        Err(Error::InvalidParameter("alarm out of -55..=125"))
    } else {
        Ok(())
    }
}

fn check_scratch_payload<E: Debug>(payload: &[u8]) -> Result<(), Error<E>> {
    match payload {
        [high, low, config] => {
            check_alarm::<E>(*high as i8)?;
            check_alarm::<E>(*low as i8)?;
            Resolution::try_from(*config)
                .map(|_| ())
                .map_err(|_| Error::InvalidParameter("configuration byte holds no resolution"))
        }
        _ => Err(Error::InvalidParameter(
            "scratchpad write takes TH, TL and configuration",
        )),
    }
}

fn carries_crc(command: Command, len: usize) -> bool {
    matches!(
        (command, len),
        (Command::ReadRom, RomId::BYTES) | (Command::ReadScratch, crate::Scratchpad::BYTES)
    )
}
