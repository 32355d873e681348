use embedded_hal::delay::DelayNs;

/// Standard-speed protocol windows, in microseconds.
pub mod us {
    pub const RESET_LOW: u32 = 480;
    // Presence pulse starts 15-60us after release and lasts 60-240us.
    pub const PRESENCE_SAMPLE: u32 = 70;
    pub const RESET_RECOVERY: u32 = RESET_LOW - PRESENCE_SAMPLE;

    pub const SLOT: u32 = 65;
    pub const WRITE_ZERO_LOW: u32 = 60;
    pub const WRITE_ONE_LOW: u32 = 6;

    pub const READ_INIT_LOW: u32 = 3;
    pub const READ_SAMPLE: u32 = 9;
    pub const READ_RECOVERY: u32 = SLOT - READ_INIT_LOW - READ_SAMPLE;

    pub const WIRE_HIGH_POLL: u32 = 2;
}

/// Bus timing calibrated to the host's delay tick.
///
/// Protocol windows are fixed in microseconds; the tick counts stored here are
/// what the host actually waits. A tick of 1000ns makes ticks and microseconds
/// coincide, slower or faster delay sources pick their own `tick_ns`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    tick_ns: u32,
    pub reset_low: u32,
    pub presence_sample: u32,
    pub reset_recovery: u32,
    pub write_zero_low: u32,
    pub write_zero_recovery: u32,
    pub write_one_low: u32,
    pub write_one_recovery: u32,
    pub read_init_low: u32,
    pub read_sample: u32,
    pub read_recovery: u32,
    pub wire_high_poll: u32,
}

impl Default for Timing {
    fn default() -> Self {
        Self::standard()
    }
}

impl Timing {
    /// Standard-speed timing on a 1us tick
    pub const fn standard() -> Self {
        Self::calibrated(1_000)
    }

    /// Standard-speed timing for a delay source whose tick lasts `tick_ns`
    pub const fn calibrated(tick_ns: u32) -> Self {
        let tick_ns = if tick_ns == 0 { 1 } else { tick_ns };
        Self {
            tick_ns,
            reset_low: ticks(us::RESET_LOW, tick_ns),
            presence_sample: ticks(us::PRESENCE_SAMPLE, tick_ns),
            reset_recovery: ticks(us::RESET_RECOVERY, tick_ns),
            write_zero_low: ticks(us::WRITE_ZERO_LOW, tick_ns),
            write_zero_recovery: ticks(us::SLOT - us::WRITE_ZERO_LOW, tick_ns),
            write_one_low: ticks(us::WRITE_ONE_LOW, tick_ns),
            write_one_recovery: ticks(us::SLOT - us::WRITE_ONE_LOW, tick_ns),
            read_init_low: ticks(us::READ_INIT_LOW, tick_ns),
            read_sample: ticks(us::READ_SAMPLE, tick_ns),
            read_recovery: ticks(us::READ_RECOVERY, tick_ns),
            wire_high_poll: ticks(us::WIRE_HIGH_POLL, tick_ns),
        }
    }

    pub fn tick_ns(&self) -> u32 {
        self.tick_ns
    }

    /// Blocks for `ticks` ticks
    #[inline(always)]
    pub fn delay(&self, delay: &mut impl DelayNs, ticks: u32) {
        delay.delay_ns(ticks.saturating_mul(self.tick_ns));
    }

    /// Converts a tick count back into whole microseconds
    pub fn to_us(&self, ticks: u32) -> u32 {
        ((ticks as u64 * self.tick_ns as u64) / 1_000) as u32
    }

    /// Duration of one read slot, used to account busy-polling time
    pub fn read_slot_us(&self) -> u32 {
        self.to_us(self.read_init_low + self.read_sample + self.read_recovery)
    }
}

/// Rounds up so a window is never shorter than the protocol minimum.
const fn ticks(us: u32, tick_ns: u32) -> u32 {
    let ns = us as u64 * 1_000;
    ((ns + tick_ns as u64 - 1) / tick_ns as u64) as u32
}

#[cfg(test)]
mod tests {
    use super::{us, Timing};

    #[test]
    fn standard_ticks_are_microseconds() {
        let timing = Timing::standard();
        assert_eq!(timing.reset_low, 480);
        assert_eq!(timing.presence_sample, 70);
        assert_eq!(timing.reset_recovery, 410);
        assert_eq!(timing.write_zero_low, 60);
        assert_eq!(timing.write_one_low, 6);
        assert_eq!(timing.write_one_low + timing.write_one_recovery, us::SLOT);
        assert_eq!(timing.write_zero_low + timing.write_zero_recovery, us::SLOT);
        assert_eq!(timing.read_slot_us(), us::SLOT);
    }

    #[test]
    fn calibrated_ticks_round_up() {
        // 30ns tick: 6us = 200 ticks, 3us = 100 ticks
        let timing = Timing::calibrated(30);
        assert_eq!(timing.write_one_low, 200);
        assert_eq!(timing.read_init_low, 100);
        assert_eq!(timing.to_us(timing.reset_low), 480);

        // 7ns tick does not divide 6000ns evenly
        let timing = Timing::calibrated(7);
        assert_eq!(timing.write_one_low, 858);
        assert!(timing.to_us(timing.write_one_low) >= 6);
    }

    #[test]
    fn zero_tick_is_clamped() {
        let timing = Timing::calibrated(0);
        assert_eq!(timing.tick_ns(), 1);
        assert_eq!(timing.reset_low, 480_000);
    }
}
