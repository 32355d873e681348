//! Decoding of bulk-captured line levels.
//!
//! A capture taken with [`Driver::capture_levels`](crate::Driver::capture_levels)
//! is a run of line samples at a fixed rate. [`runs_from_levels`] turns it into
//! the length of every low pulse, and [`PulseDecoder`] splits those lengths into
//! short pulses (data 1) and long pulses (data 0) at the midpoint between the
//! shortest and the longest one.

use crate::Error;
use core::fmt::Debug;

/// Collects the lengths of consecutive low samples.
///
/// Leading high samples are skipped, a low run still open at the end of the
/// capture is dropped, and at most `runs.len()` runs are stored.
pub fn runs_from_levels(levels: &[bool], runs: &mut [u32]) -> usize {
    let mut count = 0;
    let mut length = 0u32;
    for &high in levels {
        if !high {
            length += 1;
        } else if length > 0 {
            if count < runs.len() {
                runs[count] = length;
                count += 1;
            }
            length = 0;
        }
    }
    count
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PulseDecoder {
    threshold: u32,
}

impl PulseDecoder {
    /// `None` unless the runs contain both a short and a long pulse
    pub fn new(runs: &[u32]) -> Option<Self> {
        let shortest = runs.iter().copied().min()?;
        let longest = runs.iter().copied().max()?;
        if shortest == longest {
            return None;
        }
        Some(Self {
            threshold: shortest + (longest - shortest) / 2,
        })
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    /// Short low pulses carry a 1
    pub fn decode_bit(&self, run: u32) -> bool {
        run < self.threshold
    }
}

/// Decodes runs into `bits`, returning how many bits were written
pub fn decode_pulse_widths<E: Debug>(runs: &[u32], bits: &mut [bool]) -> Result<usize, Error<E>> {
    let decoder = PulseDecoder::new(runs).ok_or(Error::AmbiguousTiming)?;
    let mut count = 0;
    for (bit, run) in bits.iter_mut().zip(runs) {
        *bit = decoder.decode_bit(*run);
        count += 1;
    }
    Ok(count)
}

/// Packs bits into bytes in bus order, least significant bit first.
/// A trailing partial byte is dropped.
pub fn pack_bits_lsb_first(bits: &[bool], bytes: &mut [u8]) -> usize {
    let mut count = 0;
    for (byte, chunk) in bytes.iter_mut().zip(bits.chunks_exact(8)) {
        *byte = chunk
            .iter()
            .enumerate()
            .fold(0u8, |acc, (i, bit)| acc | ((*bit as u8) << i));
        count += 1;
    }
    count
}
