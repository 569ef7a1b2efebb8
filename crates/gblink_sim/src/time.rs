//! Simulated time as a tick counter, and the timescale one tick stands for.
//!
//! The driver advances time by exactly one tick per clock half-step, so
//! [`SimTime`] is a plain monotonic counter. [`Timescale`] only matters when
//! the ticks are written to a waveform file.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::error::SimError;

/// A point in simulated time, counted in half-step ticks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct SimTime(u64);

impl SimTime {
    /// Time zero.
    pub const ZERO: SimTime = SimTime(0);

    /// Creates a time from a raw tick count.
    pub fn from_ticks(ticks: u64) -> Self {
        Self(ticks)
    }

    /// Time of half-step `half` within macro-step `step`: `2 * step + half`.
    pub fn at_half_step(step: u64, half: u64) -> Self {
        debug_assert!(half < 2, "half-step index {half} out of range");
        Self(2 * step + half)
    }

    /// Returns the raw tick count.
    pub fn ticks(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ticks", self.0)
    }
}

/// Unit part of a [`Timescale`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TimeUnit {
    /// Seconds.
    S,
    /// Milliseconds.
    Ms,
    /// Microseconds.
    Us,
    /// Nanoseconds.
    Ns,
    /// Picoseconds.
    Ps,
    /// Femtoseconds.
    Fs,
}

impl TimeUnit {
    fn as_str(self) -> &'static str {
        match self {
            TimeUnit::S => "s",
            TimeUnit::Ms => "ms",
            TimeUnit::Us => "us",
            TimeUnit::Ns => "ns",
            TimeUnit::Ps => "ps",
            TimeUnit::Fs => "fs",
        }
    }
}

/// The real duration of one tick, as written to a VCD `$timescale` block.
///
/// IEEE 1364 allows magnitudes of 1, 10 or 100 only.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Timescale {
    /// 1, 10 or 100.
    pub magnitude: u32,
    /// Unit.
    pub unit: TimeUnit,
}

impl Default for Timescale {
    fn default() -> Self {
        Self {
            magnitude: 1,
            unit: TimeUnit::Ps,
        }
    }
}

impl FromStr for Timescale {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digit_end = trimmed
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(trimmed.len());
        let invalid = || SimError::InvalidTimescale(s.to_string());

        let magnitude = match &trimmed[..digit_end] {
            "1" => 1,
            "10" => 10,
            "100" => 100,
            _ => return Err(invalid()),
        };
        let unit = match trimmed[digit_end..].trim() {
            "s" => TimeUnit::S,
            "ms" => TimeUnit::Ms,
            "us" => TimeUnit::Us,
            "ns" => TimeUnit::Ns,
            "ps" => TimeUnit::Ps,
            "fs" => TimeUnit::Fs,
            _ => return Err(invalid()),
        };
        Ok(Self { magnitude, unit })
    }
}

impl fmt::Display for Timescale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.magnitude, self.unit.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_time() {
        assert_eq!(SimTime::ZERO.ticks(), 0);
        assert_eq!(SimTime::default(), SimTime::ZERO);
    }

    #[test]
    fn half_step_times() {
        assert_eq!(SimTime::at_half_step(0, 0).ticks(), 0);
        assert_eq!(SimTime::at_half_step(0, 1).ticks(), 1);
        assert_eq!(SimTime::at_half_step(7, 0).ticks(), 14);
        assert_eq!(SimTime::at_half_step(7, 1).ticks(), 15);
    }

    #[test]
    fn ordering() {
        assert!(SimTime::from_ticks(1) < SimTime::from_ticks(2));
    }

    #[test]
    fn display_ticks() {
        assert_eq!(SimTime::from_ticks(10).to_string(), "10 ticks");
    }

    #[test]
    fn parse_timescales() {
        assert_eq!(
            "1ps".parse::<Timescale>().unwrap(),
            Timescale {
                magnitude: 1,
                unit: TimeUnit::Ps
            }
        );
        assert_eq!(
            "10ns".parse::<Timescale>().unwrap(),
            Timescale {
                magnitude: 10,
                unit: TimeUnit::Ns
            }
        );
        assert_eq!("100 us".parse::<Timescale>().unwrap().magnitude, 100);
    }

    #[test]
    fn reject_bad_magnitude() {
        assert!(matches!(
            "5ns".parse::<Timescale>(),
            Err(SimError::InvalidTimescale(_))
        ));
    }

    #[test]
    fn reject_bad_unit() {
        assert!("1xs".parse::<Timescale>().is_err());
        assert!("ns".parse::<Timescale>().is_err());
        assert!("".parse::<Timescale>().is_err());
    }

    #[test]
    fn display_roundtrip() {
        for s in ["1s", "10ms", "100us", "1ns", "10ps", "100fs"] {
            assert_eq!(s.parse::<Timescale>().unwrap().to_string(), s);
        }
    }

    #[test]
    fn serializes_as_plain_ticks() {
        let t = SimTime::from_ticks(12345);
        assert_eq!(serde_json::to_string(&t).unwrap(), "12345");
    }
}
