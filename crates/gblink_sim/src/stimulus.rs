//! Scripted stimulus for the link-port testbench.
//!
//! [`apply_initial`] writes the power-on table before the first macro-step.
//! [`StimulusSchedule`] decides, from the macro-step index alone, the level
//! of every other driven pin: reset for a fixed prefix, a one-step SC write
//! pulse, a start/clock-enable level that stays on, and a free-running
//! external serial clock.

use gblink_config::{InitialStimulus, RunSection};

use crate::error::SimError;
use crate::model::CircuitModel;

/// Names of the link-port pins the driver writes.
pub mod pins {
    /// Primary system clock.
    pub const CLK: &str = "clk";
    /// Synchronous reset, active high.
    pub const RST: &str = "rst";
    /// SC register select.
    pub const SEL_SC: &str = "sel_sc";
    /// CPU write strobe, active low.
    pub const CPU_WR_N: &str = "cpu_wr_n";
    /// Transfer start bit.
    pub const SC_START_IN: &str = "sc_start_in";
    /// Internal clock select bit.
    pub const SC_INT_CLOCK_IN: &str = "sc_int_clock_in";
    /// External serial clock.
    pub const SERIAL_CLK_IN: &str = "serial_clk_in";
}

/// Writes every entry of the power-on table to the model.
pub fn apply_initial<M>(model: &mut M, stimulus: &InitialStimulus) -> Result<(), SimError>
where
    M: CircuitModel + ?Sized,
{
    for (pin, value) in stimulus.entries() {
        model.set_input(pin, value)?;
    }
    Ok(())
}

/// Macro-step timing of the level-sensitive stimulus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StimulusSchedule {
    /// Reset is asserted for macro-steps `0..reset_cycles`.
    pub reset_cycles: u64,
    /// The one macro-step on which SC is written.
    pub select_step: u64,
    /// Start and clock-enable are high from this macro-step on.
    pub enable_step: u64,
}

impl Default for StimulusSchedule {
    fn default() -> Self {
        Self::from_config(&RunSection::default())
    }
}

impl StimulusSchedule {
    /// Takes the timing from the `[run]` configuration section.
    pub fn from_config(run: &RunSection) -> Self {
        Self {
            reset_cycles: run.reset_cycles,
            select_step: run.select_step,
            enable_step: run.enable_step,
        }
    }

    /// Reset level during macro-step `step`.
    pub fn reset_asserted(&self, step: u64) -> bool {
        step < self.reset_cycles
    }

    /// SC select level written after macro-step `step`.
    pub fn select_asserted(&self, step: u64) -> bool {
        step == self.select_step
    }

    /// Start and clock-enable level written after macro-step `step`.
    pub fn enable_asserted(&self, step: u64) -> bool {
        step >= self.enable_step
    }

    /// Drives the reset pin for macro-step `step`.
    pub fn apply_reset<M>(&self, model: &mut M, step: u64) -> Result<(), SimError>
    where
        M: CircuitModel + ?Sized,
    {
        model.set_level(pins::RST, self.reset_asserted(step))
    }

    /// Drives the pins updated after both half-steps of macro-step `step`.
    pub fn apply_after_step<M>(&self, model: &mut M, step: u64) -> Result<(), SimError>
    where
        M: CircuitModel + ?Sized,
    {
        let select = self.select_asserted(step);
        model.set_level(pins::SEL_SC, select)?;
        model.set_level(pins::CPU_WR_N, !select)?;

        let enable = self.enable_asserted(step);
        model.set_level(pins::SC_INT_CLOCK_IN, enable)?;
        model.set_level(pins::SC_START_IN, enable)?;

        model.toggle(pins::SERIAL_CLK_IN)?;
        Ok(())
    }
}
