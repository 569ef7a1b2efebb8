//! Configuration types deserialized from `gblink.toml`.

use serde::{Deserialize, Serialize};

/// The full run configuration.
///
/// Every section is optional. Missing sections and missing fields take the
/// values of the reference link-port testbench.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
pub struct RunConfig {
    /// Step budget and stimulus timing.
    #[serde(default)]
    pub run: RunSection,
    /// Waveform trace output.
    #[serde(default)]
    pub trace: TraceSection,
    /// Power-on values for every driven pin.
    #[serde(default)]
    pub stimulus: InitialStimulus,
    /// Parameters of the built-in link-port model.
    #[serde(default)]
    pub model: ModelSection,
}

/// Scheduling parameters of the main loop, all counted in macro-steps.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct RunSection {
    /// Number of macro-steps (full clock periods) to run.
    pub steps: u64,
    /// Reset is asserted for macro-steps `0..reset_cycles`.
    pub reset_cycles: u64,
    /// The single macro-step on which the SC register write strobe fires.
    pub select_step: u64,
    /// First macro-step from which the start and clock-enable lines stay high.
    pub enable_step: u64,
}

impl Default for RunSection {
    fn default() -> Self {
        Self {
            steps: 5000,
            reset_cycles: 2,
            select_step: 2,
            enable_step: 2,
        }
    }
}

/// Waveform trace output settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct TraceSection {
    /// Whether a trace file is written at all.
    pub enabled: bool,
    /// Output path of the trace file.
    pub path: String,
    /// Maximum hierarchy depth captured in the trace.
    pub depth: u32,
    /// VCD timescale of one simulated tick (e.g. `"1ps"`, `"10ns"`).
    pub timescale: String,
    /// Gzip-compress the trace output.
    pub compress: bool,
}

impl Default for TraceSection {
    fn default() -> Self {
        Self {
            enabled: true,
            path: "link.vcd".to_string(),
            depth: 5000,
            timescale: "1ps".to_string(),
            compress: false,
        }
    }
}

/// Power-on stimulus table: one field per driven pin of the link port.
///
/// These are the values applied before macro-step 0. Single-bit pins hold
/// `0` or `1`; `sb_in` is the 8-bit serial data byte.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct InitialStimulus {
    /// Primary system clock.
    pub clk: u64,
    /// Synchronous reset, active high.
    pub rst: u64,
    /// Parallel data loaded into the SB shift register.
    pub sb_in: u64,
    /// SC register select.
    pub sel_sc: u64,
    /// CPU write strobe, active low.
    pub cpu_wr_n: u64,
    /// Transfer start bit written to SC.
    pub sc_start_in: u64,
    /// Internal clock select bit written to SC.
    pub sc_int_clock_in: u64,
    /// Externally supplied serial clock.
    pub serial_clk_in: u64,
    /// Externally supplied serial data.
    pub serial_data_in: u64,
}

impl Default for InitialStimulus {
    fn default() -> Self {
        Self {
            clk: 1,
            rst: 1,
            sb_in: 0xCC,
            sel_sc: 0,
            cpu_wr_n: 1,
            sc_start_in: 0,
            sc_int_clock_in: 0,
            serial_clk_in: 0,
            serial_data_in: 0,
        }
    }
}

impl InitialStimulus {
    /// Returns `(pin name, value)` pairs in a fixed order.
    pub fn entries(&self) -> [(&'static str, u64); 9] {
        [
            ("clk", self.clk),
            ("rst", self.rst),
            ("sb_in", self.sb_in),
            ("sel_sc", self.sel_sc),
            ("cpu_wr_n", self.cpu_wr_n),
            ("sc_start_in", self.sc_start_in),
            ("sc_int_clock_in", self.sc_int_clock_in),
            ("serial_clk_in", self.serial_clk_in),
            ("serial_data_in", self.serial_data_in),
        ]
    }
}

/// Parameters of the built-in link-port model.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ModelSection {
    /// System clocks per half period of the internal serial clock.
    pub serial_half_period: u32,
    /// Request simulation finish after this many completed transfers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finish_after_transfers: Option<u32>,
}

impl Default for ModelSection {
    fn default() -> Self {
        Self {
            serial_half_period: 256,
            finish_after_transfers: None,
        }
    }
}
