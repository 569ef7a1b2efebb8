//! Behavioural model of the Game Boy serial link port.
//!
//! The port holds an 8-bit shift register (SB) and a control register (SC).
//! A CPU write to SC with the start bit set loads SB from `sb_in` and shifts
//! it out MSB first: data changes on the falling edge of the serial clock
//! and `serial_data_in` is sampled on the rising edge. After eight bits the
//! start bit clears and `serial_irq` pulses for one system clock.
//!
//! The serial clock is either generated internally by dividing `clk`, or
//! taken from `serial_clk_in` when SC selects the external clock. All state
//! changes happen on the rising edge of `clk`; reset is synchronous.

use gblink_config::ModelSection;

use crate::error::SimError;
use crate::model::{CircuitModel, PinBank};
use crate::plusargs::PlusArgs;
use crate::value::{Direction, PinValue, SignalDecl};

const SCOPE: &str = "link";
const SIO_SCOPE: &str = "link.sio";

const CLK: usize = 0;
const RST: usize = 1;
const SB_IN: usize = 2;
const SEL_SC: usize = 3;
const CPU_WR_N: usize = 4;
const SC_START_IN: usize = 5;
const SC_INT_CLOCK_IN: usize = 6;
const SERIAL_CLK_IN: usize = 7;
const SERIAL_DATA_IN: usize = 8;
const SB: usize = 9;
const SC_START: usize = 10;
const SC_INT_CLOCK: usize = 11;
const SERIAL_CLK_OUT: usize = 12;
const SERIAL_DATA_OUT: usize = 13;
const SERIAL_IRQ: usize = 14;
const BIT_COUNT: usize = 15;
const DIVIDER: usize = 16;

fn link_signals() -> Vec<SignalDecl> {
    use Direction::{Input, Internal, Output};
    vec![
        SignalDecl::new("clk", 1, Input, SCOPE),
        SignalDecl::new("rst", 1, Input, SCOPE),
        SignalDecl::new("sb_in", 8, Input, SCOPE),
        SignalDecl::new("sel_sc", 1, Input, SCOPE),
        SignalDecl::new("cpu_wr_n", 1, Input, SCOPE),
        SignalDecl::new("sc_start_in", 1, Input, SCOPE),
        SignalDecl::new("sc_int_clock_in", 1, Input, SCOPE),
        SignalDecl::new("serial_clk_in", 1, Input, SCOPE),
        SignalDecl::new("serial_data_in", 1, Input, SCOPE),
        SignalDecl::new("sb", 8, Output, SCOPE),
        SignalDecl::new("sc_start", 1, Output, SCOPE),
        SignalDecl::new("sc_int_clock", 1, Output, SCOPE),
        SignalDecl::new("serial_clk_out", 1, Output, SCOPE),
        SignalDecl::new("serial_data_out", 1, Output, SCOPE),
        SignalDecl::new("serial_irq", 1, Output, SCOPE),
        SignalDecl::new("bit_count", 4, Internal, SIO_SCOPE),
        SignalDecl::new("divider", 32, Internal, SIO_SCOPE),
    ]
}

/// Construction parameters of [`LinkModel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkParams {
    /// System clocks per half period of the internal serial clock.
    pub serial_half_period: u32,
    /// Raise the finish request once this many transfers have completed.
    /// Zero never triggers; the config and plusarg layers reject it.
    pub finish_after_transfers: Option<u32>,
}

impl Default for LinkParams {
    fn default() -> Self {
        Self::from_config(&ModelSection::default())
    }
}

impl LinkParams {
    /// Takes parameters from the `[model]` configuration section.
    pub fn from_config(section: &ModelSection) -> Self {
        Self {
            serial_half_period: section.serial_half_period,
            finish_after_transfers: section.finish_after_transfers,
        }
    }

    /// Overrides parameters from `+serial_half_period=N` and
    /// `+finish_after_transfers=N`.
    pub fn with_plusargs(mut self, args: &PlusArgs) -> Result<Self, SimError> {
        if let Some(period) = args.parse_value::<u32>("serial_half_period")? {
            if period == 0 {
                return Err(SimError::InvalidPlusArg {
                    name: "serial_half_period".to_string(),
                    reason: "must be non-zero".to_string(),
                });
            }
            self.serial_half_period = period;
        }
        if let Some(n) = args.parse_value::<u32>("finish_after_transfers")? {
            if n == 0 {
                return Err(SimError::InvalidPlusArg {
                    name: "finish_after_transfers".to_string(),
                    reason: "must be non-zero".to_string(),
                });
            }
            self.finish_after_transfers = Some(n);
        }
        Ok(self)
    }
}

/// Registered state of the port, updated on rising `clk` edges.
#[derive(Debug, Clone, Default)]
struct LinkState {
    sb: u8,
    sc_start: bool,
    sc_int_clock: bool,
    serial_clk: bool,
    serial_data_out: bool,
    irq: bool,
    bit_count: u8,
    divider: u32,
    prev_clk: bool,
    prev_serial_clk_in: bool,
    transfers: u32,
    finish: bool,
}

/// The link-port circuit model.
#[derive(Debug, Clone)]
pub struct LinkModel {
    params: LinkParams,
    pins: PinBank,
    state: LinkState,
}

impl LinkModel {
    /// Creates a model with every input low and the serial clock idle.
    pub fn new(params: LinkParams) -> Self {
        let mut model = Self {
            params,
            pins: PinBank::new(link_signals()),
            state: LinkState {
                serial_clk: true,
                ..LinkState::default()
            },
        };
        model.drive_outputs();
        model
    }

    /// Number of completed 8-bit transfers.
    pub fn transfers_completed(&self) -> u32 {
        self.state.transfers
    }

    /// Current contents of the SB shift register.
    pub fn sb(&self) -> u8 {
        self.state.sb
    }

    /// Whether a transfer is in progress.
    pub fn transfer_active(&self) -> bool {
        self.state.sc_start
    }

    fn level(&self, index: usize) -> bool {
        self.pins.get(index).is_high()
    }

    /// One rising edge of `clk`.
    fn clock_edge(&mut self) {
        let serial_clk_in = self.level(SERIAL_CLK_IN);
        let prev_serial_clk_in =
            std::mem::replace(&mut self.state.prev_serial_clk_in, serial_clk_in);

        if self.level(RST) {
            self.state = LinkState {
                sb: self.pins.get(SB_IN).bits() as u8,
                serial_clk: true,
                prev_clk: self.state.prev_clk,
                prev_serial_clk_in: serial_clk_in,
                transfers: self.state.transfers,
                finish: self.state.finish,
                ..LinkState::default()
            };
            return;
        }

        self.state.irq = false;

        if self.level(SEL_SC) && !self.level(CPU_WR_N) {
            self.write_sc();
            return;
        }
        if !self.state.sc_start {
            return;
        }

        let (falling, rising) = if self.state.sc_int_clock {
            self.state.divider += 1;
            if self.state.divider >= self.params.serial_half_period {
                self.state.divider = 0;
                self.state.serial_clk = !self.state.serial_clk;
                (!self.state.serial_clk, self.state.serial_clk)
            } else {
                (false, false)
            }
        } else {
            (
                prev_serial_clk_in && !serial_clk_in,
                !prev_serial_clk_in && serial_clk_in,
            )
        };

        if falling {
            self.state.serial_data_out = self.state.sb & 0x80 != 0;
        }
        if rising {
            self.shift_in();
        }
    }

    fn write_sc(&mut self) {
        self.state.sc_start = self.level(SC_START_IN);
        self.state.sc_int_clock = self.level(SC_INT_CLOCK_IN);
        if self.state.sc_start {
            self.state.sb = self.pins.get(SB_IN).bits() as u8;
            self.state.bit_count = 0;
            self.state.divider = 0;
            self.state.serial_clk = true;
            tracing::debug!(
                sb = self.state.sb,
                internal_clock = self.state.sc_int_clock,
                "serial transfer started"
            );
        }
    }

    fn shift_in(&mut self) {
        let data_in = u8::from(self.level(SERIAL_DATA_IN));
        self.state.sb = (self.state.sb << 1) | data_in;
        self.state.bit_count += 1;
        if self.state.bit_count < 8 {
            return;
        }

        self.state.bit_count = 0;
        self.state.sc_start = false;
        self.state.serial_clk = true;
        self.state.irq = true;
        self.state.transfers += 1;
        tracing::debug!(
            sb = self.state.sb,
            transfers = self.state.transfers,
            "serial transfer complete"
        );

        if let Some(limit) = self.params.finish_after_transfers {
            if self.state.transfers >= limit {
                self.state.finish = true;
            }
        }
    }

    fn drive_outputs(&mut self) {
        let s = &self.state;
        let serial_clk_out = !(s.sc_start && s.sc_int_clock) || s.serial_clk;
        let values = [
            (SB, u64::from(s.sb)),
            (SC_START, u64::from(s.sc_start)),
            (SC_INT_CLOCK, u64::from(s.sc_int_clock)),
            (SERIAL_CLK_OUT, u64::from(serial_clk_out)),
            (SERIAL_DATA_OUT, u64::from(s.serial_data_out)),
            (SERIAL_IRQ, u64::from(s.irq)),
            (BIT_COUNT, u64::from(s.bit_count)),
            (DIVIDER, u64::from(s.divider)),
        ];
        for (index, bits) in values {
            self.pins.put(index, bits);
        }
    }
}

impl Default for LinkModel {
    fn default() -> Self {
        Self::new(LinkParams::default())
    }
}

impl CircuitModel for LinkModel {
    fn name(&self) -> &str {
        SCOPE
    }

    fn signals(&self) -> &[SignalDecl] {
        self.pins.decls()
    }

    fn set_input(&mut self, pin: &str, value: u64) -> Result<(), SimError> {
        self.pins.set_input(pin, value)
    }

    fn input(&self, pin: &str) -> Result<PinValue, SimError> {
        self.pins.input(pin)
    }

    fn eval(&mut self) {
        let clk = self.level(CLK);
        let posedge = clk && !self.state.prev_clk;
        self.state.prev_clk = clk;
        if posedge {
            self.clock_edge();
        }
        self.drive_outputs();
    }

    fn got_finish(&self) -> bool {
        self.state.finish
    }

    fn sample(&self, out: &mut Vec<PinValue>) {
        self.pins.sample(out);
    }
}
