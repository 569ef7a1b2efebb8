//! Clocked stimulus driver and waveform capture for a Game Boy link-port model.
//!
//! The crate drives a cycle-accurate [`CircuitModel`] through a scripted
//! schedule: the clock toggles every half-step, reset is held for a short
//! prefix, an SC register write fires once, and the transfer start and clock
//! enable lines rise and stay high. After every clock edge the model is
//! evaluated, and before every edge its full state is dumped to a
//! [`TraceSink`].
//!
//! # Usage
//!
//! ```ignore
//! use gblink_config::RunConfig;
//! use gblink_sim::{enable_capture, Driver, LinkModel, VcdTrace};
//!
//! let config = RunConfig::default();
//! let mut driver = Driver::from_config(LinkModel::default(), &config.run);
//! enable_capture();
//! let trace = VcdTrace::create("link.vcd".as_ref(), Default::default(), false)?;
//! driver.attach_trace(trace, config.trace.depth)?;
//! driver.initialize(&config.stimulus)?;
//! let report = driver.run()?;
//! ```
//!
//! # Modules
//!
//! - `error`: Simulation error types
//! - `value`: Two-state pin values and signal declarations
//! - `time`: Tick-based simulated time and VCD timescales
//! - `model`: The circuit-model trait and pin storage
//! - `capture`: Process-wide one-shot waveform capture switch
//! - `plusargs`: `+name=value` runtime arguments
//! - `link`: Behavioural Game Boy link-port model
//! - `waveform`: Trace sinks (VCD, in-memory)
//! - `stimulus`: Power-on table and per-step stimulus schedule
//! - `driver`: The time-stepping loop

#![warn(missing_docs)]

pub mod capture;
pub mod driver;
pub mod error;
pub mod link;
pub mod model;
pub mod plusargs;
pub mod stimulus;
pub mod time;
pub mod value;
pub mod waveform;

pub use capture::{capture_enabled, enable_capture};
pub use driver::{Driver, RunReport};
pub use error::SimError;
pub use link::{LinkModel, LinkParams};
pub use model::{CircuitModel, PinBank};
pub use plusargs::PlusArgs;
pub use stimulus::{apply_initial, StimulusSchedule};
pub use time::{SimTime, TimeUnit, Timescale};
pub use value::{Direction, PinValue, SignalDecl};
pub use waveform::{MemoryTrace, Sample, TraceFile, TraceOutput, TraceSink, VcdTrace};
