//! Simulation error types for the stimulus driver.
//!
//! All errors that can occur while building, driving, or tracing a circuit
//! model are represented as variants of [`SimError`].

use std::io;

/// Errors that can occur during simulation setup or execution.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    /// A pin name does not exist on the model.
    #[error("unknown pin '{0}'")]
    UnknownPin(String),

    /// A pin exists but cannot be driven (it is an output or internal signal).
    #[error("pin '{0}' is not an input")]
    NotAnInput(String),

    /// A value does not fit in the pin it was assigned to.
    #[error("value {value:#x} does not fit in {width}-bit pin '{pin}'")]
    ValueTooWide {
        /// The pin being assigned.
        pin: String,
        /// The pin width in bits.
        width: u32,
        /// The rejected value.
        value: u64,
    },

    /// A trace was attached before waveform capture was switched on.
    #[error("waveform capture is not enabled; call enable_capture() before attaching a trace")]
    CaptureDisabled,

    /// A trace sink was attached to a model twice.
    #[error("trace is already attached")]
    AlreadyAttached,

    /// A trace sink was dumped before being attached to a model.
    #[error("trace is not attached to a model")]
    NotAttached,

    /// A dump was requested after the trace was closed.
    #[error("trace is closed")]
    TraceClosed,

    /// Dump timestamps must strictly increase.
    #[error("non-monotonic trace time: {time} after {previous}")]
    NonMonotonicTime {
        /// The last timestamp written.
        previous: u64,
        /// The rejected timestamp.
        time: u64,
    },

    /// A timescale string could not be parsed.
    #[error("invalid timescale '{0}' (use 1, 10 or 100 followed by s, ms, us, ns, ps or fs)")]
    InvalidTimescale(String),

    /// A runtime plus-argument had an unusable value.
    #[error("invalid plusarg +{name}: {reason}")]
    InvalidPlusArg {
        /// The plus-argument name.
        name: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// An I/O error occurred while writing trace data.
    #[error("trace I/O error: {0}")]
    TraceIo(#[from] io::Error),
}
