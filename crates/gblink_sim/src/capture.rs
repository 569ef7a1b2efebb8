//! Process-wide waveform capture switch.
//!
//! Capture starts off and can be switched on exactly once; there is no way
//! to switch it back off. Trace sinks refuse to attach while it is off.

use std::sync::OnceLock;

static CAPTURE: OnceLock<()> = OnceLock::new();

/// Switches waveform capture on for the rest of the process.
///
/// Returns `true` if this call performed the transition and `false` if
/// capture was already on.
pub fn enable_capture() -> bool {
    let mut first = false;
    CAPTURE.get_or_init(|| {
        first = true;
    });
    if first {
        tracing::debug!("waveform capture enabled");
    }
    first
}

/// Returns whether [`enable_capture`] has been called.
pub fn capture_enabled() -> bool {
    CAPTURE.get().is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enable_is_sticky_and_idempotent() {
        enable_capture();
        assert!(capture_enabled());
        assert!(!enable_capture());
        assert!(capture_enabled());
    }
}
