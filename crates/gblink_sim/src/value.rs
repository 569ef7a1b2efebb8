//! Two-state pin values and signal declarations.
//!
//! The driver only ever deals in definite 0/1 levels, so a [`PinValue`] is a
//! masked `u64` together with its bit width. Models describe what they expose
//! through [`SignalDecl`]s, which trace sinks use to build the waveform
//! hierarchy.

/// Maximum width of a single pin.
pub const MAX_PIN_WIDTH: u32 = 64;

/// A two-state value of a pin or internal signal.
///
/// Bits above `width` are always zero.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct PinValue {
    width: u32,
    bits: u64,
}

impl PinValue {
    /// Creates a value of the given width, discarding bits above it.
    ///
    /// # Panics
    ///
    /// Panics if `width` is zero or larger than [`MAX_PIN_WIDTH`].
    pub fn new(width: u32, bits: u64) -> Self {
        assert!(
            (1..=MAX_PIN_WIDTH).contains(&width),
            "pin width {width} out of range"
        );
        Self {
            width,
            bits: bits & mask(width),
        }
    }

    /// Creates a single-bit value.
    pub fn from_bool(value: bool) -> Self {
        Self {
            width: 1,
            bits: u64::from(value),
        }
    }

    /// Returns the width in bits.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns the raw bits.
    pub fn bits(&self) -> u64 {
        self.bits
    }

    /// Returns true if any bit is set.
    pub fn is_high(&self) -> bool {
        self.bits != 0
    }
}

/// Returns a mask with the low `width` bits set.
pub fn mask(width: u32) -> u64 {
    if width >= 64 {
        u64::MAX
    } else {
        (1u64 << width) - 1
    }
}

/// Returns true if `value` fits in `width` bits.
pub fn fits(width: u32, value: u64) -> bool {
    value & !mask(width) == 0
}

/// Direction of a signal as seen from the driver.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Driven by the testbench.
    Input,
    /// Driven by the model.
    Output,
    /// Model-internal state, visible only in traces.
    Internal,
}

/// A named signal exposed by a circuit model.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignalDecl {
    /// Leaf name (e.g. `"clk"`).
    pub name: String,
    /// Bit width.
    pub width: u32,
    /// Who drives the signal.
    pub direction: Direction,
    /// Dot-separated hierarchical scope (e.g. `"link.sio"`).
    pub scope: String,
}

impl SignalDecl {
    /// Creates a declaration.
    pub fn new(name: &str, width: u32, direction: Direction, scope: &str) -> Self {
        Self {
            name: name.to_string(),
            width,
            direction,
            scope: scope.to_string(),
        }
    }

    /// Number of scope levels above the signal; a top-level port has depth 1.
    pub fn depth(&self) -> u32 {
        self.scope.split('.').filter(|s| !s.is_empty()).count() as u32
    }

    /// Full hierarchical name (`scope.name`).
    pub fn path(&self) -> String {
        if self.scope.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.scope, self.name)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_masks_high_bits() {
        let v = PinValue::new(4, 0xFF);
        assert_eq!(v.bits(), 0xF);
        assert_eq!(v.width(), 4);
    }

    #[test]
    fn full_width_value() {
        let v = PinValue::new(64, u64::MAX);
        assert_eq!(v.bits(), u64::MAX);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn zero_width_panics() {
        let _ = PinValue::new(0, 0);
    }

    #[test]
    fn from_bool_values() {
        assert!(PinValue::from_bool(true).is_high());
        assert!(!PinValue::from_bool(false).is_high());
        assert_eq!(PinValue::from_bool(true).width(), 1);
    }

    #[test]
    fn fits_checks_width() {
        assert!(fits(1, 1));
        assert!(!fits(1, 2));
        assert!(fits(8, 0xFF));
        assert!(!fits(8, 0x100));
        assert!(fits(64, u64::MAX));
    }

    #[test]
    fn decl_depth_and_path() {
        let port = SignalDecl::new("clk", 1, Direction::Input, "link");
        assert_eq!(port.depth(), 1);
        assert_eq!(port.path(), "link.clk");

        let internal = SignalDecl::new("bit_count", 4, Direction::Internal, "link.sio");
        assert_eq!(internal.depth(), 2);
        assert_eq!(internal.path(), "link.sio.bit_count");
    }
}
