//! The circuit-model capability set the driver is written against.
//!
//! A [`CircuitModel`] exposes named pins, a single `eval` step that
//! propagates the current inputs through its logic, and a finish-request
//! flag. [`PinBank`] is the storage most models build on: declarations plus
//! current values, with name lookup and width checking.

use crate::error::SimError;
use crate::value::{fits, Direction, PinValue, SignalDecl};

/// A cycle-accurate circuit model that can be driven pin by pin.
pub trait CircuitModel {
    /// Top-level module name, used as the root trace scope.
    fn name(&self) -> &str;

    /// Every signal the model exposes, in a stable order.
    fn signals(&self) -> &[SignalDecl];

    /// Assigns an input pin. The new value takes effect on the next [`eval`](Self::eval).
    fn set_input(&mut self, pin: &str, value: u64) -> Result<(), SimError>;

    /// Returns the current value of an input pin.
    fn input(&self, pin: &str) -> Result<PinValue, SimError>;

    /// Propagates the current inputs through the model's logic.
    fn eval(&mut self);

    /// Whether the model's own logic has requested the simulation to stop.
    fn got_finish(&self) -> bool;

    /// Writes the current value of every signal into `out`, in
    /// [`signals`](Self::signals) order.
    fn sample(&self, out: &mut Vec<PinValue>);

    /// Drives a single-bit input high or low.
    fn set_level(&mut self, pin: &str, level: bool) -> Result<(), SimError> {
        self.set_input(pin, u64::from(level))
    }

    /// Inverts a single-bit input and returns the new level.
    fn toggle(&mut self, pin: &str) -> Result<bool, SimError> {
        let level = !self.input(pin)?.is_high();
        self.set_level(pin, level)?;
        Ok(level)
    }
}

/// Declarations and current values of a model's signals.
#[derive(Debug, Clone)]
pub struct PinBank {
    decls: Vec<SignalDecl>,
    values: Vec<PinValue>,
}

impl PinBank {
    /// Creates a bank with every signal at zero.
    pub fn new(decls: Vec<SignalDecl>) -> Self {
        let values = decls.iter().map(|d| PinValue::new(d.width, 0)).collect();
        Self { decls, values }
    }

    /// Declarations in index order.
    pub fn decls(&self) -> &[SignalDecl] {
        &self.decls
    }

    /// Looks up a signal by leaf name.
    pub fn index(&self, name: &str) -> Result<usize, SimError> {
        self.decls
            .iter()
            .position(|d| d.name == name)
            .ok_or_else(|| SimError::UnknownPin(name.to_string()))
    }

    /// Value at `index`.
    pub fn get(&self, index: usize) -> PinValue {
        self.values[index]
    }

    /// Stores `bits` at `index`, truncated to the signal width.
    pub fn put(&mut self, index: usize, bits: u64) {
        self.values[index] = PinValue::new(self.decls[index].width, bits);
    }

    /// Assigns an input by name, rejecting outputs and over-wide values.
    pub fn set_input(&mut self, name: &str, value: u64) -> Result<(), SimError> {
        let index = self.index(name)?;
        let decl = &self.decls[index];
        if decl.direction != Direction::Input {
            return Err(SimError::NotAnInput(name.to_string()));
        }
        if !fits(decl.width, value) {
            return Err(SimError::ValueTooWide {
                pin: name.to_string(),
                width: decl.width,
                value,
            });
        }
        self.put(index, value);
        Ok(())
    }

    /// Returns the value of an input by name.
    pub fn input(&self, name: &str) -> Result<PinValue, SimError> {
        let index = self.index(name)?;
        if self.decls[index].direction != Direction::Input {
            return Err(SimError::NotAnInput(name.to_string()));
        }
        Ok(self.values[index])
    }

    /// Copies every value into `out`.
    pub fn sample(&self, out: &mut Vec<PinValue>) {
        out.clear();
        out.extend_from_slice(&self.values);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bank() -> PinBank {
        PinBank::new(vec![
            SignalDecl::new("clk", 1, Direction::Input, "top"),
            SignalDecl::new("data", 8, Direction::Input, "top"),
            SignalDecl::new("q", 1, Direction::Output, "top"),
        ])
    }

    #[test]
    fn starts_at_zero() {
        let b = bank();
        assert!(!b.get(0).is_high());
        assert_eq!(b.get(1).bits(), 0);
    }

    #[test]
    fn set_and_read_input() {
        let mut b = bank();
        b.set_input("data", 0xCC).unwrap();
        assert_eq!(b.input("data").unwrap().bits(), 0xCC);
    }

    #[test]
    fn unknown_pin_rejected() {
        let mut b = bank();
        assert!(matches!(
            b.set_input("nope", 1),
            Err(SimError::UnknownPin(ref n)) if n == "nope"
        ));
    }

    #[test]
    fn output_not_assignable() {
        let mut b = bank();
        assert!(matches!(b.set_input("q", 1), Err(SimError::NotAnInput(_))));
        assert!(matches!(b.input("q"), Err(SimError::NotAnInput(_))));
    }

    #[test]
    fn too_wide_rejected() {
        let mut b = bank();
        let err = b.set_input("clk", 2).unwrap_err();
        assert!(matches!(err, SimError::ValueTooWide { width: 1, value: 2, .. }));
    }

    #[test]
    fn sample_in_declaration_order() {
        let mut b = bank();
        b.set_input("clk", 1).unwrap();
        b.set_input("data", 0x5A).unwrap();
        let mut out = vec![PinValue::from_bool(false); 7];
        b.sample(&mut out);
        assert_eq!(out.len(), 3);
        assert!(out[0].is_high());
        assert_eq!(out[1].bits(), 0x5A);
    }
}
