//! The clocked stimulus driver.
//!
//! A [`Driver`] owns one circuit model and an optional trace sink and runs
//! a fixed number of macro-steps. Each macro-step sets reset, then performs
//! two half-steps (dump the trace, toggle `clk`, evaluate), then applies the
//! post-step stimulus and checks the model's finish request. Simulated time
//! advances by one tick per half-step, so macro-step `i` is sampled at ticks
//! `2i` and `2i + 1`.
//!
//! The trace is closed on every exit path: normal completion, an early
//! finish requested by the model, and errors.

use gblink_config::{InitialStimulus, RunSection};
use serde::Serialize;

use crate::error::SimError;
use crate::model::CircuitModel;
use crate::stimulus::{apply_initial, pins, StimulusSchedule};
use crate::time::SimTime;
use crate::waveform::TraceSink;

/// Clock half-steps per macro-step.
pub const HALF_STEPS: u64 = 2;

/// Summary of a finished run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    /// Macro-steps fully executed.
    pub steps_completed: u64,
    /// Samples written to the trace (zero without a trace).
    pub samples: u64,
    /// Whether the model requested the run to stop before the step budget.
    pub finished_early: bool,
    /// Simulated time reached when the run stopped.
    pub final_time: SimTime,
}

/// Drives a [`CircuitModel`] through the scripted stimulus schedule.
pub struct Driver<M: CircuitModel, T: TraceSink> {
    model: M,
    trace: Option<T>,
    schedule: StimulusSchedule,
    steps: u64,
}

impl<M: CircuitModel, T: TraceSink> Driver<M, T> {
    /// Creates a driver that runs `steps` macro-steps without a trace.
    pub fn new(model: M, schedule: StimulusSchedule, steps: u64) -> Self {
        Self {
            model,
            trace: None,
            schedule,
            steps,
        }
    }

    /// Creates a driver from the `[run]` configuration section.
    pub fn from_config(model: M, run: &RunSection) -> Self {
        Self::new(model, StimulusSchedule::from_config(run), run.steps)
    }

    /// Binds `trace` to the model, capturing `depth` hierarchy levels.
    ///
    /// Waveform capture must already be enabled.
    pub fn attach_trace(&mut self, mut trace: T, depth: u32) -> Result<(), SimError> {
        if self.trace.is_some() {
            return Err(SimError::AlreadyAttached);
        }
        trace.attach(&self.model, depth)?;
        self.trace = Some(trace);
        Ok(())
    }

    /// Applies the power-on stimulus table.
    pub fn initialize(&mut self, stimulus: &InitialStimulus) -> Result<(), SimError> {
        apply_initial(&mut self.model, stimulus)
    }

    /// The driven model.
    pub fn model(&self) -> &M {
        &self.model
    }

    /// The attached trace, if any.
    pub fn trace(&self) -> Option<&T> {
        self.trace.as_ref()
    }

    /// Consumes the driver, returning the model and trace.
    pub fn into_parts(self) -> (M, Option<T>) {
        (self.model, self.trace)
    }

    /// Runs the schedule to the step budget or the model's finish request.
    pub fn run(&mut self) -> Result<RunReport, SimError> {
        tracing::info!(
            model = self.model.name(),
            steps = self.steps,
            traced = self.trace.is_some(),
            "starting simulation"
        );

        let outcome = self.run_steps();
        let closed = self.close_trace();
        let mut report = outcome?;
        closed?;

        report.samples = self.trace.as_ref().map_or(0, |t| t.samples());
        if report.finished_early {
            tracing::info!(
                steps = report.steps_completed,
                time = %report.final_time,
                "model requested finish"
            );
        } else {
            tracing::info!(
                steps = report.steps_completed,
                time = %report.final_time,
                "simulation complete"
            );
        }
        Ok(report)
    }

    fn run_steps(&mut self) -> Result<RunReport, SimError> {
        let mut report = RunReport::default();

        for step in 0..self.steps {
            self.schedule.apply_reset(&mut self.model, step)?;
            if step == self.schedule.reset_cycles {
                tracing::debug!(step, "reset released");
            }

            for half in 0..HALF_STEPS {
                let time = SimTime::at_half_step(step, half);
                if let Some(trace) = &mut self.trace {
                    trace.dump(time, &self.model)?;
                }
                self.model.toggle(pins::CLK)?;
                self.model.eval();
            }

            self.schedule.apply_after_step(&mut self.model, step)?;
            if step == self.schedule.select_step {
                tracing::debug!(step, "SC write strobe");
            }
            if step == self.schedule.enable_step {
                tracing::debug!(step, "start and clock enable raised");
            }

            report.steps_completed = step + 1;
            report.final_time = SimTime::from_ticks(report.steps_completed * HALF_STEPS);

            if self.model.got_finish() {
                report.finished_early = true;
                break;
            }
        }
        Ok(report)
    }

    fn close_trace(&mut self) -> Result<(), SimError> {
        match &mut self.trace {
            Some(trace) => trace.close(),
            None => Ok(()),
        }
    }
}
