//! Accumulation of network error over a set of training pairs.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// How an accumulated error is reported.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ErrorMode {
    /// Mean squared error.
    #[default]
    Mse,
    /// Root mean squared error.
    Rms,
    /// Sum of squared errors, halved.
    Ess,
}

/// Accumulates squared differences between actual and ideal outputs.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ErrorCalculation {
    global_error: f64,
    set_size: usize,
}

impl ErrorCalculation {
    /// Returns a new, empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the error of one output vector. Each difference is scaled by `significance` before it
    /// is squared.
    pub fn update_error(&mut self, actual: &[f64], ideal: &[f64], significance: f64) {
        for (a, i) in actual.iter().zip(ideal) {
            let delta = (i - a) * significance;
            self.global_error += delta * delta;
        }
        self.set_size += ideal.len();
    }

    /// Adds the error of a single output value.
    pub fn update_error_single(&mut self, actual: f64, ideal: f64) {
        let delta = ideal - actual;
        self.global_error += delta * delta;
        self.set_size += 1;
    }

    /// Returns the accumulated error in the given mode. An empty accumulator has an error of zero.
    pub fn calculate(&self, mode: ErrorMode) -> f64 {
        match mode {
            ErrorMode::Mse => self.calculate_mse(),
            ErrorMode::Rms => self.calculate_rms(),
            ErrorMode::Ess => self.calculate_ess(),
        }
    }

    /// Returns the mean squared error.
    pub fn calculate_mse(&self) -> f64 {
        if self.set_size == 0 {
            return 0.0;
        }
        self.global_error / self.set_size as f64
    }

    /// Returns the root mean squared error.
    pub fn calculate_rms(&self) -> f64 {
        self.calculate_mse().sqrt()
    }

    /// Returns half the sum of squared errors.
    pub fn calculate_ess(&self) -> f64 {
        if self.set_size == 0 {
            return 0.0;
        }
        self.global_error / 2.0
    }

    /// Returns the number of output values accumulated.
    pub fn set_size(&self) -> usize {
        self.set_size
    }

    /// Clears the accumulated error.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
