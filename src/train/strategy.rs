//! Weight update rules.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::rprop::RpropParams;
use super::TrainError;
use crate::network::ConnectionScratch;

/// The constants of plain backpropagation.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BackpropParams {
    /// How much of the gradient is applied.
    pub learning_rate: f64,
    /// How much of the previous weight change is applied again.
    pub momentum: f64,
}

impl BackpropParams {
    /// Returns the weight change for one connection and remembers it for the momentum term. The
    /// gradient accumulator is zeroed.
    pub fn learn(&self, scratch: &mut ConnectionScratch) -> f64 {
        let delta = self.learning_rate * scratch.gradient + self.momentum * scratch.last_weight_delta;
        scratch.last_weight_delta = delta;
        scratch.gradient = 0.0;
        delta
    }

    fn validate(&self) -> Result<(), TrainError> {
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(TrainError::InvalidParameter(format!(
                "learning rate must be positive, got {}",
                self.learning_rate
            )));
        }
        if !(self.momentum.is_finite() && self.momentum >= 0.0) {
            return Err(TrainError::InvalidParameter(format!(
                "momentum must not be negative, got {}",
                self.momentum
            )));
        }
        Ok(())
    }
}

/// How accumulated gradients are turned into weight changes.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum LearningRule {
    /// Gradient descent with a learning rate and momentum.
    Backpropagation(BackpropParams),
    /// Resilient propagation.
    Resilient(RpropParams),
}

impl LearningRule {
    /// Returns the name stored in training continuations.
    pub fn name(&self) -> &'static str {
        match self {
            LearningRule::Backpropagation(_) => "backpropagation",
            LearningRule::Resilient(_) => "resilient",
        }
    }

    /// Updates the training memory of one connection and returns its weight change.
    #[inline]
    pub fn learn(&self, scratch: &mut ConnectionScratch) -> f64 {
        match self {
            LearningRule::Backpropagation(params) => params.learn(scratch),
            LearningRule::Resilient(params) => params.learn(scratch),
        }
    }

    /// Sets up fresh training memory for one connection.
    pub(crate) fn prepare(&self, scratch: &mut ConnectionScratch) {
        *scratch = ConnectionScratch::default();
        if let LearningRule::Resilient(params) = self {
            scratch.update = params.initial_update;
        }
    }

    pub(crate) fn validate(&self) -> Result<(), TrainError> {
        match self {
            LearningRule::Backpropagation(params) => params.validate(),
            LearningRule::Resilient(params) => params.validate(),
        }
    }
}
