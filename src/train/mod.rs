//! Gradient-based training of freeform networks.
//!
//! [`FreeformPropagation`] runs epochs over a [`TrainingSet`][crate::data::TrainingSet]: every
//! pair is computed, its error is propagated back by the [`GradientCalculator`], and the
//! [`BatchController`] decides when the accumulated gradients are turned into weight changes by
//! the [`LearningRule`].

mod batch;
mod continuation;
mod gradient;
mod propagation;
mod rprop;
mod strategy;

pub use batch::BatchController;
pub use continuation::TrainingContinuation;
pub use gradient::{GradientCalculator, FLAT_SPOT};
pub use propagation::FreeformPropagation;
pub use rprop::RpropParams;
pub use strategy::{BackpropParams, LearningRule};

use crate::activation::Activation;
use crate::network;

/// A trainer that improves a model one iteration at a time.
pub trait Train {
    /// The error returned when an iteration fails.
    type Error;

    /// Runs one training iteration (an epoch, or a generation of a population).
    fn iteration(&mut self) -> Result<(), Self::Error>;

    /// Returns the error after the latest iteration.
    fn error(&self) -> f64;

    /// Returns the number of iterations run so far.
    fn iteration_number(&self) -> usize;

    /// Runs iterations until the error is at most `target` or `max_iterations` have run. Returns
    /// whether the target was reached.
    fn train_to_error(&mut self, target: f64, max_iterations: usize) -> Result<bool, Self::Error> {
        for _ in 0..max_iterations {
            self.iteration()?;
            if self.error() <= target {
                return Ok(true);
            }
        }

        Ok(false)
    }
}

/// An error while setting up or running propagation training.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum TrainError {
    /// The network could not be computed.
    #[error(transparent)]
    Network(#[from] network::Error),
    /// The training set inputs do not match the network inputs.
    #[error("the network expects {expected} inputs, the training set has {actual}")]
    InputSize {
        /// The number of network inputs.
        expected: usize,
        /// The input size of the training set.
        actual: usize,
    },
    /// The training set ideals do not match the network outputs.
    #[error("the network produces {expected} outputs, the training set has {actual} ideals")]
    IdealSize {
        /// The number of network outputs.
        expected: usize,
        /// The ideal size of the training set.
        actual: usize,
    },
    /// A computed neuron uses an activation function without a derivative.
    #[error("activation function {0:?} has no derivative and cannot be trained by propagation")]
    NoDerivative(Activation),
    /// A training parameter is out of range.
    #[error("invalid training parameter: {0}")]
    InvalidParameter(String),
    /// A continuation was created by a different learning rule.
    #[error("cannot resume {expected} training from a {found} continuation")]
    ContinuationMethod {
        /// The learning rule of the trainer.
        expected: String,
        /// The learning rule of the continuation.
        found: String,
    },
    /// A continuation does not hold one value per connection.
    #[error("continuation holds {actual} values per array, the network has {expected} connections")]
    ContinuationLength {
        /// The number of connections.
        expected: usize,
        /// The length of the mismatched array.
        actual: usize,
    },
}
