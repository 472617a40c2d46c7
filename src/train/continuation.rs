//! Saved training memory.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The per-connection training memory of a paused [`FreeformPropagation`] trainer, in connection
/// order.
///
/// A continuation can only resume a trainer using the same learning rule on a network with the
/// same number of connections.
///
/// [`FreeformPropagation`]: super::FreeformPropagation
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TrainingContinuation {
    method: String,
    last_gradients: Vec<f64>,
    updates: Vec<f64>,
    last_weight_deltas: Vec<f64>,
}

impl TrainingContinuation {
    pub(crate) fn new(
        method: &str,
        last_gradients: Vec<f64>,
        updates: Vec<f64>,
        last_weight_deltas: Vec<f64>,
    ) -> Self {
        Self {
            method: method.to_string(),
            last_gradients,
            updates,
            last_weight_deltas,
        }
    }

    /// Returns the name of the learning rule that created this continuation.
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Returns the gradient each connection used in its latest update.
    pub fn last_gradients(&self) -> &[f64] {
        &self.last_gradients
    }

    /// Returns the step size of each connection.
    pub fn updates(&self) -> &[f64] {
        &self.updates
    }

    /// Returns the latest weight change of each connection.
    pub fn last_weight_deltas(&self) -> &[f64] {
        &self.last_weight_deltas
    }
}
