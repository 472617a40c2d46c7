//! Weighted connections between neurons.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::neuron::NeuronId;

/// The ID of a [`Connection`] in a [`FreeformNetwork`][crate::network::FreeformNetwork].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ConnectionId(usize);

impl ConnectionId {
    /// Returns a new `ConnectionId` with the given id.
    pub fn new(id: usize) -> Self {
        Self(id)
    }

    /// Returns this `ConnectionId` as a `usize`.
    pub fn as_usize(&self) -> usize {
        self.0
    }
}

/// Per-connection training memory.
///
/// Backpropagation only uses `gradient` and `last_weight_delta` (its momentum term). Resilient
/// propagation uses all four values.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ConnectionScratch {
    /// The gradient accumulated since the last weight update.
    pub gradient: f64,
    /// The gradient used by the previous weight update.
    pub last_gradient: f64,
    /// The current update magnitude.
    pub update: f64,
    /// The weight change applied by the previous weight update.
    pub last_weight_delta: f64,
}

/// A directed, weighted edge from a source neuron to a target neuron.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Connection {
    source: NeuronId,
    target: NeuronId,
    weight: f64,
    #[cfg_attr(feature = "serde", serde(skip))]
    scratch: ConnectionScratch,
}

impl Connection {
    pub(crate) fn new(source: NeuronId, target: NeuronId, weight: f64) -> Self {
        Self {
            source,
            target,
            weight,
            scratch: ConnectionScratch::default(),
        }
    }

    /// Returns the id of the source neuron.
    pub fn source(&self) -> NeuronId {
        self.source
    }

    /// Returns the id of the target neuron.
    pub fn target(&self) -> NeuronId {
        self.target
    }

    /// Returns the weight of this `Connection`.
    pub fn weight(&self) -> f64 {
        self.weight
    }

    /// Returns the training memory of this `Connection`.
    pub fn scratch(&self) -> &ConnectionScratch {
        &self.scratch
    }

    pub(crate) fn set_weight(&mut self, weight: f64) {
        self.weight = weight;
    }

    pub(crate) fn add_weight(&mut self, delta: f64) {
        self.weight += delta;
    }

    pub(crate) fn mut_scratch(&mut self) -> &mut ConnectionScratch {
        &mut self.scratch
    }
}
