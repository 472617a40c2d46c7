//! Neurons of a [`FreeformNetwork`][crate::network::FreeformNetwork].

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::connection::ConnectionId;
use crate::activation::Activation;

/// The ID of a [`Neuron`] in a [`FreeformNetwork`][crate::network::FreeformNetwork].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NeuronId(pub(super) usize);

impl NeuronId {
    /// Returns a new `NeuronId` with the given id.
    pub fn new(id: usize) -> Self {
        Self(id)
    }

    /// Returns this `NeuronId` as a `usize`.
    pub fn as_usize(&self) -> usize {
        self.0
    }
}

/// The role a [`Neuron`] plays in the network.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum NeuronKind {
    /// Receives one value of the network input.
    Input,
    /// Outputs a constant activation.
    Bias,
    /// Outputs the activation its source neuron had during the previous network computation.
    Context {
        /// The neuron whose activation is remembered.
        source: NeuronId,
    },
    /// Computes its activation from the weighted sum of its incoming connections.
    Computed,
}

/// The incoming connections of a computed neuron together with the activation function applied to
/// their weighted sum.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct InputSummation {
    inputs: Vec<ConnectionId>,
    activation: Activation,
}

impl InputSummation {
    pub(crate) fn new(activation: Activation) -> Self {
        Self {
            inputs: Vec::new(),
            activation,
        }
    }

    /// Returns the incoming connections, in the order they were added.
    pub fn inputs(&self) -> &[ConnectionId] {
        &self.inputs
    }

    /// Returns the activation function.
    pub fn activation(&self) -> Activation {
        self.activation
    }

    pub(crate) fn push_input(&mut self, id: ConnectionId) {
        self.inputs.push(id);
    }

    pub(crate) fn set_activation(&mut self, activation: Activation) {
        self.activation = activation;
    }

    /// Forgets every input connection with an index of at least `first`.
    pub(crate) fn drop_inputs_from(&mut self, first: usize) {
        self.inputs.retain(|id| id.as_usize() < first);
    }
}

/// Per-neuron training memory.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NeuronScratch {
    /// The error delta of the neuron for the training pair being processed.
    pub delta: f64,
}

/// A neuron.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Neuron {
    id: NeuronId,
    kind: NeuronKind,
    // The activation from the latest computation, or the constant of a bias neuron
    activation: f64,
    // The weighted input sum from the latest computation
    sum: f64,
    // For context neurons, the value that becomes `activation` on the next computation
    pending: f64,
    // Only set for computed neurons
    summation: Option<InputSummation>,
    outputs: Vec<ConnectionId>,
    #[cfg_attr(feature = "serde", serde(skip))]
    scratch: NeuronScratch,
}

impl Neuron {
    pub(crate) fn new(id: NeuronId, kind: NeuronKind) -> Self {
        Self {
            id,
            kind,
            activation: 0.0,
            sum: 0.0,
            pending: 0.0,
            summation: None,
            outputs: Vec::new(),
            scratch: NeuronScratch::default(),
        }
    }

    pub(crate) fn bias(id: NeuronId, activation: f64) -> Self {
        let mut neuron = Self::new(id, NeuronKind::Bias);
        neuron.activation = activation;
        neuron
    }

    /// Returns the id of this `Neuron`.
    pub fn id(&self) -> NeuronId {
        self.id
    }

    /// Returns the kind of this `Neuron`.
    pub fn kind(&self) -> NeuronKind {
        self.kind
    }

    /// Returns whether this is a bias neuron.
    pub fn is_bias(&self) -> bool {
        matches!(self.kind, NeuronKind::Bias)
    }

    /// Returns whether this is a context neuron.
    pub fn is_context(&self) -> bool {
        matches!(self.kind, NeuronKind::Context { .. })
    }

    /// Returns the activation of this `Neuron` from the latest network computation.
    pub fn activation(&self) -> f64 {
        self.activation
    }

    /// Returns the weighted input sum of this `Neuron` from the latest network computation.
    pub fn sum(&self) -> f64 {
        self.sum
    }

    /// Returns the input summation if this is a computed neuron.
    pub fn summation(&self) -> Option<&InputSummation> {
        self.summation.as_ref()
    }

    /// Returns the outgoing connections of this `Neuron`.
    pub fn outputs(&self) -> &[ConnectionId] {
        &self.outputs
    }

    /// Returns the training memory of this `Neuron`.
    pub fn scratch(&self) -> &NeuronScratch {
        &self.scratch
    }

    pub(crate) fn mut_scratch(&mut self) -> &mut NeuronScratch {
        &mut self.scratch
    }

    pub(crate) fn set_activation(&mut self, activation: f64) {
        self.activation = activation;
    }

    pub(crate) fn set_computed(&mut self, sum: f64, activation: f64) {
        self.sum = sum;
        self.activation = activation;
    }

    pub(crate) fn pending(&self) -> f64 {
        self.pending
    }

    pub(crate) fn set_pending(&mut self, value: f64) {
        self.pending = value;
    }

    pub(crate) fn mut_summation(&mut self) -> Option<&mut InputSummation> {
        self.summation.as_mut()
    }

    pub(crate) fn set_summation(&mut self, summation: InputSummation) {
        self.summation = Some(summation);
    }

    pub(crate) fn push_output(&mut self, id: ConnectionId) {
        self.outputs.push(id);
    }

    /// Forgets every output connection with an index of at least `first`.
    pub(crate) fn drop_outputs_from(&mut self, first: usize) {
        self.outputs.retain(|id| id.as_usize() < first);
    }
}
