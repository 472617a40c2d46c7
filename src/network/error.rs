//! The error type for building and computing networks.

use super::connection::ConnectionId;
use super::neuron::NeuronId;

/// An error while building, computing, or encoding a
/// [`FreeformNetwork`][crate::network::FreeformNetwork].
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// A neuron ID does not refer to a neuron of the network.
    #[error("neuron {} does not exist", .0.as_usize())]
    InvalidNeuron(NeuronId),
    /// A connection ID does not refer to a connection of the network.
    #[error("connection {} does not exist", .0.as_usize())]
    InvalidConnection(ConnectionId),
    /// A layer ID does not refer to a layer of the network.
    #[error("layer {0} does not exist")]
    InvalidLayer(usize),
    /// The network has no input layer, or a second one was requested.
    #[error("the network must have exactly one input layer")]
    InputLayer,
    /// The network has no output layer, or a second one was requested.
    #[error("the network must have exactly one output layer")]
    OutputLayer,
    /// A connection targets a neuron that does not sum its inputs (an input, bias, or context
    /// neuron).
    #[error("neuron {} cannot receive connections", .0.as_usize())]
    NotComputed(NeuronId),
    /// A connection from a neuron to itself.
    #[error("neuron {} cannot connect to itself", .0.as_usize())]
    SelfConnection(NeuronId),
    /// The non-recurrent connections form a cycle through the given neuron.
    #[error("connections form a cycle through neuron {}", .0.as_usize())]
    Cycle(NeuronId),
    /// The wrong number of input values was given to the network.
    #[error("expected {expected} inputs, got {actual}")]
    InputSize {
        /// The number of input neurons.
        expected: usize,
        /// The number of values given.
        actual: usize,
    },
    /// An encoded weight array does not have one value per connection.
    #[error("expected an encoded array of length {expected}, got {actual}")]
    EncodedLength {
        /// The number of connections.
        expected: usize,
        /// The length of the array given.
        actual: usize,
    },
}
