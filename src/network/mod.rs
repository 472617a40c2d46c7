//! The freeform neural network.
//!
//! A [`FreeformNetwork`] is an explicit graph of [`Neuron`]s joined by weighted [`Connection`]s,
//! rather than a stack of weight matrices. Networks are usually built layer by layer:
//!
//! ```
//! use encog::activation::Activation;
//! use encog::network::FreeformNetwork;
//!
//! let mut network = FreeformNetwork::new();
//! let input = network.create_input_layer(2).unwrap();
//! let hidden = network.create_layer(3);
//! let output = network.create_output_layer(1).unwrap();
//!
//! network.connect_layers(input, hidden, Activation::Sigmoid, 1.0).unwrap();
//! network.connect_layers(hidden, output, Activation::Sigmoid, 1.0).unwrap();
//! network.reset(42);
//!
//! let output = network.compute(&[1.0, 0.0]).unwrap();
//! assert_eq!(1, output.len());
//! ```

mod connection;
mod error;
mod evaluate;
mod neuron;

pub use connection::{Connection, ConnectionId, ConnectionScratch};
pub use error::Error;
pub use neuron::{InputSummation, Neuron, NeuronId, NeuronKind, NeuronScratch};

use std::ops::Index;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::activation::Activation;
use crate::data::TrainingSet;
use crate::error_calc::{ErrorCalculation, ErrorMode};

/// The ID of a layer created by one of the `create_*layer` methods of a [`FreeformNetwork`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct LayerId(usize);

impl LayerId {
    /// Returns this `LayerId` as a `usize`.
    pub fn as_usize(&self) -> usize {
        self.0
    }
}

#[derive(Clone, Debug, PartialEq, Default)]
struct Layer {
    neurons: Vec<NeuronId>,
    bias: Option<NeuronId>,
}

/// A neural network represented as an explicit graph of neurons and weighted connections.
// NOTE: `order` must be rebuilt whenever a connection is added, and the network must be left
//       untouched when a structural change is rejected
#[derive(Clone, Debug, PartialEq, Default)]
pub struct FreeformNetwork {
    neurons: Vec<Neuron>,
    connections: Vec<Connection>,
    layers: Vec<Layer>,
    input_layer: Option<LayerId>,
    output_layer: Option<LayerId>,
    // The computed neurons in evaluation order
    order: Vec<NeuronId>,
}

impl FreeformNetwork {
    /// Returns a new, empty network.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a fully connected feedforward network with a bias neuron on every layer except the
    /// output layer. All weights start at zero; use [`reset`][Self::reset] or
    /// [`randomize`][Self::randomize] before training.
    pub fn feedforward(
        inputs: usize,
        hidden: &[usize],
        outputs: usize,
        activation: Activation,
    ) -> Result<Self, Error> {
        let mut network = Self::new();
        let mut previous = network.create_input_layer(inputs)?;

        for &count in hidden {
            let layer = network.create_layer(count);
            network.connect_layers(previous, layer, activation, 1.0)?;
            previous = layer;
        }

        let output = network.create_output_layer(outputs)?;
        network.connect_layers(previous, output, activation, 1.0)?;

        Ok(network)
    }

    /// Creates the input layer with `count` input neurons.
    pub fn create_input_layer(&mut self, count: usize) -> Result<LayerId, Error> {
        if self.input_layer.is_some() {
            return Err(Error::InputLayer);
        }

        let neurons = (0..count)
            .map(|_| self.push_neuron(|id| Neuron::new(id, NeuronKind::Input)))
            .collect();
        let id = self.push_layer(neurons);
        self.input_layer = Some(id);
        Ok(id)
    }

    /// Creates a layer of `count` computed neurons. Their activation function is set when the
    /// layer is first connected to with [`connect_layers`][Self::connect_layers].
    pub fn create_layer(&mut self, count: usize) -> LayerId {
        let neurons = (0..count)
            .map(|_| self.push_neuron(|id| computed_neuron(id, Activation::Linear)))
            .collect();
        self.push_layer(neurons)
    }

    /// Creates the output layer with `count` computed neurons.
    pub fn create_output_layer(&mut self, count: usize) -> Result<LayerId, Error> {
        if self.output_layer.is_some() {
            return Err(Error::OutputLayer);
        }

        let id = self.create_layer(count);
        self.output_layer = Some(id);
        Ok(id)
    }

    /// Connects every neuron of `source` to every computed neuron of `target`, and sets the
    /// activation function of the `target` neurons.
    ///
    /// If `bias_activation` is non-zero, a bias neuron outputting that constant is first added to
    /// `source` (a layer holds at most one bias neuron; an existing one is reused).
    pub fn connect_layers(
        &mut self,
        source: LayerId,
        target: LayerId,
        activation: Activation,
        bias_activation: f64,
    ) -> Result<(), Error> {
        self.check_layer(source)?;
        let targets = self.computed_in(target)?;

        // Validate before changing anything
        for &t in &targets {
            for &s in &self.layers[source.0].neurons {
                if s == t {
                    return Err(Error::SelfConnection(s));
                }
            }
        }

        let first_neuron = self.neurons.len();
        let first_connection = self.connections.len();
        let previous_activations: Vec<Activation> = targets
            .iter()
            .filter_map(|t| self.neurons[t.0].summation().map(InputSummation::activation))
            .collect();

        if bias_activation != 0.0 && self.layers[source.0].bias.is_none() {
            let bias = self.push_neuron(|id| Neuron::bias(id, bias_activation));
            let layer = &mut self.layers[source.0];
            layer.neurons.push(bias);
            layer.bias = Some(bias);
        }

        for &t in &targets {
            if let Some(summation) = self.neurons[t.0].mut_summation() {
                summation.set_activation(activation);
            }
        }

        let sources = self.layers[source.0].neurons.clone();
        for &t in &targets {
            for &s in &sources {
                self.push_connection(s, t, 0.0);
            }
        }

        if let Err(e) = self.rebuild_order() {
            self.rollback_connections(first_connection);
            for (t, previous) in targets.iter().zip(previous_activations) {
                if let Some(summation) = self.neurons[t.0].mut_summation() {
                    summation.set_activation(previous);
                }
            }
            if self.neurons.len() > first_neuron {
                // The bias neuron added above
                self.neurons.truncate(first_neuron);
                let layer = &mut self.layers[source.0];
                layer.neurons.pop();
                layer.bias = None;
            }
            return Err(e);
        }

        Ok(())
    }

    /// Creates a context layer remembering the previous activations of the non-bias neurons of
    /// `source`, and connects it to `target` using the activation function `target` already has.
    ///
    /// This is how simple recurrent (Elman-style) networks are built.
    pub fn create_context(&mut self, source: LayerId, target: LayerId) -> Result<LayerId, Error> {
        self.check_layer(source)?;
        let targets = self.computed_in(target)?;
        let activation = targets
            .first()
            .and_then(|t| self.neurons[t.0].summation())
            .map(InputSummation::activation)
            .unwrap_or(Activation::Linear);

        let remembered: Vec<NeuronId> = self.layers[source.0]
            .neurons
            .iter()
            .copied()
            .filter(|&id| !self.neurons[id.0].is_bias())
            .collect();
        let context = remembered
            .into_iter()
            .map(|source| self.push_neuron(|id| Neuron::new(id, NeuronKind::Context { source })))
            .collect();
        let context = self.push_layer(context);

        self.connect_layers(context, target, activation, 0.0)?;
        Ok(context)
    }

    /// Adds a computed neuron outside of any layer and returns its id.
    pub fn add_neuron(&mut self, activation: Activation) -> NeuronId {
        self.push_neuron(|id| computed_neuron(id, activation))
    }

    /// Adds a connection from `source` to `target` and returns its id.
    pub fn connect(
        &mut self,
        source: NeuronId,
        target: NeuronId,
        weight: f64,
    ) -> Result<ConnectionId, Error> {
        self.check_neuron(source)?;
        self.check_neuron(target)?;

        if source == target {
            return Err(Error::SelfConnection(source));
        }
        if self.neurons[target.0].summation().is_none() {
            return Err(Error::NotComputed(target));
        }

        let first_new = self.connections.len();
        let id = self.push_connection(source, target, weight);

        match self.rebuild_order() {
            Ok(()) => Ok(id),
            Err(e) => {
                self.rollback_connections(first_new);
                Err(e)
            }
        }
    }

    /// Computes the network outputs for the given inputs.
    ///
    /// Each computed neuron keeps the sum and activation from this computation until the next one,
    /// which is what propagation training reads. Context neurons output what their source neuron
    /// produced during the previous computation.
    pub fn compute(&mut self, input: &[f64]) -> Result<Vec<f64>, Error> {
        let input_ids = self.input_ids()?;
        if input.len() != input_ids.len() {
            return Err(Error::InputSize {
                expected: input_ids.len(),
                actual: input.len(),
            });
        }
        let output_ids = self.output_ids()?;

        evaluate::commit_context(&mut self.neurons);
        for (id, &value) in input_ids.iter().zip(input) {
            self.neurons[id.0].set_activation(value);
        }

        evaluate::propagate(&mut self.neurons, &self.connections, &self.order);

        let output = output_ids
            .iter()
            .map(|id| self.neurons[id.0].activation())
            .collect();
        evaluate::update_context(&mut self.neurons);

        Ok(output)
    }

    /// Clears the values remembered by context neurons.
    ///
    /// This is unnecessary if the network has no context layers.
    pub fn clear_context(&mut self) {
        for neuron in self.neurons.iter_mut().filter(|n| n.is_context()) {
            neuron.set_activation(0.0);
            neuron.set_pending(0.0);
        }
    }

    /// Returns the error of this network over a training set.
    ///
    /// The computation runs on a copy of the network, so activations and context of `self` are
    /// left untouched.
    pub fn calculate_error<S: TrainingSet>(&self, training: &S, mode: ErrorMode) -> Result<f64, Error> {
        let mut network = self.clone();
        let mut error = ErrorCalculation::new();

        for pair in training.iter() {
            let actual = network.compute(pair.input())?;
            error.update_error(&actual, pair.ideal(), pair.significance());
        }

        Ok(error.calculate(mode))
    }

    /// Sets every weight to a uniformly distributed value in `low..high`.
    pub fn randomize<R: Rng>(&mut self, rng: &mut R, low: f64, high: f64) {
        for connection in &mut self.connections {
            connection.set_weight(rng.gen_range(low..high));
        }
    }

    /// Sets every weight to a random value in `-1..1` chosen by a generator seeded with `seed`.
    pub fn reset(&mut self, seed: u64) {
        let mut rng = StdRng::seed_from_u64(seed);
        self.randomize(&mut rng, -1.0, 1.0);
    }

    /// Returns the number of values in an encoded weight array, which is the number of
    /// connections.
    pub fn encoded_len(&self) -> usize {
        self.connections.len()
    }

    /// Returns the weights of every connection, in connection order.
    pub fn encode_to_array(&self) -> Vec<f64> {
        self.connections.iter().map(Connection::weight).collect()
    }

    /// Sets the weights of every connection from an array created by
    /// [`encode_to_array`][Self::encode_to_array].
    pub fn decode_from_array(&mut self, weights: &[f64]) -> Result<(), Error> {
        if weights.len() != self.connections.len() {
            return Err(Error::EncodedLength {
                expected: self.connections.len(),
                actual: weights.len(),
            });
        }

        for (connection, &weight) in self.connections.iter_mut().zip(weights) {
            connection.set_weight(weight);
        }
        Ok(())
    }

    /// Sets the weight of a connection.
    pub fn set_weight(&mut self, id: ConnectionId, weight: f64) -> Result<(), Error> {
        self.connections
            .get_mut(id.as_usize())
            .map(|connection| connection.set_weight(weight))
            .ok_or(Error::InvalidConnection(id))
    }

    /// Returns the id of the first connection from `source` to `target`, if there is one.
    pub fn connection_between(&self, source: NeuronId, target: NeuronId) -> Option<ConnectionId> {
        self.neurons
            .get(source.0)?
            .outputs()
            .iter()
            .copied()
            .find(|&c| self.connections[c.as_usize()].target() == target)
    }

    /// Returns the neurons of a layer, including its bias neuron if it has one.
    pub fn layer_neurons(&self, layer: LayerId) -> Option<&[NeuronId]> {
        self.layers.get(layer.0).map(|l| l.neurons.as_slice())
    }

    /// Returns the bias neuron of a layer, if it has one.
    pub fn layer_bias(&self, layer: LayerId) -> Option<NeuronId> {
        self.layers.get(layer.0).and_then(|l| l.bias)
    }

    /// Returns the number of values [`compute`][Self::compute] expects.
    pub fn input_count(&self) -> usize {
        self.input_ids().map(|ids| ids.len()).unwrap_or(0)
    }

    /// Returns the number of values [`compute`][Self::compute] produces.
    pub fn output_count(&self) -> usize {
        self.output_ids().map(|ids| ids.len()).unwrap_or(0)
    }

    /// Returns all neurons of the network, indexed by [`NeuronId`].
    pub fn neurons(&self) -> &[Neuron] {
        &self.neurons
    }

    /// Returns all connections of the network, indexed by [`ConnectionId`].
    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    /// Returns the number of connections.
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Zeroes the training memory of every neuron and connection.
    pub fn clear_scratch(&mut self) {
        for neuron in &mut self.neurons {
            *neuron.mut_scratch() = NeuronScratch::default();
        }
        for connection in &mut self.connections {
            *connection.mut_scratch() = ConnectionScratch::default();
        }
    }

    /// Returns the computed neurons in evaluation order.
    #[cfg(test)]
    pub(crate) fn order(&self) -> &[NeuronId] {
        &self.order
    }

    /// Returns the computed neurons of the output layer.
    pub(crate) fn output_ids(&self) -> Result<Vec<NeuronId>, Error> {
        let layer = self.output_layer.ok_or(Error::OutputLayer)?;
        Ok(self.layers[layer.0]
            .neurons
            .iter()
            .copied()
            .filter(|id| !self.neurons[id.0].is_bias())
            .collect())
    }

    /// Returns the neurons and connections for in-place training, with the evaluation order.
    pub(crate) fn graph_mut(&mut self) -> (&mut [Neuron], &mut [Connection], &[NeuronId]) {
        (&mut self.neurons, &mut self.connections, &self.order)
    }

    pub(crate) fn connections_mut(&mut self) -> &mut [Connection] {
        &mut self.connections
    }

    fn input_ids(&self) -> Result<Vec<NeuronId>, Error> {
        let layer = self.input_layer.ok_or(Error::InputLayer)?;
        Ok(self.layers[layer.0]
            .neurons
            .iter()
            .copied()
            .filter(|id| matches!(self.neurons[id.0].kind(), NeuronKind::Input))
            .collect())
    }

    fn check_neuron(&self, id: NeuronId) -> Result<(), Error> {
        if id.0 < self.neurons.len() {
            Ok(())
        } else {
            Err(Error::InvalidNeuron(id))
        }
    }

    fn check_layer(&self, id: LayerId) -> Result<(), Error> {
        if id.0 < self.layers.len() {
            Ok(())
        } else {
            Err(Error::InvalidLayer(id.0))
        }
    }

    /// Returns the neurons of a layer that can receive connections.
    fn computed_in(&self, layer: LayerId) -> Result<Vec<NeuronId>, Error> {
        self.check_layer(layer)?;
        let neurons = &self.layers[layer.0].neurons;

        if let Some(&id) = neurons
            .iter()
            .find(|id| matches!(self.neurons[id.0].kind(), NeuronKind::Input))
        {
            return Err(Error::NotComputed(id));
        }

        Ok(neurons
            .iter()
            .copied()
            .filter(|id| self.neurons[id.0].summation().is_some())
            .collect())
    }

    fn push_neuron<F: FnOnce(NeuronId) -> Neuron>(&mut self, make: F) -> NeuronId {
        let id = NeuronId::new(self.neurons.len());
        self.neurons.push(make(id));
        id
    }

    fn push_layer(&mut self, neurons: Vec<NeuronId>) -> LayerId {
        let id = LayerId(self.layers.len());
        self.layers.push(Layer { neurons, bias: None });
        id
    }

    fn push_connection(&mut self, source: NeuronId, target: NeuronId, weight: f64) -> ConnectionId {
        let id = ConnectionId::new(self.connections.len());
        self.connections.push(Connection::new(source, target, weight));
        self.neurons[source.0].push_output(id);
        if let Some(summation) = self.neurons[target.0].mut_summation() {
            summation.push_input(id);
        }
        id
    }

    /// Removes every connection with an index of at least `first`. Connections are only ever
    /// appended, so they are the last entries of each neuron's input and output lists.
    fn rollback_connections(&mut self, first: usize) {
        while self.connections.len() > first {
            if let Some(connection) = self.connections.pop() {
                self.neurons[connection.source().0].drop_outputs_from(first);
                if let Some(summation) = self.neurons[connection.target().0].mut_summation() {
                    summation.drop_inputs_from(first);
                }
            }
        }
    }

    /// Rebuilds the evaluation order and checks that the graph is acyclic.
    fn rebuild_order(&mut self) -> Result<(), Error> {
        self.order = evaluate::evaluation_order(&self.neurons, &self.connections)?;
        Ok(())
    }
}

fn computed_neuron(id: NeuronId, activation: Activation) -> Neuron {
    let mut neuron = Neuron::new(id, NeuronKind::Computed);
    neuron.set_summation(InputSummation::new(activation));
    neuron
}

impl Index<NeuronId> for FreeformNetwork {
    type Output = Neuron;
    fn index(&self, idx: NeuronId) -> &Self::Output {
        &self.neurons[idx.0]
    }
}

impl Index<ConnectionId> for FreeformNetwork {
    type Output = Connection;
    fn index(&self, idx: ConnectionId) -> &Self::Output {
        &self.connections[idx.as_usize()]
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use assert_approx_eq::assert_approx_eq;

    use super::*;
    use crate::data::BasicTrainingSet;

    /// A 1-1 linear network without bias whose only weight is `weight`.
    pub(crate) fn single_weight(weight: f64) -> FreeformNetwork {
        let mut net = FreeformNetwork::new();
        let input = net.create_input_layer(1).unwrap();
        let output = net.create_output_layer(1).unwrap();
        net.connect_layers(input, output, Activation::Linear, 0.0).unwrap();
        net.set_weight(ConnectionId::new(0), weight).unwrap();
        net
    }

    #[test]
    fn test_layers() {
        let net = FreeformNetwork::feedforward(2, &[3], 1, Activation::Sigmoid).unwrap();

        assert_eq!(2, net.input_count());
        assert_eq!(1, net.output_count());
        // (2 inputs + bias) * 3 hidden + (3 hidden + bias) * 1 output
        assert_eq!(13, net.connection_count());
        assert_eq!(13, net.encoded_len());
        // 2 inputs, 1 bias, 3 hidden, 1 bias, 1 output
        assert_eq!(8, net.neurons().len());
        assert_eq!(4, net.order().len());
    }

    #[test]
    fn test_compute_linear() {
        let mut net = single_weight(2.0);
        assert_eq!(vec![3.0], net.compute(&[1.5]).unwrap());

        assert_eq!(
            Err(Error::InputSize {
                expected: 1,
                actual: 2
            }),
            net.compute(&[1.0, 2.0])
        );
    }

    #[test]
    fn test_compute_bias_and_activation() {
        let mut net = FreeformNetwork::new();
        let input = net.create_input_layer(2).unwrap();
        let output = net.create_output_layer(1).unwrap();
        net.connect_layers(input, output, Activation::Sigmoid, 1.0).unwrap();
        net.decode_from_array(&[0.5, -0.25, 0.1]).unwrap();

        let out = net.compute(&[1.0, 2.0]).unwrap();
        let sum = 0.5 * 1.0 - 0.25 * 2.0 + 0.1 * 1.0;
        assert_approx_eq!(Activation::Sigmoid.apply(sum), out[0]);

        let output_id = net.layer_neurons(output).unwrap()[0];
        assert_approx_eq!(sum, net[output_id].sum());
    }

    #[test]
    fn test_duplicate_layers() {
        let mut net = FreeformNetwork::new();
        net.create_input_layer(1).unwrap();
        net.create_output_layer(1).unwrap();
        assert_eq!(Err(Error::InputLayer), net.create_input_layer(1));
        assert_eq!(Err(Error::OutputLayer), net.create_output_layer(1));
    }

    #[test]
    fn test_missing_layers() {
        let mut net = FreeformNetwork::new();
        net.create_input_layer(1).unwrap();
        assert_eq!(Err(Error::OutputLayer), net.compute(&[1.0]));
    }

    #[test]
    fn test_connect_validation() {
        let mut net = FreeformNetwork::new();
        let input = net.create_input_layer(1).unwrap();
        let hidden = net.create_layer(1);
        let input_id = net.layer_neurons(input).unwrap()[0];
        let hidden_id = net.layer_neurons(hidden).unwrap()[0];

        assert_eq!(Err(Error::NotComputed(input_id)), net.connect(hidden_id, input_id, 1.0));
        assert_eq!(Err(Error::SelfConnection(hidden_id)), net.connect(hidden_id, hidden_id, 1.0));
        assert_eq!(
            Err(Error::InvalidNeuron(NeuronId::new(99))),
            net.connect(NeuronId::new(99), hidden_id, 1.0)
        );
        assert_eq!(
            Err(Error::NotComputed(input_id)),
            net.connect_layers(hidden, input, Activation::Linear, 0.0)
        );
        assert_eq!(0, net.connection_count());
    }

    #[test]
    fn test_single_bias_per_layer() {
        let mut net = FreeformNetwork::new();
        let input = net.create_input_layer(1).unwrap();
        let a = net.create_layer(1);
        let output = net.create_output_layer(1).unwrap();
        net.connect_layers(input, a, Activation::Linear, 1.0).unwrap();
        let bias = net.layer_bias(input).unwrap();
        net.connect_layers(input, output, Activation::Linear, 1.0).unwrap();

        assert_eq!(Some(bias), net.layer_bias(input));
        assert_eq!(2, net.layer_neurons(input).unwrap().len());
    }

    #[test]
    fn test_output_layer_bias_is_not_an_output() {
        let mut net = FreeformNetwork::new();
        let input = net.create_input_layer(1).unwrap();
        let output = net.create_output_layer(2).unwrap();
        let after = net.create_layer(1);
        net.connect_layers(input, output, Activation::Linear, 0.0).unwrap();
        net.connect_layers(output, after, Activation::Linear, 1.0).unwrap();
        net.decode_from_array(&[1.0, 2.0, 0.0, 0.0, 0.0]).unwrap();

        assert!(net.layer_bias(output).is_some());
        assert_eq!(2, net.output_count());
        assert_eq!(vec![3.0, 6.0], net.compute(&[3.0]).unwrap());
    }

    #[test]
    fn test_encode_decode() {
        let mut net = FreeformNetwork::feedforward(2, &[2], 1, Activation::Tanh).unwrap();
        net.reset(7);
        let weights = net.encode_to_array();

        let mut other = FreeformNetwork::feedforward(2, &[2], 1, Activation::Tanh).unwrap();
        other.decode_from_array(&weights).unwrap();
        assert_eq!(net.compute(&[0.3, 0.6]), other.compute(&[0.3, 0.6]));

        assert_eq!(
            Err(Error::EncodedLength {
                expected: 9,
                actual: 2
            }),
            other.decode_from_array(&[1.0, 2.0])
        );
    }

    #[test]
    fn test_reset_is_seeded() {
        let mut a = FreeformNetwork::feedforward(2, &[3], 1, Activation::Sigmoid).unwrap();
        let mut b = a.clone();
        a.reset(11);
        b.reset(11);
        assert_eq!(a.encode_to_array(), b.encode_to_array());
        assert!(a.encode_to_array().iter().all(|w| (-1.0..1.0).contains(w)));

        b.reset(12);
        assert_ne!(a.encode_to_array(), b.encode_to_array());
    }

    #[test]
    fn test_context() {
        // output = input + previous output
        let mut net = FreeformNetwork::new();
        let input = net.create_input_layer(1).unwrap();
        let output = net.create_output_layer(1).unwrap();
        net.connect_layers(input, output, Activation::Linear, 0.0).unwrap();
        let context = net.create_context(output, output).unwrap();
        net.decode_from_array(&[1.0, 1.0]).unwrap();

        assert_eq!(1, net.layer_neurons(context).unwrap().len());
        assert_eq!(vec![1.0], net.compute(&[1.0]).unwrap());
        assert_eq!(vec![3.0], net.compute(&[2.0]).unwrap());
        assert_eq!(vec![6.0], net.compute(&[3.0]).unwrap());

        net.clear_context();
        assert_eq!(vec![3.0], net.compute(&[3.0]).unwrap());
    }

    #[test]
    fn test_calculate_error_leaves_network_untouched() {
        let net = single_weight(1.0);
        let set = BasicTrainingSet::from_slices(&[vec![1.0], vec![2.0]], &[vec![2.0], vec![4.0]]);

        // errors of 1 and 2: (1 + 4) / 2
        assert_approx_eq!(2.5, net.calculate_error(&set, ErrorMode::Mse).unwrap());
        assert_approx_eq!(2.5, net.calculate_error(&set, ErrorMode::Ess).unwrap());
        assert_eq!(0.0, net.neurons()[1].activation());
    }
}
