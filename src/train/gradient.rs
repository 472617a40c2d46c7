//! Backpropagation of the output error into per-connection gradients.

use crate::network::{Error, FreeformNetwork, Neuron, NeuronId};

/// The constant added to sigmoid derivatives when the flat spot fix is enabled.
pub const FLAT_SPOT: f64 = 0.1;

/// Computes error deltas for neurons and accumulates gradients for connections.
///
/// The network must already hold the activations of a forward computation of the pair being
/// processed. Gradients accumulate in [`ConnectionScratch::gradient`] until a learning rule
/// consumes them.
///
/// [`ConnectionScratch::gradient`]: crate::network::ConnectionScratch::gradient
#[derive(Clone, Debug)]
pub struct GradientCalculator {
    fix_flat_spot: bool,
    outputs: Vec<NeuronId>,
    // Whether a neuron lies on a path to an output, rebuilt for every pair
    reached: Vec<bool>,
}

impl GradientCalculator {
    /// Returns a calculator for `network`. Fails if the network has no output layer.
    pub fn new(network: &FreeformNetwork, fix_flat_spot: bool) -> Result<Self, Error> {
        Ok(Self {
            fix_flat_spot,
            outputs: network.output_ids()?,
            reached: Vec::with_capacity(network.neurons().len()),
        })
    }

    /// Returns whether the flat spot fix is applied.
    pub fn fix_flat_spot(&self) -> bool {
        self.fix_flat_spot
    }

    /// Sets whether [`FLAT_SPOT`] is added to the derivative of sigmoid neurons.
    pub fn set_fix_flat_spot(&mut self, fix_flat_spot: bool) {
        self.fix_flat_spot = fix_flat_spot;
    }

    /// Propagates the error of the latest computation of `network` against `ideal` back through
    /// the graph and adds each connection's gradient to its accumulator.
    ///
    /// Neurons without a path to an output neuron, and their incoming connections, are left
    /// untouched.
    pub fn process(&mut self, network: &mut FreeformNetwork, ideal: &[f64], significance: f64) {
        let (neurons, connections, order) = network.graph_mut();
        self.reached.clear();
        self.reached.resize(neurons.len(), false);

        for (&id, &ideal) in self.outputs.iter().zip(ideal) {
            let neuron = &neurons[id.as_usize()];
            let diff = (ideal - neuron.activation()) * significance;
            let delta = diff * self.derivative(neuron);

            neurons[id.as_usize()].mut_scratch().delta = delta;
            self.reached[id.as_usize()] = true;
        }

        // Reverse evaluation order finalizes every target delta before its sources are visited
        for &id in order.iter().rev() {
            let index = id.as_usize();
            if self.reached[index] {
                continue;
            }

            let mut sum = 0.0;
            let mut reached = false;
            for &output in neurons[index].outputs() {
                let connection = &connections[output.as_usize()];
                let target = connection.target().as_usize();
                if self.reached[target] {
                    sum += neurons[target].scratch().delta * connection.weight();
                    reached = true;
                }
            }

            if reached {
                let delta = sum * self.derivative(&neurons[index]);
                neurons[index].mut_scratch().delta = delta;
                self.reached[index] = true;
            }
        }

        for connection in connections.iter_mut() {
            let target = connection.target().as_usize();
            if self.reached[target] {
                let source = neurons[connection.source().as_usize()].activation();
                connection.mut_scratch().gradient += source * neurons[target].scratch().delta;
            }
        }
    }

    fn derivative(&self, neuron: &Neuron) -> f64 {
        neuron
            .summation()
            .map(|summation| {
                let activation = summation.activation();
                let derivative = activation.derivative(neuron.sum(), neuron.activation());
                if self.fix_flat_spot && activation.is_sigmoid() {
                    derivative + FLAT_SPOT
                } else {
                    derivative
                }
            })
            .unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use assert_approx_eq::assert_approx_eq;

    use super::*;
    use crate::activation::Activation;
    use crate::config::EngineConfig;
    use crate::data::{BasicTrainingSet, TrainingPair, TrainingSet};
    use crate::network::tests::single_weight;
    use crate::network::ConnectionId;
    use crate::train::{FreeformPropagation, Train};

    const H: f64 = 1e-5;

    fn half_squared_error(net: &mut FreeformNetwork, pair: &TrainingPair) -> f64 {
        let actual = net.compute(pair.input()).unwrap();
        actual
            .iter()
            .zip(pair.ideal())
            .map(|(a, i)| 0.5 * (i - a) * (i - a))
            .sum()
    }

    // The negated derivative of the error of each pair with respect to every weight, summed over
    // the set. Context values are those left by the unperturbed computation of earlier pairs.
    fn numeric_gradients(network: &FreeformNetwork, set: &BasicTrainingSet) -> Vec<f64> {
        let weights = network.encode_to_array();
        let mut gradients = vec![0.0; weights.len()];
        let mut state = network.clone();
        state.clear_context();

        for pair in set.iter() {
            for (i, &weight) in weights.iter().enumerate() {
                let mut plus = state.clone();
                plus.set_weight(ConnectionId::new(i), weight + H).unwrap();
                let mut minus = state.clone();
                minus.set_weight(ConnectionId::new(i), weight - H).unwrap();

                let slope = (half_squared_error(&mut plus, pair)
                    - half_squared_error(&mut minus, pair))
                    / (2.0 * H);
                gradients[i] -= slope;
            }
            state.compute(pair.input()).unwrap();
        }

        gradients
    }

    fn analytic_gradients(network: &FreeformNetwork, set: &BasicTrainingSet) -> Vec<f64> {
        let mut net = network.clone();
        net.clear_context();
        net.clear_scratch();
        let mut calc = GradientCalculator::new(&net, false).unwrap();

        for pair in set.iter() {
            net.compute(pair.input()).unwrap();
            calc.process(&mut net, pair.ideal(), 1.0);
        }
        net.connections().iter().map(|c| c.scratch().gradient).collect()
    }

    fn sigmoid_hidden() -> (FreeformNetwork, BasicTrainingSet) {
        let mut net = FreeformNetwork::feedforward(2, &[3], 1, Activation::Sigmoid).unwrap();
        net.reset(3);
        let set = BasicTrainingSet::from_slices(
            &[vec![0.0, 0.0], vec![1.0, 0.0], vec![0.0, 1.0], vec![1.0, 1.0]],
            &[vec![0.0], vec![1.0], vec![1.0], vec![0.0]],
        );
        (net, set)
    }

    // A simple recurrent network: the hidden layer also sees its own previous activations
    fn elman() -> (FreeformNetwork, BasicTrainingSet) {
        let mut net = FreeformNetwork::new();
        let input = net.create_input_layer(1).unwrap();
        let hidden = net.create_layer(2);
        let output = net.create_output_layer(1).unwrap();
        net.connect_layers(input, hidden, Activation::Tanh, 1.0).unwrap();
        net.connect_layers(hidden, output, Activation::Sigmoid, 1.0).unwrap();
        net.create_context(hidden, hidden).unwrap();
        net.reset(5);

        let set = BasicTrainingSet::from_slices(
            &[vec![0.1], vec![0.5], vec![-0.3], vec![0.8]],
            &[vec![0.2], vec![0.4], vec![0.1], vec![0.7]],
        );
        (net, set)
    }

    #[test]
    fn test_matches_numeric_gradient() {
        for (name, (net, set)) in [("sigmoid hidden", sigmoid_hidden()), ("elman", elman())] {
            let numeric = numeric_gradients(&net, &set);
            let analytic = analytic_gradients(&net, &set);

            assert_eq!(numeric.len(), analytic.len());
            assert!(numeric.iter().any(|g| g.abs() > 1e-3), "{}", name);
            for (n, a) in numeric.iter().zip(&analytic) {
                assert!((n - a).abs() < 1e-6, "{}: numeric {} analytic {}", name, n, a);
            }
        }
    }

    #[test]
    fn test_propagation_step_follows_gradient() {
        const LEARNING_RATE: f64 = 1e-3;

        for (name, (mut net, set)) in [("sigmoid hidden", sigmoid_hidden()), ("elman", elman())] {
            let numeric = numeric_gradients(&net, &set);
            let before = net.encode_to_array();

            // Leave stale context behind; every epoch must start from a cleared one
            net.compute(&vec![0.9; net.input_count()]).unwrap();
            net.compute(&vec![-0.4; net.input_count()]).unwrap();

            let mut train = FreeformPropagation::backpropagation(
                net,
                set,
                LEARNING_RATE,
                0.0,
                &EngineConfig::single_threaded(),
            )
            .unwrap();
            train.set_fix_flat_spot(false);
            train.iteration().unwrap();

            let after = train.network().encode_to_array();
            for ((b, a), n) in before.iter().zip(&after).zip(&numeric) {
                let step = (a - b) / LEARNING_RATE;
                assert!((step - n).abs() < 1e-6, "{}: step {} numeric {}", name, step, n);
            }
        }
    }

    #[test]
    fn test_output_gradient() {
        let mut net = single_weight(0.5);
        let mut calc = GradientCalculator::new(&net, true).unwrap();

        net.compute(&[2.0]).unwrap();
        calc.process(&mut net, &[3.0], 1.0);
        // delta = (3 - 1) * 1, gradient = 2 * delta
        assert_approx_eq!(4.0, net[ConnectionId::new(0)].scratch().gradient);

        // Accumulates rather than overwrites
        net.compute(&[2.0]).unwrap();
        calc.process(&mut net, &[3.0], 0.5);
        assert_approx_eq!(6.0, net[ConnectionId::new(0)].scratch().gradient);
    }

    #[test]
    fn test_hidden_gradient() {
        // input -> hidden -> output, all linear
        let mut net = FreeformNetwork::new();
        let input = net.create_input_layer(1).unwrap();
        let hidden = net.create_layer(1);
        let output = net.create_output_layer(1).unwrap();
        net.connect_layers(input, hidden, Activation::Linear, 0.0).unwrap();
        net.connect_layers(hidden, output, Activation::Linear, 0.0).unwrap();
        net.decode_from_array(&[2.0, 3.0]).unwrap();
        let mut calc = GradientCalculator::new(&net, false).unwrap();

        // hidden = 2, output = 6
        net.compute(&[1.0]).unwrap();
        calc.process(&mut net, &[10.0], 1.0);

        // output delta 4, hidden delta 4 * 3
        assert_approx_eq!(1.0 * 12.0, net[ConnectionId::new(0)].scratch().gradient);
        assert_approx_eq!(2.0 * 4.0, net[ConnectionId::new(1)].scratch().gradient);
    }

    #[test]
    fn test_flat_spot() {
        let mut net = FreeformNetwork::new();
        let input = net.create_input_layer(1).unwrap();
        let output = net.create_output_layer(1).unwrap();
        net.connect_layers(input, output, Activation::Sigmoid, 0.0).unwrap();
        net.decode_from_array(&[0.0]).unwrap();

        // sigmoid(0) = 0.5, derivative 0.25
        for (fix, derivative) in [(false, 0.25), (true, 0.25 + FLAT_SPOT)] {
            let mut net = net.clone();
            let mut calc = GradientCalculator::new(&net, fix).unwrap();
            net.compute(&[1.0]).unwrap();
            calc.process(&mut net, &[1.0], 1.0);
            assert_approx_eq!(0.5 * derivative, net[ConnectionId::new(0)].scratch().gradient);
        }
    }

    #[test]
    fn test_unreached_neurons_untouched() {
        let mut net = single_weight(1.0);
        let input_id = NeuronId::new(0);
        let dangling = net.add_neuron(Activation::Linear);
        let dangling_connection = net.connect(input_id, dangling, 1.0).unwrap();
        let mut calc = GradientCalculator::new(&net, false).unwrap();

        net.compute(&[1.0]).unwrap();
        calc.process(&mut net, &[2.0], 1.0);

        assert_eq!(0.0, net[dangling_connection].scratch().gradient);
        assert_eq!(0.0, net[dangling].scratch().delta);
        assert_approx_eq!(1.0, net[ConnectionId::new(0)].scratch().gradient);
    }
}
