//! Evaluation of networks.

use std::collections::VecDeque;

use super::connection::Connection;
use super::error::Error;
use super::neuron::{Neuron, NeuronId, NeuronKind};

/// Returns the computed neurons in an order where every neuron comes after all computed neurons
/// feeding it. Input, bias, and context neurons are leaves and never appear in the order.
///
/// Returns [`Error::Cycle`] if the connections between computed neurons are not acyclic.
pub fn evaluation_order(neurons: &[Neuron], connections: &[Connection]) -> Result<Vec<NeuronId>, Error> {
    // O(n + m), Kahn's algorithm
    let mut pending_inputs = vec![0usize; neurons.len()];
    let mut computed_count = 0;

    for neuron in neurons {
        if let Some(summation) = neuron.summation() {
            computed_count += 1;

            for &id in summation.inputs() {
                let source = connections[id.as_usize()].source();
                if neurons[source.as_usize()].summation().is_some() {
                    pending_inputs[neuron.id().as_usize()] += 1;
                }
            }
        }
    }

    let mut ready: VecDeque<NeuronId> = neurons
        .iter()
        .filter(|n| n.summation().is_some() && pending_inputs[n.id().as_usize()] == 0)
        .map(Neuron::id)
        .collect();
    let mut order = Vec::with_capacity(computed_count);

    while let Some(id) = ready.pop_front() {
        order.push(id);

        for &output in neurons[id.as_usize()].outputs() {
            let target = connections[output.as_usize()].target().as_usize();
            pending_inputs[target] -= 1;
            if pending_inputs[target] == 0 {
                ready.push_back(NeuronId::new(target));
            }
        }
    }

    if order.len() < computed_count {
        // Any neuron still waiting on an input lies on (or behind) a cycle
        let stuck = pending_inputs
            .iter()
            .position(|&count| count > 0)
            .unwrap_or_default();
        return Err(Error::Cycle(NeuronId::new(stuck)));
    }

    Ok(order)
}

/// Computes the sum and activation of every neuron in `order`. Input, bias, and context neurons
/// must already hold their activations.
pub fn propagate(neurons: &mut [Neuron], connections: &[Connection], order: &[NeuronId]) {
    for &id in order {
        let computed = neurons[id.as_usize()].summation().map(|summation| {
            let sum: f64 = summation
                .inputs()
                .iter()
                .map(|&c| {
                    let connection = &connections[c.as_usize()];
                    connection.weight() * neurons[connection.source().as_usize()].activation()
                })
                .sum();
            (sum, summation.activation().apply(sum))
        });

        if let Some((sum, activation)) = computed {
            neurons[id.as_usize()].set_computed(sum, activation);
        }
    }
}

/// Makes the values remembered by context neurons visible to the next computation.
pub fn commit_context(neurons: &mut [Neuron]) {
    for neuron in neurons.iter_mut().filter(|n| n.is_context()) {
        let value = neuron.pending();
        neuron.set_activation(value);
    }
}

/// Remembers the current activation of each context neuron's source.
pub fn update_context(neurons: &mut [Neuron]) {
    let remembered: Vec<(usize, f64)> = neurons
        .iter()
        .filter_map(|n| match n.kind() {
            NeuronKind::Context { source } => {
                Some((n.id().as_usize(), neurons[source.as_usize()].activation()))
            }
            _ => None,
        })
        .collect();

    for (index, value) in remembered {
        neurons[index].set_pending(value);
    }
}
