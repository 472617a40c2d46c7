//! Trains a small network on XOR with resilient propagation, pausing halfway and resuming from
//! the saved continuation.

use encog::activation::Activation;
use encog::config::EngineConfig;
use encog::data::BasicTrainingSet;
use encog::train::{FreeformPropagation, Train};
use encog::FreeformNetwork;

fn main() {
    let inputs = vec![vec![0.0, 0.0], vec![1.0, 0.0], vec![0.0, 1.0], vec![1.0, 1.0]];
    let ideals = vec![vec![0.0], vec![1.0], vec![1.0], vec![0.0]];
    let training = BasicTrainingSet::from_slices(&inputs, &ideals);
    let config = EngineConfig::single_threaded();

    let mut network = FreeformNetwork::feedforward(2, &[3], 1, Activation::Sigmoid).unwrap();
    network.reset(1000);

    let mut train = FreeformPropagation::resilient(network, training.clone(), &config).unwrap();
    for _ in 0..50 {
        train.iteration().unwrap();
    }
    println!("epoch {}: error {:.6}", train.iteration_number(), train.error());

    // Hand the network and the RPROP state to a fresh trainer
    let continuation = train.pause();
    let mut train =
        FreeformPropagation::resilient(train.into_network(), training.clone(), &config).unwrap();
    train.resume(&continuation).unwrap();

    let reached = train.train_to_error(0.01, 5_000).unwrap();
    println!(
        "reached target: {}, error {:.6} after {} more epochs",
        reached,
        train.error(),
        train.iteration_number()
    );

    let mut network = train.into_network();
    for pair in training.pairs() {
        let output = network.compute(pair.input()).unwrap();
        println!("{:?} -> {:.4} (ideal {:?})", pair.input(), output[0], pair.ideal());
    }
}
