//! Evolves the weights of an XOR network with a genetic algorithm. Scoring runs in parallel.

use std::sync::Arc;

use encog::activation::Activation;
use encog::concurrency::EngineConcurrency;
use encog::config::EngineConfig;
use encog::data::BasicTrainingSet;
use encog::population::{GeneticAlgorithm, GeneticParams, NetworkCodec, TrainingSetScore};
use encog::train::Train;
use encog::FreeformNetwork;

fn main() {
    let inputs = vec![vec![0.0, 0.0], vec![1.0, 0.0], vec![0.0, 1.0], vec![1.0, 1.0]];
    let ideals = vec![vec![0.0], vec![1.0], vec![1.0], vec![0.0]];
    let training = BasicTrainingSet::from_slices(&inputs, &ideals);

    let network = FreeformNetwork::feedforward(2, &[4], 1, Activation::Sigmoid).unwrap();
    let concurrency = Arc::new(EngineConcurrency::new(&EngineConfig::default()));

    let mut ga = GeneticAlgorithm::random(
        NetworkCodec::new(network),
        TrainingSetScore::new(training.clone()),
        200,
        GeneticParams::default(),
        concurrency,
        7,
    )
    .unwrap();

    let reached = ga.train_to_error(0.01, 2_000).unwrap();
    println!(
        "reached target: {}, best error {:.6} after {} generations",
        reached,
        ga.error(),
        ga.iteration_number()
    );

    let mut network = ga.best_phenotype().unwrap().unwrap();
    for pair in training.pairs() {
        let output = network.compute(pair.input()).unwrap();
        println!("{:?} -> {:.4}", pair.input(), output[0]);
    }
}
