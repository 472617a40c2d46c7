//! Minimizes the sphere function with a particle swarm running on a thread pool.

use std::sync::Arc;

use encog::concurrency::EngineConcurrency;
use encog::config::EngineConfig;
use encog::population::{ParticleSwarm, PsoParams, ScoreFn, VectorCodec};
use encog::train::Train;

fn main() {
    let config = EngineConfig::default();
    let concurrency = Arc::new(EngineConcurrency::new(&config));
    println!("using {} threads", concurrency.thread_count());

    let sphere = ScoreFn::minimize(|v: &Vec<f64>| -> f64 {
        v.iter().map(|x| (x - 0.5) * (x - 0.5)).sum()
    });
    let params = PsoParams {
        inertia_weight: 0.7,
        c1: 1.4,
        c2: 1.4,
        ..PsoParams::default()
    };
    let mut swarm =
        ParticleSwarm::new(VectorCodec::new(8), sphere, params, concurrency, 42).unwrap();

    for _ in 0..20 {
        for _ in 0..10 {
            swarm.iteration().unwrap();
        }
        println!("iteration {}: best {:.8}", swarm.iteration_number(), swarm.error());
    }
    println!("best position: {:?}", swarm.best_position());
}
