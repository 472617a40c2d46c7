use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use assert_approx_eq::assert_approx_eq;
use rand::prelude::*;

use encog::activation::Activation;
use encog::concurrency::EngineConcurrency;
use encog::config::EngineConfig;
use encog::data::BasicTrainingSet;
use encog::error_calc::ErrorMode;
use encog::network::ConnectionId;
use encog::train::{FreeformPropagation, Train};
use encog::FreeformNetwork;

fn config() -> EngineConfig {
    EngineConfig::single_threaded()
}

// A single linear connection with no bias
fn single_weight(weight: f64) -> FreeformNetwork {
    let mut network = FreeformNetwork::new();
    let input = network.create_input_layer(1).unwrap();
    let output = network.create_output_layer(1).unwrap();
    network
        .connect_layers(input, output, Activation::Linear, 0.0)
        .unwrap();
    network.set_weight(ConnectionId::new(0), weight).unwrap();
    network
}

// y = 2x for x in 0.1..=1.0
fn doubling() -> BasicTrainingSet {
    let inputs: Vec<Vec<f64>> = (1..=10).map(|i| vec![i as f64 / 10.0]).collect();
    let ideals: Vec<Vec<f64>> = inputs.iter().map(|x| vec![2.0 * x[0]]).collect();
    BasicTrainingSet::from_slices(&inputs, &ideals)
}

fn truth_table(f: fn(bool, bool) -> bool) -> BasicTrainingSet {
    let mut inputs = Vec::new();
    let mut ideals = Vec::new();
    for &a in &[false, true] {
        for &b in &[false, true] {
            inputs.push(vec![a as u8 as f64, b as u8 as f64]);
            ideals.push(vec![f(a, b) as u8 as f64]);
        }
    }
    BasicTrainingSet::from_slices(&inputs, &ideals)
}

fn epoch_errors(batch_size: usize, epochs: usize) -> (Vec<f64>, f64) {
    let mut train =
        FreeformPropagation::backpropagation(single_weight(0.5), doubling(), 0.1, 0.0, &config())
            .unwrap();
    train.set_batch_size(batch_size);

    let mut errors = Vec::new();
    for _ in 0..epochs {
        train.iteration().unwrap();
        errors.push(train.error());
    }
    (errors, train.network().encode_to_array()[0])
}

#[test]
fn test_batch_and_online_both_descend() {
    let (batch, batch_weight) = epoch_errors(0, 60);
    let (online, online_weight) = epoch_errors(1, 60);

    for errors in [&batch, &online] {
        assert!(errors.windows(2).all(|w| w[1] <= w[0]));
        assert!(errors[errors.len() - 1] < errors[0]);
    }
    assert!(batch_weight > 0.5 && batch_weight <= 2.0);
    assert!(online_weight > 0.5 && online_weight <= 2.0);

    // The two modes take different paths from the same start
    let (_, batch_once) = epoch_errors(0, 1);
    let (_, online_once) = epoch_errors(1, 1);
    assert!((batch_once - online_once).abs() > 1e-6);
}

#[test]
fn test_mini_batch_descends() {
    let (errors, weight) = epoch_errors(3, 60);
    assert!(errors.windows(2).all(|w| w[1] <= w[0]));
    assert_approx_eq!(2.0, weight, 1e-2);
}

#[test]
fn test_rprop_learns_and_or() {
    for (name, f) in [
        ("and", (|a, b| a && b) as fn(bool, bool) -> bool),
        ("or", (|a, b| a || b) as fn(bool, bool) -> bool),
    ] {
        let mut network = FreeformNetwork::feedforward(2, &[], 1, Activation::Sigmoid).unwrap();
        network.reset(5);

        let mut train = FreeformPropagation::resilient(network, truth_table(f), &config()).unwrap();
        let reached = train.train_to_error(0.05, 500).unwrap();
        assert!(reached, "{} not learned, error {}", name, train.error());

        let mut network = train.into_network();
        for (a, b) in [(false, false), (false, true), (true, false), (true, true)] {
            let output = network.compute(&[a as u8 as f64, b as u8 as f64]).unwrap()[0];
            assert_eq!(f(a, b), output > 0.5, "{} of {} {}", name, a, b);
        }
    }
}

#[test]
fn test_error_mode_from_config() {
    let rms_config = EngineConfig {
        error_mode: ErrorMode::Rms,
        ..config()
    };
    let mut mse = FreeformPropagation::resilient(single_weight(0.5), doubling(), &config()).unwrap();
    let mut rms =
        FreeformPropagation::resilient(single_weight(0.5), doubling(), &rms_config).unwrap();

    mse.iteration().unwrap();
    rms.iteration().unwrap();
    assert_eq!(ErrorMode::Rms, rms.error_mode());
    assert_approx_eq!(mse.error().sqrt(), rms.error());
}

#[test]
fn test_resume_continues_training() {
    let mut network = FreeformNetwork::feedforward(2, &[], 1, Activation::Sigmoid).unwrap();
    network.reset(8);
    let set = truth_table(|a, b| a || b);

    let mut train = FreeformPropagation::resilient(network, set.clone(), &config()).unwrap();
    for _ in 0..10 {
        train.iteration().unwrap();
    }
    let continuation = train.pause();
    let mut uninterrupted = train.clone();

    let mut resumed =
        FreeformPropagation::resilient(train.into_network(), set, &config()).unwrap();
    resumed.resume(&continuation).unwrap();

    for _ in 0..5 {
        resumed.iteration().unwrap();
        uninterrupted.iteration().unwrap();
        assert_eq!(uninterrupted.error(), resumed.error());
    }
    assert_eq!(
        uninterrupted.network().encode_to_array(),
        resumed.network().encode_to_array()
    );
}

#[test]
fn test_task_group_barrier() {
    const TASKS: usize = 64;

    let concurrency = EngineConcurrency::new(&EngineConfig {
        thread_count: 4,
        ..EngineConfig::default()
    });
    let mut rng = StdRng::seed_from_u64(3);

    // The same group is reused for several rounds
    let group = concurrency.create_task_group();
    let finished = Arc::new(AtomicUsize::new(0));
    for round in 1..=3 {
        for _ in 0..TASKS {
            let sleep = Duration::from_micros(rng.gen_range(0..2_000));
            let finished = Arc::clone(&finished);
            concurrency.process_task(
                move || {
                    thread::sleep(sleep);
                    finished.fetch_add(1, Ordering::SeqCst);
                },
                Some(&group),
            );
        }

        group.wait_for_complete();
        assert_eq!(round * TASKS, finished.load(Ordering::SeqCst));
        assert!(group.no_tasks());
    }

    assert!(concurrency.shutdown(Duration::from_secs(1)));
}

#[test]
fn test_panicking_task_releases_barrier() {
    let concurrency = EngineConcurrency::new(&EngineConfig {
        thread_count: 2,
        ..EngineConfig::default()
    });
    let group = concurrency.create_task_group();

    concurrency.process_task(|| panic!("scoring failed"), Some(&group));
    concurrency.process_task(|| {}, Some(&group));

    group.wait_for_complete();
    assert!(group.no_tasks());
}
