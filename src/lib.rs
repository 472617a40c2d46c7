//! Freeform neural networks and the engines that train them.
//!
//! A [`FreeformNetwork`] is an explicit graph of neurons and weighted connections. It can be
//! trained by gradient-based propagation ([`FreeformPropagation`], using either backpropagation
//! or resilient propagation), or by population-based search over its weights
//! ([`GeneticAlgorithm`] and [`ParticleSwarm`]), which evaluates candidates in parallel.
//!
//! # Examples
//!
//! ```
//! use encog::activation::Activation;
//! use encog::config::EngineConfig;
//! use encog::data::BasicTrainingSet;
//! use encog::train::{FreeformPropagation, Train};
//! use encog::FreeformNetwork;
//!
//! let inputs = vec![vec![0.0, 0.0], vec![1.0, 0.0], vec![0.0, 1.0], vec![1.0, 1.0]];
//! let ideals = vec![vec![0.0], vec![1.0], vec![1.0], vec![0.0]];
//! let training = BasicTrainingSet::from_slices(&inputs, &ideals);
//!
//! let mut network = FreeformNetwork::feedforward(2, &[3], 1, Activation::Sigmoid).unwrap();
//! network.reset(1000);
//!
//! // Resilient propagation needs no learning rate
//! let mut train = FreeformPropagation::resilient(network, training, &EngineConfig::default())
//!     .unwrap();
//! train.train_to_error(0.01, 1000).unwrap();
//!
//! let mut network = train.into_network();
//! let output = network.compute(&[1.0, 0.0]).unwrap();
//! ```
//!
//! No global state is kept: settings live in an [`EngineConfig`] that is passed to every trainer,
//! and the thread pool used by population trainers is an explicitly created
//! [`EngineConcurrency`][concurrency::EngineConcurrency].

// Operations on non-normal numbers result in non-normal numbers, never panicking, so training on
// badly scaled data degrades instead of failing.

pub mod activation;
pub mod concurrency;
pub mod config;
pub mod data;
pub mod error_calc;
pub mod network;
pub mod population;
pub mod train;

pub use self::config::EngineConfig;
pub use self::network::FreeformNetwork;
pub use self::population::{GeneticAlgorithm, ParticleSwarm};
pub use self::train::FreeformPropagation;
