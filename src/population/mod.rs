//! Population-based training.
//!
//! [`GeneticAlgorithm`] and [`ParticleSwarm`] search over fixed-length vectors of `f64`, which a
//! [`GeneticCodec`] decodes into the object being optimized (usually a
//! [`FreeformNetwork`][crate::network::FreeformNetwork] through [`NetworkCodec`]). Each candidate is
//! scored by a [`CalculateScore`] implementation on a worker thread of an
//! [`EngineConcurrency`][crate::concurrency::EngineConcurrency], and the trainer waits on a
//! [`TaskGroup`][crate::concurrency::TaskGroup] before touching shared state.

mod codec;
mod genetic;
mod genome;
mod pso;
mod score;

pub use codec::{GeneticCodec, NetworkCodec, VectorCodec};
pub use genetic::{GeneticAlgorithm, GeneticParams};
pub use genome::{DoubleGenome, MutatePerturb, Population, Splice};
pub use pso::{Particle, ParticleSwarm, PsoParams};
pub use score::{CalculateScore, ScoreFn, TrainingSetScore};

use std::cmp::Ordering;

use crate::network;

/// An error while setting up or running a population trainer.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum PopulationError {
    /// The population is too small for the configured parameters.
    #[error("population of {actual} is too small, at least {required} required")]
    PopulationTooSmall {
        /// The smallest population the parameters allow.
        required: usize,
        /// The size of the population given.
        actual: usize,
    },
    /// A parameter is out of range.
    #[error("invalid population parameter: {0}")]
    InvalidParameter(String),
    /// A genome does not have the length the codec expects.
    #[error("expected genomes of length {expected}, got {actual}")]
    GenomeLength {
        /// The length the codec expects.
        expected: usize,
        /// The length of the genome given.
        actual: usize,
    },
    /// Some tasks of a generation finished without producing a result.
    #[error("only {completed} of {expected} tasks produced a result")]
    TaskFailed {
        /// The number of tasks started.
        expected: usize,
        /// The number of results received.
        completed: usize,
    },
    /// A genome could not be decoded into a network.
    #[error(transparent)]
    Network(#[from] network::Error),
}

/// Returns whether score `a` is better than score `b`.
pub fn is_better(a: f64, b: f64, minimize: bool) -> bool {
    if minimize {
        a < b
    } else {
        a > b
    }
}

/// Orders scores best first. Missing scores sort after every present score.
pub fn compare_scores(a: Option<f64>, b: Option<f64>, minimize: bool) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) if minimize => a.total_cmp(&b),
        (Some(a), Some(b)) => b.total_cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
