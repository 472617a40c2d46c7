//! Scoring functions for population trainers.

use tracing::warn;

use crate::data::TrainingSet;
use crate::error_calc::ErrorMode;
use crate::network::FreeformNetwork;

/// Scores a candidate solution.
///
/// Trainers call this from several threads at once, each with a different candidate.
pub trait CalculateScore<P>: Send + Sync {
    /// Returns the score of `phenotype`.
    fn calculate_score(&self, phenotype: &P) -> f64;

    /// Returns whether lower scores are better.
    fn should_minimize(&self) -> bool {
        true
    }
}

/// Scores a network by its error on a training set. Lower is better.
///
/// A network that cannot compute the training set scores `f64::INFINITY`.
#[derive(Clone, Debug)]
pub struct TrainingSetScore<S> {
    training: S,
    mode: ErrorMode,
}

impl<S: TrainingSet> TrainingSetScore<S> {
    /// Returns a scorer using the mean squared error.
    pub fn new(training: S) -> Self {
        Self::with_mode(training, ErrorMode::Mse)
    }

    /// Returns a scorer reporting the error in the given mode.
    pub fn with_mode(training: S, mode: ErrorMode) -> Self {
        Self { training, mode }
    }

    /// Returns the training set.
    pub fn training(&self) -> &S {
        &self.training
    }
}

impl<S: TrainingSet> CalculateScore<FreeformNetwork> for TrainingSetScore<S> {
    fn calculate_score(&self, network: &FreeformNetwork) -> f64 {
        match network.calculate_error(&self.training, self.mode) {
            Ok(error) => error,
            Err(e) => {
                warn!("network could not be scored: {}", e);
                f64::INFINITY
            }
        }
    }
}

/// Scores candidates with a function or closure.
#[derive(Clone, Debug)]
pub struct ScoreFn<F> {
    function: F,
    minimize: bool,
}

impl<F> ScoreFn<F> {
    /// Returns a scorer for which lower scores are better.
    pub fn minimize(function: F) -> Self {
        Self {
            function,
            minimize: true,
        }
    }

    /// Returns a scorer for which higher scores are better.
    pub fn maximize(function: F) -> Self {
        Self {
            function,
            minimize: false,
        }
    }
}

impl<P, F> CalculateScore<P> for ScoreFn<F>
where
    F: Fn(&P) -> f64 + Send + Sync,
{
    fn calculate_score(&self, phenotype: &P) -> f64 {
        (self.function)(phenotype)
    }

    fn should_minimize(&self) -> bool {
        self.minimize
    }
}
