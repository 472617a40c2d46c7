//! The propagation trainer.

use tracing::{debug, info};

use super::batch::BatchController;
use super::continuation::TrainingContinuation;
use super::gradient::GradientCalculator;
use super::rprop::RpropParams;
use super::strategy::{BackpropParams, LearningRule};
use super::{Train, TrainError};
use crate::config::EngineConfig;
use crate::data::TrainingSet;
use crate::error_calc::{ErrorCalculation, ErrorMode};
use crate::network::FreeformNetwork;

/// Trains a [`FreeformNetwork`] by propagating the error of each training pair back through the
/// network and updating weights with a [`LearningRule`].
///
/// The trainer owns the network while training; take it back with
/// [`into_network`][Self::into_network].
#[derive(Clone, Debug)]
pub struct FreeformPropagation<S> {
    network: FreeformNetwork,
    training: S,
    rule: LearningRule,
    gradients: GradientCalculator,
    batch: BatchController,
    error_mode: ErrorMode,
    error: f64,
    iteration: usize,
}

impl<S: TrainingSet> FreeformPropagation<S> {
    /// Returns a trainer for `network` using `rule`, learning once per epoch.
    ///
    /// Fails if the training set does not fit the network, if a computed neuron's activation
    /// function has no derivative, or if the rule's parameters are invalid. The training memory of
    /// the network is reset.
    pub fn new(
        mut network: FreeformNetwork,
        training: S,
        rule: LearningRule,
        config: &EngineConfig,
    ) -> Result<Self, TrainError> {
        rule.validate()?;

        if training.input_size() != network.input_count() {
            return Err(TrainError::InputSize {
                expected: network.input_count(),
                actual: training.input_size(),
            });
        }
        if training.ideal_size() != network.output_count() {
            return Err(TrainError::IdealSize {
                expected: network.output_count(),
                actual: training.ideal_size(),
            });
        }
        if let Some(activation) = network
            .neurons()
            .iter()
            .filter_map(|n| n.summation().map(|s| s.activation()))
            .find(|a| !a.has_derivative())
        {
            return Err(TrainError::NoDerivative(activation));
        }

        let gradients = GradientCalculator::new(&network, config.fix_flat_spot)?;
        network.clear_scratch();
        for connection in network.connections_mut() {
            rule.prepare(connection.mut_scratch());
        }

        info!(
            rule = rule.name(),
            connections = network.connection_count(),
            pairs = training.len(),
            "propagation trainer created"
        );

        Ok(Self {
            network,
            training,
            rule,
            gradients,
            batch: BatchController::new(0),
            error_mode: config.error_mode,
            error: 0.0,
            iteration: 0,
        })
    }

    /// Returns a trainer using backpropagation with the given learning rate and momentum.
    pub fn backpropagation(
        network: FreeformNetwork,
        training: S,
        learning_rate: f64,
        momentum: f64,
        config: &EngineConfig,
    ) -> Result<Self, TrainError> {
        let params = BackpropParams {
            learning_rate,
            momentum,
        };
        Self::new(network, training, LearningRule::Backpropagation(params), config)
    }

    /// Returns a trainer using resilient propagation with the default constants.
    pub fn resilient(
        network: FreeformNetwork,
        training: S,
        config: &EngineConfig,
    ) -> Result<Self, TrainError> {
        Self::new(
            network,
            training,
            LearningRule::Resilient(RpropParams::default()),
            config,
        )
    }

    /// Returns the batch size. See [`BatchController`].
    pub fn batch_size(&self) -> usize {
        self.batch.batch_size()
    }

    /// Sets the batch size: `0` learns once per epoch, `1` after every pair, and `n` after every
    /// `n` pairs.
    pub fn set_batch_size(&mut self, batch_size: usize) {
        self.batch.set_batch_size(batch_size);
    }

    /// Sets whether the flat spot fix is applied to sigmoid neurons.
    pub fn set_fix_flat_spot(&mut self, fix_flat_spot: bool) {
        self.gradients.set_fix_flat_spot(fix_flat_spot);
    }

    /// Returns the learning rule.
    pub fn rule(&self) -> &LearningRule {
        &self.rule
    }

    /// Returns how the epoch error is reported.
    pub fn error_mode(&self) -> ErrorMode {
        self.error_mode
    }

    /// Returns the network being trained.
    pub fn network(&self) -> &FreeformNetwork {
        &self.network
    }

    /// Returns the training set.
    pub fn training(&self) -> &S {
        &self.training
    }

    /// Stops training and returns the trained network.
    pub fn into_network(self) -> FreeformNetwork {
        self.network
    }

    /// Saves the training memory so training can later continue where it stopped.
    pub fn pause(&self) -> TrainingContinuation {
        let scratch = || self.network.connections().iter().map(|c| c.scratch());

        TrainingContinuation::new(
            self.rule.name(),
            scratch().map(|s| s.last_gradient).collect(),
            scratch().map(|s| s.update).collect(),
            scratch().map(|s| s.last_weight_delta).collect(),
        )
    }

    /// Restores training memory saved by [`pause`][Self::pause].
    ///
    /// Fails without changing anything if the continuation was created by another learning rule
    /// or for a network with a different number of connections.
    pub fn resume(&mut self, continuation: &TrainingContinuation) -> Result<(), TrainError> {
        if continuation.method() != self.rule.name() {
            return Err(TrainError::ContinuationMethod {
                expected: self.rule.name().to_string(),
                found: continuation.method().to_string(),
            });
        }

        let expected = self.network.connection_count();
        for len in [
            continuation.last_gradients().len(),
            continuation.updates().len(),
            continuation.last_weight_deltas().len(),
        ] {
            if len != expected {
                return Err(TrainError::ContinuationLength {
                    expected,
                    actual: len,
                });
            }
        }

        for (i, connection) in self.network.connections_mut().iter_mut().enumerate() {
            let scratch = connection.mut_scratch();
            scratch.gradient = 0.0;
            scratch.last_gradient = continuation.last_gradients()[i];
            scratch.update = continuation.updates()[i];
            scratch.last_weight_delta = continuation.last_weight_deltas()[i];
        }

        debug!(connections = expected, "training resumed from continuation");
        Ok(())
    }
}

/// Applies the accumulated gradient of every connection.
fn learn(rule: &LearningRule, network: &mut FreeformNetwork) {
    for connection in network.connections_mut() {
        let change = rule.learn(connection.mut_scratch());
        connection.add_weight(change);
    }
}

impl<S: TrainingSet> Train for FreeformPropagation<S> {
    type Error = TrainError;

    fn iteration(&mut self) -> Result<(), TrainError> {
        let mut error = ErrorCalculation::new();
        self.network.clear_context();

        for pair in self.training.iter() {
            let actual = self.network.compute(pair.input())?;
            error.update_error(&actual, pair.ideal(), pair.significance());
            self.gradients
                .process(&mut self.network, pair.ideal(), pair.significance());

            if self.batch.pair_processed() {
                learn(&self.rule, &mut self.network);
            }
        }

        if self.batch.finish_epoch() {
            learn(&self.rule, &mut self.network);
        }

        self.error = error.calculate(self.error_mode);
        self.iteration += 1;
        debug!(
            iteration = self.iteration,
            error = self.error,
            "propagation iteration complete"
        );

        Ok(())
    }

    fn error(&self) -> f64 {
        self.error
    }

    fn iteration_number(&self) -> usize {
        self.iteration
    }
}
