//! Particle swarm optimization.

use std::sync::Arc;

use crossbeam::channel;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::codec::GeneticCodec;
use super::score::CalculateScore;
use super::{is_better, PopulationError};
use crate::concurrency::EngineConcurrency;
use crate::train::Train;

/// The constants of a [`ParticleSwarm`].
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PsoParams {
    /// The number of particles.
    pub population_size: usize,
    /// The largest magnitude of a velocity component.
    pub max_velocity: f64,
    /// The largest magnitude of a position component, or `None` for unbounded positions.
    pub max_position: Option<f64>,
    /// How strongly a particle is pulled towards its own best position.
    pub c1: f64,
    /// How strongly a particle is pulled towards the swarm's best position.
    pub c2: f64,
    /// How much of its velocity a particle keeps each iteration.
    pub inertia_weight: f64,
    /// Initial positions are drawn from `-init_range..init_range`, narrowed to `max_position`.
    pub init_range: f64,
    /// Pull particles towards the best particle's own best position as it is updated during the
    /// sweep, rather than towards the global best fixed at the start of the iteration.
    pub pseudo_asynchronous_update: bool,
}

impl Default for PsoParams {
    fn default() -> Self {
        Self {
            population_size: 30,
            max_velocity: 2.0,
            max_position: None,
            c1: 2.0,
            c2: 2.0,
            inertia_weight: 0.4,
            init_range: 1.0,
            pseudo_asynchronous_update: false,
        }
    }
}

impl PsoParams {
    fn validate(&self) -> Result<(), PopulationError> {
        if self.population_size < 2 {
            return Err(PopulationError::PopulationTooSmall {
                required: 2,
                actual: self.population_size,
            });
        }
        if !(self.max_velocity.is_finite() && self.max_velocity > 0.0) {
            return Err(PopulationError::InvalidParameter(format!(
                "max_velocity must be positive, got {}",
                self.max_velocity
            )));
        }
        if let Some(max_position) = self.max_position {
            if !(max_position > 0.0) {
                return Err(PopulationError::InvalidParameter(format!(
                    "max_position must be positive, got {}",
                    max_position
                )));
            }
        }
        if !(self.init_range.is_finite() && self.init_range > 0.0) {
            return Err(PopulationError::InvalidParameter(format!(
                "init_range must be positive, got {}",
                self.init_range
            )));
        }
        let coefficients = [self.c1, self.c2, self.inertia_weight];
        if !coefficients.iter().all(|c| c.is_finite() && *c >= 0.0) {
            return Err(PopulationError::InvalidParameter(
                "c1, c2 and inertia_weight must not be negative".to_string(),
            ));
        }
        Ok(())
    }
}

/// One candidate of a [`ParticleSwarm`].
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Particle {
    position: Vec<f64>,
    velocity: Vec<f64>,
    best_position: Vec<f64>,
    best_score: Option<f64>,
}

impl Particle {
    /// Returns the current position.
    pub fn position(&self) -> &[f64] {
        &self.position
    }

    /// Returns the current velocity.
    pub fn velocity(&self) -> &[f64] {
        &self.velocity
    }

    /// Returns the best position this particle has visited.
    pub fn best_position(&self) -> &[f64] {
        &self.best_position
    }

    /// Returns the score of [`best_position`][Self::best_position], or `None` before the particle
    /// is scored.
    pub fn best_score(&self) -> Option<f64> {
        self.best_score
    }

    /// Moves the particle, pulled towards its own best position and `social` (if any).
    fn advance<R: Rng>(&mut self, social: Option<&[f64]>, params: &PsoParams, rng: &mut R) {
        for i in 0..self.position.len() {
            let x = self.position[i];
            let mut v = params.inertia_weight * self.velocity[i];

            if params.c1 != 0.0 {
                v += params.c1 * rng.gen::<f64>() * (self.best_position[i] - x);
            }
            if let Some(social) = social {
                if params.c2 != 0.0 {
                    v += params.c2 * rng.gen::<f64>() * (social[i] - x);
                }
            }

            let v = v.clamp(-params.max_velocity, params.max_velocity);
            let mut x = x + v;
            if let Some(max_position) = params.max_position {
                x = x.clamp(-max_position, max_position);
            }

            self.velocity[i] = v;
            self.position[i] = x;
        }
    }

    /// Scores the current position and keeps it if it beats the personal best.
    fn evaluate<C, F>(&mut self, codec: &C, score: &F) -> Result<(), PopulationError>
    where
        C: GeneticCodec,
        F: CalculateScore<C::Phenotype>,
    {
        let phenotype = codec.decode(&self.position)?;
        let current = score.calculate_score(&phenotype);

        let improved = self
            .best_score
            .map_or(true, |best| is_better(current, best, score.should_minimize()));
        if improved {
            self.best_score = Some(current);
            self.best_position.clone_from(&self.position);
        }
        Ok(())
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum State {
    Uninitialized,
    Running,
}

/// Searches for the best genome with a swarm of particles.
///
/// Every iteration moves each particle, in parallel, according to its velocity and its pull
/// towards its own best position and the swarm's best position, then re-scores it. The global best
/// is updated only after every particle has moved, on the calling thread.
pub struct ParticleSwarm<C, F> {
    codec: Arc<C>,
    score: Arc<F>,
    params: PsoParams,
    particles: Vec<Particle>,
    best_index: Option<usize>,
    best_position: Vec<f64>,
    best_score: Option<f64>,
    concurrency: Arc<EngineConcurrency>,
    rng: StdRng,
    state: State,
    iteration: usize,
}

impl<C, F> ParticleSwarm<C, F>
where
    C: GeneticCodec + 'static,
    F: CalculateScore<C::Phenotype> + 'static,
{
    /// Returns a swarm searching the genomes of `codec`. Particles are created on the first
    /// iteration.
    pub fn new(
        codec: C,
        score: F,
        params: PsoParams,
        concurrency: Arc<EngineConcurrency>,
        seed: u64,
    ) -> Result<Self, PopulationError> {
        params.validate()?;

        info!(
            particles = params.population_size,
            dimensions = codec.genome_length(),
            "particle swarm created"
        );

        Ok(Self {
            codec: Arc::new(codec),
            score: Arc::new(score),
            params,
            particles: Vec::new(),
            best_index: None,
            best_position: Vec::new(),
            best_score: None,
            concurrency,
            rng: StdRng::seed_from_u64(seed),
            state: State::Uninitialized,
            iteration: 0,
        })
    }

    /// Returns the parameters.
    pub fn params(&self) -> &PsoParams {
        &self.params
    }

    /// Returns the particles. Empty before the first iteration.
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Returns the best position found by any particle.
    pub fn best_position(&self) -> &[f64] {
        &self.best_position
    }

    /// Returns the score of [`best_position`][Self::best_position].
    pub fn best_score(&self) -> Option<f64> {
        self.best_score
    }

    /// Decodes the best position.
    pub fn best_phenotype(&self) -> Result<Option<C::Phenotype>, PopulationError> {
        if self.best_score.is_none() {
            return Ok(None);
        }
        self.codec.decode(&self.best_position).map(Some)
    }

    /// Places the particles randomly and scores them.
    fn init_population(&mut self) -> Result<(), PopulationError> {
        let dimensions = self.codec.genome_length();
        let PsoParams {
            init_range,
            max_velocity,
            max_position,
            ..
        } = self.params;
        // Initial positions respect the position bound too
        let range = max_position.map_or(init_range, |max| init_range.min(max));

        let rng = &mut self.rng;
        self.particles = (0..self.params.population_size)
            .map(|_| {
                let position: Vec<f64> = (0..dimensions)
                    .map(|_| rng.gen_range(-range..range))
                    .collect();
                let velocity = (0..dimensions)
                    .map(|_| rng.gen_range(-max_velocity..max_velocity))
                    .collect();
                Particle {
                    best_position: position.clone(),
                    position,
                    velocity,
                    best_score: None,
                }
            })
            .collect();

        for particle in &mut self.particles {
            particle.evaluate(&*self.codec, &*self.score)?;
        }
        self.update_global_best();
        self.state = State::Running;
        Ok(())
    }

    /// Moves and re-scores every particle on the calling thread. With pseudo-asynchronous updates,
    /// particles see improvements made earlier in the same sweep.
    fn sweep_sequential(&mut self) -> Result<(), PopulationError> {
        for i in 0..self.particles.len() {
            let social = match self.best_index {
                Some(best) if best == i => None,
                Some(best) if self.params.pseudo_asynchronous_update => {
                    Some(self.particles[best].best_position.clone())
                }
                _ => Some(self.best_position.clone()),
            };

            let particle = &mut self.particles[i];
            particle.advance(social.as_deref(), &self.params, &mut self.rng);
            particle.evaluate(&*self.codec, &*self.score)?;
        }
        Ok(())
    }

    /// Moves and re-scores every particle as parallel tasks, each working on its own copy. The
    /// swarm is only changed once every task has succeeded.
    fn sweep_parallel(&mut self) -> Result<(), PopulationError> {
        let social: Arc<Vec<f64>> = Arc::new(match self.best_index {
            Some(best) if self.params.pseudo_asynchronous_update => {
                self.particles[best].best_position.clone()
            }
            _ => self.best_position.clone(),
        });

        let group = self.concurrency.create_task_group();
        let (sender, receiver) = channel::unbounded();

        for (i, particle) in self.particles.iter().enumerate() {
            let mut particle = particle.clone();
            let pulled = self.best_index != Some(i);
            let social = Arc::clone(&social);
            let seed = self.rng.gen::<u64>();
            let params = self.params;
            let codec = Arc::clone(&self.codec);
            let score = Arc::clone(&self.score);
            let sender = sender.clone();

            self.concurrency.process_task(
                move || {
                    let mut rng = StdRng::seed_from_u64(seed);
                    let social = if pulled { Some(social.as_slice()) } else { None };
                    particle.advance(social, &params, &mut rng);
                    let result = particle.evaluate(&*codec, &*score).map(|()| (i, particle));
                    let _ = sender.send(result);
                },
                Some(&group),
            );
        }

        group.wait_for_complete();
        drop(sender);

        let moved = receiver.try_iter().collect::<Result<Vec<_>, _>>()?;
        if moved.len() != self.particles.len() {
            return Err(PopulationError::TaskFailed {
                expected: self.particles.len(),
                completed: moved.len(),
            });
        }

        for (i, particle) in moved {
            self.particles[i] = particle;
        }
        Ok(())
    }

    fn update_global_best(&mut self) {
        let minimize = self.score.should_minimize();
        let mut updated = false;

        for (i, particle) in self.particles.iter().enumerate() {
            let score = match particle.best_score {
                Some(score) => score,
                None => continue,
            };
            let better = match self.best_index.and_then(|b| self.particles[b].best_score) {
                Some(best) => is_better(score, best, minimize),
                None => true,
            };
            if better {
                self.best_index = Some(i);
                updated = true;
            }
        }

        if updated {
            if let Some(best) = self.best_index {
                self.best_position.clone_from(&self.particles[best].best_position);
                self.best_score = self.particles[best].best_score;
            }
        }
    }
}

impl<C, F> Train for ParticleSwarm<C, F>
where
    C: GeneticCodec + 'static,
    F: CalculateScore<C::Phenotype> + 'static,
{
    type Error = PopulationError;

    fn iteration(&mut self) -> Result<(), PopulationError> {
        if self.state == State::Uninitialized {
            self.init_population()?;
        }

        if self.concurrency.is_multi_threaded() {
            self.sweep_parallel()?;
        } else {
            self.sweep_sequential()?;
        }
        self.update_global_best();
        self.iteration += 1;

        debug!(
            iteration = self.iteration,
            best = self.error(),
            "particle swarm iteration complete"
        );
        Ok(())
    }

    /// Returns the best score, or NaN before the first iteration.
    fn error(&self) -> f64 {
        self.best_score.unwrap_or(f64::NAN)
    }

    fn iteration_number(&self) -> usize {
        self.iteration
    }
}
