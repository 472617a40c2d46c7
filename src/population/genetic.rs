//! The genetic algorithm.

use std::sync::Arc;

use crossbeam::channel;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::codec::GeneticCodec;
use super::genome::{DoubleGenome, MutatePerturb, Population, Splice};
use super::score::CalculateScore;
use super::PopulationError;
use crate::concurrency::EngineConcurrency;
use crate::train::Train;

/// The constants of a [`GeneticAlgorithm`].
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GeneticParams {
    /// The fraction of the population, best first, that mates as mothers.
    pub percent_to_mate: f64,
    /// The fraction of the population, best first, that fathers are drawn from.
    pub mating_population: f64,
    /// The probability that a child is mutated.
    pub mutation_percent: f64,
    /// The crossover cut length. `None` uses a third of the genome length.
    pub cut_length: Option<usize>,
    /// The mutation perturbation amount.
    pub perturb_amount: f64,
}

impl Default for GeneticParams {
    fn default() -> Self {
        Self {
            percent_to_mate: 0.25,
            mating_population: 0.5,
            mutation_percent: 0.1,
            cut_length: None,
            perturb_amount: 4.0,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum State {
    Uninitialized,
    Running,
}

// The population slots each generation reads and writes
#[derive(Copy, Clone, Debug)]
struct Layout {
    count_to_mate: usize,
    father_pool: usize,
    offspring_start: usize,
}

impl Layout {
    fn new(size: usize, params: &GeneticParams) -> Result<Self, PopulationError> {
        for (name, value) in [
            ("percent_to_mate", params.percent_to_mate),
            ("mating_population", params.mating_population),
            ("mutation_percent", params.mutation_percent),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(PopulationError::InvalidParameter(format!(
                    "{} must be in 0..=1, got {}",
                    name, value
                )));
            }
        }

        let count_to_mate = (size as f64 * params.percent_to_mate) as usize;
        let father_pool = (size as f64 * params.mating_population) as usize;
        let offspring = count_to_mate * 2;

        // Mothers and fathers must survive until every child is written
        let too_small = count_to_mate == 0
            || father_pool == 0
            || offspring > size
            || count_to_mate.max(father_pool) > size - offspring;
        if too_small {
            return Err(PopulationError::PopulationTooSmall {
                required: minimum_size(params),
                actual: size,
            });
        }

        Ok(Self {
            count_to_mate,
            father_pool,
            offspring_start: size - offspring,
        })
    }
}

// The smallest population satisfying `Layout::new`, or `usize::MAX` if none does
fn minimum_size(params: &GeneticParams) -> usize {
    (1..=10_000)
        .find(|&size| {
            let count_to_mate = (size as f64 * params.percent_to_mate) as usize;
            let father_pool = (size as f64 * params.mating_population) as usize;
            count_to_mate > 0
                && father_pool > 0
                && count_to_mate * 2 <= size
                && count_to_mate.max(father_pool) <= size - count_to_mate * 2
        })
        .unwrap_or(usize::MAX)
}

/// Evolves a population of genomes by crossover and mutation.
///
/// Each generation the best `percent_to_mate` of the population mate, each with a father drawn
/// from the best `mating_population`. Every mating produces two children that replace the worst
/// genomes, after which the population is sorted. Matings run as parallel tasks; each task only
/// produces the children for its own pair of slots.
pub struct GeneticAlgorithm<C, F> {
    codec: Arc<C>,
    score: Arc<F>,
    population: Population,
    params: GeneticParams,
    layout: Layout,
    concurrency: Arc<EngineConcurrency>,
    rng: StdRng,
    state: State,
    iteration: usize,
}

impl<C, F> GeneticAlgorithm<C, F>
where
    C: GeneticCodec + 'static,
    F: CalculateScore<C::Phenotype> + 'static,
{
    /// Returns a trainer evolving `population`.
    ///
    /// Fails if a genome does not have the codec's length, or if the population is too small for
    /// the mating fractions in `params`.
    pub fn new(
        codec: C,
        score: F,
        population: Population,
        params: GeneticParams,
        concurrency: Arc<EngineConcurrency>,
        seed: u64,
    ) -> Result<Self, PopulationError> {
        let expected = codec.genome_length();
        if let Some(genome) = population.genomes().iter().find(|g| g.len() != expected) {
            return Err(PopulationError::GenomeLength {
                expected,
                actual: genome.len(),
            });
        }
        let layout = Layout::new(population.len(), &params)?;

        info!(
            population = population.len(),
            genome_length = expected,
            mating = layout.count_to_mate,
            "genetic algorithm created"
        );

        Ok(Self {
            codec: Arc::new(codec),
            score: Arc::new(score),
            population,
            params,
            layout,
            concurrency,
            rng: StdRng::seed_from_u64(seed),
            state: State::Uninitialized,
            iteration: 0,
        })
    }

    /// Returns a trainer evolving `size` random genomes with values in `-1..1`.
    pub fn random(
        codec: C,
        score: F,
        size: usize,
        params: GeneticParams,
        concurrency: Arc<EngineConcurrency>,
        seed: u64,
    ) -> Result<Self, PopulationError> {
        // Offset so the population and the trainer draw different streams
        let mut rng = StdRng::seed_from_u64(seed.wrapping_add(1));
        let population = Population::random(size, codec.genome_length(), -1.0, 1.0, &mut rng);
        Self::new(codec, score, population, params, concurrency, seed)
    }

    /// Returns the population.
    pub fn population(&self) -> &Population {
        &self.population
    }

    /// Returns the parameters.
    pub fn params(&self) -> &GeneticParams {
        &self.params
    }

    /// Returns the best genome found so far.
    pub fn best_genome(&self) -> Option<&DoubleGenome> {
        self.population.best()
    }

    /// Decodes the best genome.
    pub fn best_phenotype(&self) -> Result<Option<C::Phenotype>, PopulationError> {
        self.best_genome()
            .map(|genome| self.codec.decode(genome.values()))
            .transpose()
    }

    /// Scores every unscored genome and sorts the population. Does nothing after the first call.
    pub fn initialize(&mut self) -> Result<(), PopulationError> {
        if self.state == State::Running {
            return Ok(());
        }

        let group = self.concurrency.create_task_group();
        let (sender, receiver) = channel::unbounded();
        let mut expected = 0;

        for (index, genome) in self.population.genomes().iter().enumerate() {
            if genome.score().is_some() {
                continue;
            }
            expected += 1;

            let values = genome.values().to_vec();
            let codec = Arc::clone(&self.codec);
            let score = Arc::clone(&self.score);
            let sender = sender.clone();
            self.concurrency.process_task(
                move || {
                    let result = codec
                        .decode(&values)
                        .map(|phenotype| (index, score.calculate_score(&phenotype)));
                    // The receiver outlives the group
                    let _ = sender.send(result);
                },
                Some(&group),
            );
        }

        group.wait_for_complete();
        drop(sender);

        let results = receiver.try_iter().collect::<Result<Vec<_>, _>>()?;
        if results.len() != expected {
            return Err(PopulationError::TaskFailed {
                expected,
                completed: results.len(),
            });
        }

        let genomes = self.population.genomes_mut();
        for (index, score) in results {
            genomes[index].set_score(score);
        }
        self.population.sort(self.score.should_minimize());
        self.state = State::Running;
        Ok(())
    }

    /// Breeds one generation into the offspring slots, without sorting.
    ///
    /// Only the last `2 * count_to_mate` genomes are replaced. If any mating fails, the population
    /// is left unchanged.
    pub fn mate_generation(&mut self) -> Result<(), PopulationError> {
        self.initialize()?;

        let Layout {
            count_to_mate,
            father_pool,
            offspring_start,
        } = self.layout;
        let splice = Splice::new(
            self.params
                .cut_length
                .unwrap_or(self.codec.genome_length() / 3),
        );
        let mutate = MutatePerturb::new(self.params.perturb_amount);
        let mutation_percent = self.params.mutation_percent;

        let group = self.concurrency.create_task_group();
        let (sender, receiver) = channel::unbounded();

        for mother_index in 0..count_to_mate {
            let father_index = self.rng.gen_range(0..father_pool);
            let mother = self.population.genomes()[mother_index].values().to_vec();
            let father = self.population.genomes()[father_index].values().to_vec();
            let seed = self.rng.gen::<u64>();

            let codec = Arc::clone(&self.codec);
            let score = Arc::clone(&self.score);
            let sender = sender.clone();
            let slot = offspring_start + mother_index * 2;

            self.concurrency.process_task(
                move || {
                    let mut rng = StdRng::seed_from_u64(seed);
                    let (first, second) = splice.mate(&mother, &father, &mut rng);

                    let mut child = |mut values: Vec<f64>| -> Result<DoubleGenome, PopulationError> {
                        if rng.gen::<f64>() < mutation_percent {
                            mutate.mutate(&mut values, &mut rng);
                        }
                        let phenotype = codec.decode(&values)?;
                        let mut genome = DoubleGenome::new(values);
                        genome.set_score(score.calculate_score(&phenotype));
                        Ok(genome)
                    };

                    let result = child(first)
                        .and_then(|first| child(second).map(|second| (slot, first, second)));
                    let _ = sender.send(result);
                },
                Some(&group),
            );
        }

        group.wait_for_complete();
        drop(sender);

        let children = receiver.try_iter().collect::<Result<Vec<_>, _>>()?;
        if children.len() != count_to_mate {
            return Err(PopulationError::TaskFailed {
                expected: count_to_mate,
                completed: children.len(),
            });
        }

        for (slot, first, second) in children {
            self.population.set(slot, first);
            self.population.set(slot + 1, second);
        }
        Ok(())
    }
}

impl<C, F> Train for GeneticAlgorithm<C, F>
where
    C: GeneticCodec + 'static,
    F: CalculateScore<C::Phenotype> + 'static,
{
    type Error = PopulationError;

    fn iteration(&mut self) -> Result<(), PopulationError> {
        self.mate_generation()?;
        self.population.sort(self.score.should_minimize());
        self.iteration += 1;

        debug!(
            iteration = self.iteration,
            best = self.error(),
            "genetic algorithm iteration complete"
        );
        Ok(())
    }

    /// Returns the score of the best genome, or NaN before the population is scored.
    fn error(&self) -> f64 {
        self.best_genome()
            .and_then(DoubleGenome::score)
            .unwrap_or(f64::NAN)
    }

    fn iteration_number(&self) -> usize {
        self.iteration
    }
}
