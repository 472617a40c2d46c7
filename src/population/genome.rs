//! Genomes, populations, and the operators that breed them.

use rand::Rng;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::compare_scores;

/// A candidate solution encoded as a vector of `f64`, with its score once evaluated.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DoubleGenome {
    values: Vec<f64>,
    score: Option<f64>,
    adjusted_score: Option<f64>,
}

impl DoubleGenome {
    /// Returns an unscored genome.
    pub fn new(values: Vec<f64>) -> Self {
        Self {
            values,
            score: None,
            adjusted_score: None,
        }
    }

    /// Returns a genome of `length` values drawn uniformly from `low..high`.
    pub fn random<R: Rng>(length: usize, low: f64, high: f64, rng: &mut R) -> Self {
        Self::new((0..length).map(|_| rng.gen_range(low..high)).collect())
    }

    /// Returns the encoded values.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Returns the number of values.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns whether the genome holds no values.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns the score, or `None` if the genome has not been evaluated.
    pub fn score(&self) -> Option<f64> {
        self.score
    }

    /// Returns the adjusted score, or `None` if the genome has not been evaluated.
    pub fn adjusted_score(&self) -> Option<f64> {
        self.adjusted_score
    }

    /// Sets the score. The adjusted score starts out equal to it.
    pub fn set_score(&mut self, score: f64) {
        self.score = Some(score);
        self.adjusted_score = Some(score);
    }

    /// Sets the adjusted score.
    pub fn set_adjusted_score(&mut self, score: f64) {
        self.adjusted_score = Some(score);
    }
}

/// An ordered collection of genomes.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Population {
    genomes: Vec<DoubleGenome>,
}

impl Population {
    /// Returns a population of the given genomes.
    pub fn new(genomes: Vec<DoubleGenome>) -> Self {
        Self { genomes }
    }

    /// Returns `size` random genomes of `length` values in `low..high`.
    pub fn random<R: Rng>(size: usize, length: usize, low: f64, high: f64, rng: &mut R) -> Self {
        Self::new(
            (0..size)
                .map(|_| DoubleGenome::random(length, low, high, rng))
                .collect(),
        )
    }

    /// Returns the number of genomes.
    pub fn len(&self) -> usize {
        self.genomes.len()
    }

    /// Returns whether the population is empty.
    pub fn is_empty(&self) -> bool {
        self.genomes.is_empty()
    }

    /// Returns the genomes, best first once sorted.
    pub fn genomes(&self) -> &[DoubleGenome] {
        &self.genomes
    }

    /// Returns the genome at `index`.
    pub fn get(&self, index: usize) -> Option<&DoubleGenome> {
        self.genomes.get(index)
    }

    /// Returns the first genome, which is the best one once the population is sorted.
    pub fn best(&self) -> Option<&DoubleGenome> {
        self.genomes.first()
    }

    /// Sorts the genomes best first. Unscored genomes go last.
    pub fn sort(&mut self, minimize: bool) {
        self.genomes
            .sort_by(|a, b| compare_scores(a.score(), b.score(), minimize));
    }

    pub(crate) fn set(&mut self, index: usize, genome: DoubleGenome) {
        self.genomes[index] = genome;
    }

    pub(crate) fn genomes_mut(&mut self) -> &mut [DoubleGenome] {
        &mut self.genomes
    }
}

/// Two-point crossover.
///
/// A run of `cut_length + 1` values starting at a random position is swapped between the parents:
/// the first child takes the run from the father and the rest from the mother, the second child
/// the reverse.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Splice {
    cut_length: usize,
}

impl Splice {
    /// Returns a crossover swapping runs of `cut_length + 1` values.
    pub fn new(cut_length: usize) -> Self {
        Self { cut_length }
    }

    /// Returns the cut length.
    pub fn cut_length(&self) -> usize {
        self.cut_length
    }

    /// Returns the two children of `mother` and `father`, which must have the same length.
    pub fn mate<R: Rng>(&self, mother: &[f64], father: &[f64], rng: &mut R) -> (Vec<f64>, Vec<f64>) {
        let span = father.len().saturating_sub(self.cut_length);
        let cut_start = if span == 0 { 0 } else { rng.gen_range(0..span) };
        let cut_end = cut_start + self.cut_length;

        mother
            .iter()
            .zip(father)
            .enumerate()
            .map(|(i, (&m, &f))| {
                if (cut_start..=cut_end).contains(&i) {
                    (f, m)
                } else {
                    (m, f)
                }
            })
            .unzip()
    }
}

/// Mutation scaling each value by a random factor.
///
/// Every value `v` becomes `v + v * r` with `r` uniform in `-amount..amount`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct MutatePerturb {
    amount: f64,
}

impl MutatePerturb {
    /// Returns a mutation perturbing values by up to `amount` times their magnitude.
    pub fn new(amount: f64) -> Self {
        Self { amount }
    }

    /// Returns the perturbation amount.
    pub fn amount(&self) -> f64 {
        self.amount
    }

    /// Perturbs every value of `genome`.
    pub fn mutate<R: Rng>(&self, genome: &mut [f64], rng: &mut R) {
        for value in genome {
            let ratio = self.amount - rng.gen::<f64>() * self.amount * 2.0;
            *value += *value * ratio;
        }
    }
}
