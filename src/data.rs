//! Training data consumed by the trainers.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One training example: an input vector, the ideal output for it, and how much the example counts
/// towards the error.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TrainingPair {
    input: Vec<f64>,
    ideal: Vec<f64>,
    significance: f64,
}

impl TrainingPair {
    /// Returns a new `TrainingPair` with a significance of `1.0`.
    pub fn new(input: Vec<f64>, ideal: Vec<f64>) -> Self {
        Self::with_significance(input, ideal, 1.0)
    }

    /// Returns a new `TrainingPair` whose error is scaled by `significance`.
    pub fn with_significance(input: Vec<f64>, ideal: Vec<f64>, significance: f64) -> Self {
        Self {
            input,
            ideal,
            significance,
        }
    }

    /// Returns the input vector.
    pub fn input(&self) -> &[f64] {
        &self.input
    }

    /// Returns the ideal output vector.
    pub fn ideal(&self) -> &[f64] {
        &self.ideal
    }

    /// Returns the significance.
    pub fn significance(&self) -> f64 {
        self.significance
    }
}

/// A finite, restartable sequence of [`TrainingPair`]s.
///
/// Implementations must be safe to read from several threads at once, since population trainers
/// score candidates concurrently.
pub trait TrainingSet: Send + Sync {
    /// Returns the length of every input vector.
    fn input_size(&self) -> usize;

    /// Returns the length of every ideal vector.
    fn ideal_size(&self) -> usize;

    /// Returns the number of pairs.
    fn len(&self) -> usize;

    /// Returns the pair at `index`, or `None` if it is out of range.
    fn get(&self, index: usize) -> Option<&TrainingPair>;

    /// Returns whether the set holds no pairs.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns an iterator over every pair, in order.
    fn iter(&self) -> Pairs<'_, Self>
    where
        Self: Sized,
    {
        Pairs { set: self, index: 0 }
    }
}

/// An iterator over the pairs of a [`TrainingSet`].
pub struct Pairs<'a, S: ?Sized> {
    set: &'a S,
    index: usize,
}

impl<'a, S: TrainingSet + ?Sized> Iterator for Pairs<'a, S> {
    type Item = &'a TrainingPair;

    fn next(&mut self) -> Option<Self::Item> {
        let pair = self.set.get(self.index)?;
        self.index += 1;
        Some(pair)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.set.len().saturating_sub(self.index);
        (remaining, Some(remaining))
    }
}

/// A [`TrainingSet`] held in memory.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BasicTrainingSet {
    pairs: Vec<TrainingPair>,
    input_size: usize,
    ideal_size: usize,
}

impl BasicTrainingSet {
    /// Returns an empty set whose pairs will have the given vector lengths.
    pub fn new(input_size: usize, ideal_size: usize) -> Self {
        Self {
            pairs: Vec::new(),
            input_size,
            ideal_size,
        }
    }

    /// Returns a set pairing each input with the ideal at the same index. Extra entries in the
    /// longer slice are ignored.
    pub fn from_slices(inputs: &[Vec<f64>], ideals: &[Vec<f64>]) -> Self {
        let input_size = inputs.first().map(Vec::len).unwrap_or(0);
        let ideal_size = ideals.first().map(Vec::len).unwrap_or(0);
        let pairs = inputs
            .iter()
            .zip(ideals)
            .map(|(input, ideal)| TrainingPair::new(input.clone(), ideal.clone()))
            .collect();

        Self {
            pairs,
            input_size,
            ideal_size,
        }
    }

    /// Adds a pair to the set.
    pub fn push(&mut self, pair: TrainingPair) {
        self.pairs.push(pair);
    }

    /// Returns the pairs of the set.
    pub fn pairs(&self) -> &[TrainingPair] {
        &self.pairs
    }
}

impl TrainingSet for BasicTrainingSet {
    fn input_size(&self) -> usize {
        self.input_size
    }

    fn ideal_size(&self) -> usize {
        self.ideal_size
    }

    fn len(&self) -> usize {
        self.pairs.len()
    }

    fn get(&self, index: usize) -> Option<&TrainingPair> {
        self.pairs.get(index)
    }
}
