//! Mapping between genomes and the objects they encode.

use super::PopulationError;
use crate::network::FreeformNetwork;

/// Converts between the `f64` vectors a population trainer searches over and the objects they
/// represent.
pub trait GeneticCodec: Send + Sync {
    /// The decoded form of a genome.
    type Phenotype;

    /// Returns the length of every genome.
    fn genome_length(&self) -> usize;

    /// Returns the genome representing `phenotype`.
    fn encode(&self, phenotype: &Self::Phenotype) -> Vec<f64>;

    /// Returns the object represented by `genome`.
    fn decode(&self, genome: &[f64]) -> Result<Self::Phenotype, PopulationError>;
}

/// Encodes networks of a fixed structure as their connection weights.
#[derive(Clone, Debug)]
pub struct NetworkCodec {
    template: FreeformNetwork,
}

impl NetworkCodec {
    /// Returns a codec for networks structured like `template`. Its weights are irrelevant.
    pub fn new(template: FreeformNetwork) -> Self {
        Self { template }
    }

    /// Returns the network decoded genomes are copied from.
    pub fn template(&self) -> &FreeformNetwork {
        &self.template
    }
}

impl GeneticCodec for NetworkCodec {
    type Phenotype = FreeformNetwork;

    fn genome_length(&self) -> usize {
        self.template.encoded_len()
    }

    fn encode(&self, network: &FreeformNetwork) -> Vec<f64> {
        network.encode_to_array()
    }

    fn decode(&self, genome: &[f64]) -> Result<FreeformNetwork, PopulationError> {
        let mut network = self.template.clone();
        network.decode_from_array(genome)?;
        Ok(network)
    }
}

/// The identity codec, for optimizing plain vectors.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct VectorCodec {
    length: usize,
}

impl VectorCodec {
    /// Returns a codec for vectors of `length` values.
    pub fn new(length: usize) -> Self {
        Self { length }
    }
}

impl GeneticCodec for VectorCodec {
    type Phenotype = Vec<f64>;

    fn genome_length(&self) -> usize {
        self.length
    }

    fn encode(&self, phenotype: &Vec<f64>) -> Vec<f64> {
        phenotype.clone()
    }

    fn decode(&self, genome: &[f64]) -> Result<Vec<f64>, PopulationError> {
        if genome.len() != self.length {
            return Err(PopulationError::GenomeLength {
                expected: self.length,
                actual: genome.len(),
            });
        }
        Ok(genome.to_vec())
    }
}
