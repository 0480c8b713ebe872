//! Model and dataset seams used by distillation

use ndarray::Array1;

use super::prob::ProbabilityTable;
use crate::error::Result;

/// One labelled example
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub features: Array1<f32>,
    pub label: usize,
}

impl Sample {
    pub fn new(features: Array1<f32>, label: usize) -> Self {
        Self { features, label }
    }
}

/// Ground-truth labels of a slice of samples, in order
pub fn labels(samples: &[Sample]) -> Vec<usize> {
    samples.iter().map(|s| s.label).collect()
}

/// A model that produces class distributions.
pub trait Classifier {
    /// Number of output classes
    fn num_classes(&self) -> usize;

    /// Class probabilities for each sample, softened by `temperature`.
    fn predict(&self, samples: &[Sample], temperature: f32) -> Result<ProbabilityTable>;
}

/// Models that can be combined by scaled addition.
///
/// This is the placeholder weight update used by [`super::BlendPolicy`].
pub trait Blend: Sized {
    /// `self + other * weight`
    fn blend(&self, other: &Self, weight: f32) -> Result<Self>;
}

/// Produces a trained teacher snapshot.
///
/// Implementations must be deterministic for a fixed internal seed; the
/// selector calls this once per stage with a growing epoch count.
pub trait TeacherTrainer<M> {
    fn train_teacher(&mut self, teacher: &M, dataset: &[Sample], epochs: usize) -> Result<M>;
}
