//! Seeded stand-ins for the outside world
//!
//! Real datasets, models and teacher training live elsewhere. These
//! deterministic substitutes let selection run end to end.

use ndarray::{Array1, Array2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::distill::{Blend, Classifier, ProbabilityTable, Sample, TeacherTrainer};
use crate::error::{Error, Result};

/// `samples` examples with uniform features in [0, 1) and uniform labels.
pub fn make_dataset(samples: usize, features: usize, classes: usize, seed: u64) -> Vec<Sample> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..samples)
        .map(|_| {
            let x = Array1::from_shape_fn(features, |_| rng.random::<f32>());
            let label = rng.random_range(0..classes.max(1));
            Sample::new(x, label)
        })
        .collect()
}

/// Linear model with a softmax head: `softmax((x · W + b) / T)`
#[derive(Debug, Clone, PartialEq)]
pub struct LinearSoftmax {
    /// [features, classes]
    pub weights: Array2<f32>,
    /// [classes]
    pub bias: Array1<f32>,
}

impl LinearSoftmax {
    pub fn new(weights: Array2<f32>, bias: Array1<f32>) -> Result<Self> {
        if weights.ncols() != bias.len() {
            return Err(Error::ShapeMismatch {
                expected: vec![weights.ncols()],
                got: vec![bias.len()],
            });
        }
        Ok(Self { weights, bias })
    }

    /// Weights drawn uniformly from [0, 1), zero bias
    pub fn random(features: usize, classes: usize, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let weights = Array2::from_shape_fn((features, classes), |_| rng.random::<f32>());
        Self {
            weights,
            bias: Array1::zeros(classes),
        }
    }

    pub fn num_features(&self) -> usize {
        self.weights.nrows()
    }

    /// Raw logits, one row per sample
    pub fn logits(&self, samples: &[Sample]) -> Result<Array2<f32>> {
        let mut logits = Array2::zeros((samples.len(), self.num_classes()));
        for (i, sample) in samples.iter().enumerate() {
            if sample.features.len() != self.num_features() {
                return Err(Error::ShapeMismatch {
                    expected: vec![self.num_features()],
                    got: vec![sample.features.len()],
                });
            }
            let row = sample.features.dot(&self.weights) + &self.bias;
            logits.row_mut(i).assign(&row);
        }
        Ok(logits)
    }
}

impl Classifier for LinearSoftmax {
    fn num_classes(&self) -> usize {
        self.weights.ncols()
    }

    fn predict(&self, samples: &[Sample], temperature: f32) -> Result<ProbabilityTable> {
        ProbabilityTable::from_logits(&self.logits(samples)?, temperature)
    }
}

impl Blend for LinearSoftmax {
    fn blend(&self, other: &Self, weight: f32) -> Result<Self> {
        if self.weights.dim() != other.weights.dim() {
            let (r, c) = self.weights.dim();
            let (or, oc) = other.weights.dim();
            return Err(Error::ShapeMismatch {
                expected: vec![r, c],
                got: vec![or, oc],
            });
        }
        Ok(Self {
            weights: &self.weights + &(&other.weights * weight),
            bias: &self.bias + &(&other.bias * weight),
        })
    }
}

/// Teacher "training" as a seeded random walk over the weights.
///
/// Each epoch adds uniform noise in `[-step_scale, step_scale)`. The walk is
/// replayed from the initial teacher on every call, so a snapshot depends
/// only on the seed and the epoch count.
#[derive(Debug, Clone)]
pub struct SyntheticTeacherTrainer {
    seed: u64,
    step_scale: f32,
}

impl SyntheticTeacherTrainer {
    pub fn new(seed: u64, step_scale: f32) -> Self {
        Self { seed, step_scale }
    }
}

impl TeacherTrainer<LinearSoftmax> for SyntheticTeacherTrainer {
    fn train_teacher(
        &mut self,
        teacher: &LinearSoftmax,
        _dataset: &[Sample],
        epochs: usize,
    ) -> Result<LinearSoftmax> {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut trained = teacher.clone();
        let scale = self.step_scale;
        for _ in 0..epochs {
            trained
                .weights
                .mapv_inplace(|w| w + scale * (2.0 * rng.random::<f32>() - 1.0));
        }
        Ok(trained)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn test_make_dataset_shape_and_labels() {
        let data = make_dataset(50, 4, 3, 1);
        assert_eq!(data.len(), 50);
        assert!(data.iter().all(|s| s.features.len() == 4 && s.label < 3));
    }

    #[test]
    fn test_make_dataset_deterministic() {
        assert_eq!(make_dataset(20, 3, 5, 9), make_dataset(20, 3, 5, 9));
        assert_ne!(make_dataset(20, 3, 5, 9), make_dataset(20, 3, 5, 10));
    }

    #[test]
    fn test_linear_logits() {
        let weights = array![[1.0, 0.0], [0.0, 2.0]];
        let model = LinearSoftmax::new(weights, array![0.5, 0.0]).unwrap();
        let samples = vec![Sample::new(array![1.0, 1.0], 0)];
        let logits = model.logits(&samples).unwrap();
        assert_eq!(logits, array![[1.5, 2.0]]);
    }

    #[test]
    fn test_predict_rows_are_distributions() {
        let model = LinearSoftmax::random(6, 4, 3);
        let probs = model.predict(&make_dataset(12, 6, 4, 3), 3.0).unwrap();
        assert_eq!(probs.shape(), [12, 4]);
        for row in probs.view().rows() {
            assert_relative_eq!(row.sum(), 1.0, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_feature_width_mismatch() {
        let model = LinearSoftmax::random(3, 2, 0);
        let samples = vec![Sample::new(array![1.0], 0)];
        let err = model.predict(&samples, 1.0).unwrap_err();
        assert!(matches!(err, Error::ShapeMismatch { .. }));
    }

    #[test]
    fn test_new_checks_bias_width() {
        let model = LinearSoftmax::new(Array2::zeros((2, 3)), Array1::zeros(2));
        assert!(model.is_err());
    }

    #[test]
    fn test_blend_scales_other() {
        let a = LinearSoftmax::new(array![[1.0]], array![0.0]).unwrap();
        let b = LinearSoftmax::new(array![[2.0]], array![1.0]).unwrap();
        let blended = a.blend(&b, 0.5).unwrap();
        assert_eq!(blended.weights, array![[2.0]]);
        assert_eq!(blended.bias, array![0.5]);
    }

    #[test]
    fn test_blend_shape_mismatch() {
        let a = LinearSoftmax::random(2, 2, 0);
        let b = LinearSoftmax::random(3, 2, 0);
        let err = a.blend(&b, 1.0).unwrap_err();
        assert!(matches!(err, Error::ShapeMismatch { .. }));
    }

    #[test]
    fn test_teacher_trainer_is_deterministic() {
        let teacher = LinearSoftmax::random(4, 3, 11);
        let mut trainer = SyntheticTeacherTrainer::new(5, 0.1);

        let first = trainer.train_teacher(&teacher, &[], 10).unwrap();
        let again = trainer.train_teacher(&teacher, &[], 10).unwrap();
        let longer = trainer.train_teacher(&teacher, &[], 15).unwrap();

        assert_eq!(first, again);
        assert_ne!(first, longer);
        assert_ne!(first, teacher);
    }

    #[test]
    fn test_zero_epochs_returns_initial_teacher() {
        let teacher = LinearSoftmax::random(4, 3, 11);
        let mut trainer = SyntheticTeacherTrainer::new(5, 0.1);
        assert_eq!(trainer.train_teacher(&teacher, &[], 0).unwrap(), teacher);
    }

    #[test]
    fn test_zero_class_model_cannot_predict() {
        let model = LinearSoftmax::random(4, 0, 1);
        let err = model.predict(&make_dataset(5, 4, 2, 0), 1.0).unwrap_err();
        assert!(matches!(err, Error::InvalidParameter(_)));
    }
}
