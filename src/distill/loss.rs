//! Distillation loss functions

use ndarray::Axis;
use serde::{Deserialize, Serialize};

use super::prob::ProbabilityTable;
use crate::error::{Error, Result};

/// Mean KL divergence KL(teacher ‖ student) over the rows of two tables.
///
/// KL(p || q) = Σ p_i * ln(p_i / q_i), with 0 * ln(0 / q) taken as 0.
///
/// Fails with [`Error::ShapeMismatch`] when the shapes differ,
/// [`Error::EmptyInput`] when there are no rows, and
/// [`Error::NumericDegenerate`] when the student assigns zero probability to
/// a class the teacher supports.
pub fn kl_divergence(teacher: &ProbabilityTable, student: &ProbabilityTable) -> Result<f32> {
    if teacher.shape() != student.shape() {
        return Err(Error::ShapeMismatch {
            expected: teacher.shape().to_vec(),
            got: student.shape().to_vec(),
        });
    }
    if teacher.is_empty() {
        return Err(Error::EmptyInput("KL divergence over zero examples".into()));
    }

    let mut total_kl = 0.0;

    for (row, (p_row, q_row)) in teacher
        .view()
        .axis_iter(Axis(0))
        .zip(student.view().axis_iter(Axis(0)))
        .enumerate()
    {
        let mut kl = 0.0;
        for (class, (&p_i, &q_i)) in p_row.iter().zip(q_row.iter()).enumerate() {
            if p_i == 0.0 {
                continue;
            }
            if q_i == 0.0 {
                return Err(Error::NumericDegenerate(format!(
                    "student assigns zero probability to class {class} of example {row} \
                     (teacher probability {p_i})"
                )));
            }
            kl += p_i * (p_i / q_i).ln();
        }
        total_kl += kl;
    }

    let mean = total_kl / teacher.nrows() as f32;
    if !mean.is_finite() {
        return Err(Error::NumericDegenerate(format!(
            "KL divergence evaluated to {mean}"
        )));
    }

    // Rounding can push identical rows a hair below zero
    Ok(mean.max(0.0))
}

/// Mean negative log-likelihood of the true labels under `student`.
pub fn cross_entropy(labels: &[usize], student: &ProbabilityTable) -> Result<f32> {
    if labels.len() != student.nrows() {
        return Err(Error::ShapeMismatch {
            expected: vec![student.nrows()],
            got: vec![labels.len()],
        });
    }
    if labels.is_empty() {
        return Err(Error::EmptyInput("cross entropy over zero examples".into()));
    }

    let probs = student.view();
    let mut loss = 0.0;
    for (i, &label) in labels.iter().enumerate() {
        if label >= student.ncols() {
            return Err(Error::InvalidParameter(format!(
                "label {label} of example {i} is out of range for {} classes",
                student.ncols()
            )));
        }
        let prob = probs[[i, label]];
        if prob == 0.0 {
            return Err(Error::NumericDegenerate(format!(
                "zero probability on true label {label} of example {i}"
            )));
        }
        loss -= prob.ln();
    }

    Ok(loss / labels.len() as f32)
}

/// Per-step loss values, reported to observers and update policies
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LossBreakdown {
    /// KL(teacher ‖ student)
    pub distillation: f32,
    /// Cross-entropy against ground truth
    pub hard: f32,
    /// α * distillation + (1 - α) * hard
    pub total: f32,
}

/// Knowledge Distillation Loss
///
/// Combines soft targets from the teacher (KL divergence of
/// temperature-softened distributions) with hard targets from ground truth
/// labels (cross-entropy).
///
/// # Formula
///
/// ```text
/// L = α * KL(softmax(teacher/T) || softmax(student/T))
///   + (1-α) * CE(student, labels)
/// ```
///
/// # Example
///
/// ```
/// use distill_select::distill::DistillationLoss;
///
/// let loss_fn = DistillationLoss::new(3.0, 0.7).unwrap();
/// assert_eq!(loss_fn.combine(1.0, 1.0), 1.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DistillationLoss {
    /// Temperature for softening probability distributions
    pub temperature: f32,
    /// Weight for distillation loss (α). Hard loss weight is (1-α)
    pub alpha: f32,
}

impl DistillationLoss {
    /// Create a new distillation loss function
    ///
    /// # Arguments
    ///
    /// * `temperature` - Temperature for softening distributions (typically 2.0-5.0)
    /// * `alpha` - Weight for distillation vs hard loss, in [0, 1]
    pub fn new(temperature: f32, alpha: f32) -> Result<Self> {
        if !temperature.is_finite() || temperature <= 0.0 {
            return Err(Error::InvalidParameter(format!(
                "Temperature must be positive, got {temperature}"
            )));
        }
        if !(0.0..=1.0).contains(&alpha) {
            return Err(Error::InvalidParameter(format!(
                "Alpha must be in [0, 1], got {alpha}"
            )));
        }

        Ok(Self { temperature, alpha })
    }

    /// Weighted sum of a distillation loss and a hard loss.
    pub fn combine(&self, distillation: f32, hard: f32) -> f32 {
        self.alpha * distillation + (1.0 - self.alpha) * hard
    }

    /// Compute all three loss terms from already-softened distributions.
    pub fn evaluate(
        &self,
        teacher: &ProbabilityTable,
        student: &ProbabilityTable,
        labels: &[usize],
    ) -> Result<LossBreakdown> {
        let distillation = kl_divergence(teacher, student)?;
        let hard = cross_entropy(labels, student)?;

        Ok(LossBreakdown {
            distillation,
            hard,
            total: self.combine(distillation, hard),
        })
    }
}

impl Default for DistillationLoss {
    fn default() -> Self {
        Self {
            temperature: 3.0,
            alpha: 0.7,
        }
    }
}
