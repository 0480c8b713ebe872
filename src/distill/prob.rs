//! Validated probability tables (examples × classes)

use ndarray::{Array2, ArrayView2, Axis};

use crate::error::{Error, Result};

/// Maximum deviation of a row sum from 1.0 before the row is rejected
pub const ROW_SUM_TOLERANCE: f32 = 1e-4;

/// A 2-D table of probability distributions, one row per example.
///
/// Every entry is finite and non-negative and every row sums to 1 within
/// [`ROW_SUM_TOLERANCE`]. The only ways to build one are [`ProbabilityTable::new`],
/// which validates, and [`ProbabilityTable::from_logits`], which normalizes.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbabilityTable {
    probs: Array2<f32>,
}

impl ProbabilityTable {
    /// Validate an existing table of probabilities.
    pub fn new(probs: Array2<f32>) -> Result<Self> {
        for (i, row) in probs.axis_iter(Axis(0)).enumerate() {
            if let Some(&bad) = row.iter().find(|p| !p.is_finite() || **p < 0.0) {
                return Err(Error::InvalidProbabilities(format!(
                    "row {i} contains {bad}, entries must be finite and non-negative"
                )));
            }
            let sum: f32 = row.sum();
            if (sum - 1.0).abs() > ROW_SUM_TOLERANCE {
                return Err(Error::InvalidProbabilities(format!(
                    "row {i} sums to {sum}, expected 1"
                )));
            }
        }
        Ok(Self { probs })
    }

    /// Softmax of `logits / temperature`, row by row.
    pub fn from_logits(logits: &Array2<f32>, temperature: f32) -> Result<Self> {
        Ok(Self {
            probs: softmax_2d(logits, temperature)?,
        })
    }

    /// Number of examples (rows)
    pub fn nrows(&self) -> usize {
        self.probs.nrows()
    }

    /// Number of classes (columns)
    pub fn ncols(&self) -> usize {
        self.probs.ncols()
    }

    pub fn shape(&self) -> [usize; 2] {
        [self.nrows(), self.ncols()]
    }

    pub fn is_empty(&self) -> bool {
        self.nrows() == 0
    }

    pub fn view(&self) -> ArrayView2<'_, f32> {
        self.probs.view()
    }

    pub fn into_inner(self) -> Array2<f32> {
        self.probs
    }
}

/// Compute softmax along last axis for 2D array
///
/// softmax(x / T)_i = exp(x_i / T) / Σ exp(x_j / T)
pub fn softmax_2d(logits: &Array2<f32>, temperature: f32) -> Result<Array2<f32>> {
    if !temperature.is_finite() || temperature <= 0.0 {
        return Err(Error::InvalidParameter(format!(
            "temperature must be positive and finite, got {temperature}"
        )));
    }
    if let Some(&bad) = logits.iter().find(|v| !v.is_finite()) {
        return Err(Error::InvalidParameter(format!(
            "logits must be finite, got {bad}"
        )));
    }
    if logits.nrows() > 0 && logits.ncols() == 0 {
        return Err(Error::InvalidParameter(format!(
            "{} rows of logits have no classes",
            logits.nrows()
        )));
    }

    let mut result = logits / temperature;

    for mut row in result.axis_iter_mut(Axis(0)) {
        // Subtract max for numerical stability
        let max_val = row.iter().fold(f32::NEG_INFINITY, |a, &b| a.max(b));
        row.mapv_inplace(|v| (v - max_val).exp());

        let sum: f32 = row.sum();
        row.mapv_inplace(|v| v / sum);
    }

    Ok(result)
}
