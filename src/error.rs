//! Error types for distill-select

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Shape mismatch: expected {expected:?}, got {got:?}")]
    ShapeMismatch {
        expected: Vec<usize>,
        got: Vec<usize>,
    },

    #[error("Empty input: {0}")]
    EmptyInput(String),

    #[error("Invalid probability table: {0}")]
    InvalidProbabilities(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("No teacher snapshot to select ({collected} collected, {disqualified} disqualified)")]
    NoCandidates {
        collected: usize,
        disqualified: usize,
    },

    #[error("Numerically degenerate loss: {0}")]
    NumericDegenerate(String),
}

impl Error {
    /// Whether the error was caused by malformed caller input.
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            Self::ShapeMismatch { .. }
                | Self::EmptyInput(_)
                | Self::InvalidProbabilities(_)
                | Self::InvalidParameter(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_input_family() {
        let shape = Error::ShapeMismatch {
            expected: vec![1, 2],
            got: vec![2, 2],
        };
        let none_left = Error::NoCandidates {
            collected: 0,
            disqualified: 0,
        };
        assert!(shape.is_invalid_input());
        assert!(Error::EmptyInput("subset".into()).is_invalid_input());
        assert!(Error::InvalidProbabilities("row 0".into()).is_invalid_input());
        assert!(Error::InvalidParameter("alpha".into()).is_invalid_input());
        assert!(!Error::NumericDegenerate("inf".into()).is_invalid_input());
        assert!(!none_left.is_invalid_input());
    }

    #[test]
    fn test_no_candidates_message() {
        let err = Error::NoCandidates {
            collected: 3,
            disqualified: 2,
        };
        let msg = err.to_string();
        assert!(msg.contains("3 collected"));
        assert!(msg.contains("2 disqualified"));
    }
}
