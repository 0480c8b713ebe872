//! Error types with actionable diagnostics (Andon principle).
//!
//! Every CLI error says what went wrong and what to try next.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// Errors surfaced by the `distill-select` binary.
#[derive(Error, Debug)]
pub enum CliError {
    /// Configuration file not found at expected path.
    #[error("Configuration file not found: {path}\n  → Create it or pass --config <path>")]
    ConfigNotFound { path: PathBuf },

    /// Configuration file has invalid syntax.
    #[error("Invalid configuration syntax in {path}:\n  {message}\n  → Check the YAML there")]
    ConfigParsing { path: PathBuf, message: String },

    /// Configuration value is invalid.
    #[error("Invalid configuration value for '{field}': {message}\n  → {suggestion}")]
    ConfigValue {
        field: String,
        message: String,
        suggestion: String,
    },

    /// IO error with context.
    #[error("IO error: {context}\n  Cause: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    /// Serialization error.
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    /// Teacher selection failed.
    #[error("Teacher selection failed: {source}\n  → {}", selection_hint(.source))]
    Selection {
        #[from]
        source: distill_select::Error,
    },
}

fn selection_hint(err: &distill_select::Error) -> &'static str {
    use distill_select::Error as E;
    match err {
        E::NoCandidates { collected: 0, .. } => {
            "Increase selection.epochs to at least selection.save_interval"
        }
        E::NoCandidates { .. } => {
            "Every snapshot was degenerate; smooth the distributions or raise the temperature"
        }
        E::EmptyInput(_) => "Use at least 10 samples so the evaluation subset is non-empty",
        E::NumericDegenerate(_) => {
            "Set selection.on_degenerate: disqualify to skip degenerate snapshots"
        }
        E::ShapeMismatch { .. } | E::InvalidProbabilities(_) | E::InvalidParameter(_) => {
            "Check dataset and model dimensions in the configuration"
        }
    }
}

impl CliError {
    /// Create an IO error with context.
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Check if this error is user-recoverable.
    pub fn is_user_error(&self) -> bool {
        match self {
            Self::ConfigNotFound { .. } | Self::ConfigParsing { .. } => true,
            Self::ConfigValue { .. } => true,
            Self::Selection { source } => {
                let no_candidates = matches!(source, distill_select::Error::NoCandidates { .. });
                source.is_invalid_input() || no_candidates
            }
            Self::Io { .. } | Self::Serialization { .. } => false,
        }
    }

    /// Get the error code for structured output.
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigNotFound { .. } => "E001",
            Self::ConfigParsing { .. } => "E002",
            Self::ConfigValue { .. } => "E003",
            Self::Io { .. } => "E050",
            Self::Serialization { .. } => "E051",
            Self::Selection { .. } => "E100",
        }
    }
}
