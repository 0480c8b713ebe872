//! Configuration validation (Jidoka - built-in quality).
//!
//! Rejects configurations that cannot produce a selection before any
//! snapshot is trained.

use distill_select::distill::EVAL_SUBSET_DIVISOR;

use crate::config::{
    DatasetConfig, DistillationParams, SelectConfig, SelectionParams, TeacherConfig,
};
use crate::error::{CliError, Result};

/// Configuration validator implementing Jidoka principle.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate a selection configuration.
    ///
    /// Returns `Ok(())` if valid, or an error with actionable suggestions.
    pub fn validate(config: &SelectConfig) -> Result<()> {
        Self::validate_selection(&config.selection)?;
        Self::validate_distillation(&config.distillation)?;
        Self::validate_dataset(&config.dataset)?;
        Self::validate_teacher(&config.teacher)?;
        Ok(())
    }

    fn validate_selection(config: &SelectionParams) -> Result<()> {
        if config.save_interval == 0 {
            return Err(CliError::ConfigValue {
                field: "selection.save_interval".into(),
                message: "Save interval must be positive".into(),
                suggestion: "Use a save interval like 5 epochs".into(),
            });
        }

        if config.epochs < config.save_interval {
            return Err(CliError::ConfigValue {
                field: "selection.epochs".into(),
                message: format!(
                    "{} epochs with a save interval of {} collects no snapshots",
                    config.epochs, config.save_interval
                ),
                suggestion: "Set epochs to at least save_interval, e.g. 10 and 5".into(),
            });
        }

        Ok(())
    }

    fn validate_distillation(config: &DistillationParams) -> Result<()> {
        if !config.temperature.is_finite() || config.temperature <= 0.0 {
            return Err(CliError::ConfigValue {
                field: "distillation.temperature".into(),
                message: format!("Temperature must be positive, got {}", config.temperature),
                suggestion: "Use temperature 1.0-8.0 (3.0 recommended)".into(),
            });
        }

        if config.temperature > 20.0 {
            return Err(CliError::ConfigValue {
                field: "distillation.temperature".into(),
                message: format!("Temperature too high: {}", config.temperature),
                suggestion: "Use temperature 1.0-8.0 (3.0 recommended)".into(),
            });
        }

        if !(0.0..=1.0).contains(&config.alpha) {
            return Err(CliError::ConfigValue {
                field: "distillation.alpha".into(),
                message: format!("Alpha must be between 0 and 1, got {}", config.alpha),
                suggestion: "Use alpha 0.5-0.9 (0.7 recommended)".into(),
            });
        }

        Ok(())
    }

    fn validate_dataset(config: &DatasetConfig) -> Result<()> {
        if config.samples < EVAL_SUBSET_DIVISOR {
            return Err(CliError::ConfigValue {
                field: "dataset.samples".into(),
                message: format!("{} samples leave no evaluation subset", config.samples),
                suggestion: format!("Use at least {EVAL_SUBSET_DIVISOR} samples (100 recommended)"),
            });
        }

        if config.features == 0 {
            return Err(CliError::ConfigValue {
                field: "dataset.features".into(),
                message: "Feature width must be positive".into(),
                suggestion: "Use 16 features".into(),
            });
        }

        if config.classes < 2 {
            return Err(CliError::ConfigValue {
                field: "dataset.classes".into(),
                message: format!("Need at least 2 classes, got {}", config.classes),
                suggestion: "Use 10 classes".into(),
            });
        }

        Ok(())
    }

    fn validate_teacher(config: &TeacherConfig) -> Result<()> {
        if !config.step_scale.is_finite() || config.step_scale < 0.0 {
            return Err(CliError::ConfigValue {
                field: "teacher.step_scale".into(),
                message: format!("Step scale must be non-negative, got {}", config.step_scale),
                suggestion: "Use a small step scale like 0.05".into(),
            });
        }

        Ok(())
    }
}
