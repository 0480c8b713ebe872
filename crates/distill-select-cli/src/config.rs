//! Selection configuration parsing and management.
//!
//! Supports YAML configuration files; every section and field has a default.

use serde::{Deserialize, Serialize};
use std::path::Path;

use distill_select::distill::DegeneratePolicy;

use crate::error::{CliError, Result};

/// Complete selection configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SelectConfig {
    /// Snapshot schedule
    #[serde(default)]
    pub selection: SelectionParams,
    /// Student distillation hyperparameters
    #[serde(default)]
    pub distillation: DistillationParams,
    /// Synthetic dataset shape
    #[serde(default)]
    pub dataset: DatasetConfig,
    /// Synthetic teacher training
    #[serde(default)]
    pub teacher: TeacherConfig,
}

impl SelectConfig {
    /// Load configuration from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(CliError::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)
            .map_err(|e| CliError::io(format!("reading config file: {}", path.display()), e))?;

        Self::from_yaml(&content, path)
    }

    /// Parse configuration from YAML string.
    pub fn from_yaml(content: &str, path: &Path) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|e| CliError::ConfigParsing {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }
}

/// Snapshot schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionParams {
    /// Total teacher training epochs
    #[serde(default = "default_epochs")]
    pub epochs: usize,
    /// Epochs between snapshots
    #[serde(default = "default_save_interval")]
    pub save_interval: usize,
    /// Handling of numerically degenerate candidates
    #[serde(default)]
    pub on_degenerate: DegeneratePolicy,
}

impl Default for SelectionParams {
    fn default() -> Self {
        Self {
            epochs: default_epochs(),
            save_interval: default_save_interval(),
            on_degenerate: DegeneratePolicy::default(),
        }
    }
}

fn default_epochs() -> usize {
    10
}

fn default_save_interval() -> usize {
    5
}

/// Distillation hyperparameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistillationParams {
    /// Temperature for soft targets
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Balance between soft and hard targets (0-1)
    #[serde(default = "default_alpha")]
    pub alpha: f32,
}

impl Default for DistillationParams {
    fn default() -> Self {
        Self {
            temperature: default_temperature(),
            alpha: default_alpha(),
        }
    }
}

fn default_temperature() -> f32 {
    3.0
}

fn default_alpha() -> f32 {
    0.7
}

/// Synthetic dataset configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetConfig {
    /// Number of samples
    #[serde(default = "default_samples")]
    pub samples: usize,
    /// Feature width
    #[serde(default = "default_features")]
    pub features: usize,
    /// Number of classes
    #[serde(default = "default_classes")]
    pub classes: usize,
    /// RNG seed for samples and initial models
    #[serde(default = "default_dataset_seed")]
    pub seed: u64,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            samples: default_samples(),
            features: default_features(),
            classes: default_classes(),
            seed: default_dataset_seed(),
        }
    }
}

fn default_samples() -> usize {
    100
}

fn default_features() -> usize {
    16
}

fn default_classes() -> usize {
    10
}

fn default_dataset_seed() -> u64 {
    42
}

/// Synthetic teacher training configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeacherConfig {
    /// RNG seed for the weight walk
    #[serde(default = "default_teacher_seed")]
    pub seed: u64,
    /// Per-epoch weight perturbation
    #[serde(default = "default_step_scale")]
    pub step_scale: f32,
}

impl Default for TeacherConfig {
    fn default() -> Self {
        Self {
            seed: default_teacher_seed(),
            step_scale: default_step_scale(),
        }
    }
}

fn default_teacher_seed() -> u64 {
    7
}

fn default_step_scale() -> f32 {
    0.05
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_YAML: &str = r#"
selection:
  epochs: 20
  save_interval: 4
  on_degenerate: abort

distillation:
  temperature: 2.5
  alpha: 0.6

dataset:
  samples: 200
  classes: 5
"#;

    #[test]
    fn test_parse_yaml_config() {
        let path = Path::new("select.yaml");
        let config = SelectConfig::from_yaml(SAMPLE_YAML, path).unwrap();

        assert_eq!(config.selection.epochs, 20);
        assert_eq!(config.selection.save_interval, 4);
        assert_eq!(config.selection.on_degenerate, DegeneratePolicy::Abort);
        assert_eq!(config.distillation.temperature, 2.5);
        assert_eq!(config.distillation.alpha, 0.6);
        assert_eq!(config.dataset.samples, 200);
        assert_eq!(config.dataset.classes, 5);
        // Unset fields fall back to defaults
        assert_eq!(config.dataset.features, 16);
        assert_eq!(config.teacher, TeacherConfig::default());
    }

    #[test]
    fn test_empty_document_is_all_defaults() {
        let path = Path::new("empty.yaml");
        let config = SelectConfig::from_yaml("{}", path).unwrap();
        assert_eq!(config, SelectConfig::default());
        assert_eq!(config.selection.epochs, 10);
        assert_eq!(config.selection.save_interval, 5);
        assert_eq!(config.distillation.temperature, 3.0);
        assert_eq!(config.distillation.alpha, 0.7);
    }

    #[test]
    fn test_bad_yaml_is_parsing_error() {
        let path = Path::new("bad.yaml");
        let err = SelectConfig::from_yaml("selection: [", path).unwrap_err();
        assert!(matches!(err, CliError::ConfigParsing { .. }));
        assert!(err.to_string().contains("bad.yaml"));
    }

    #[test]
    fn test_unknown_policy_is_parsing_error() {
        let yaml = "selection:\n  on_degenerate: ignore\n";
        assert!(SelectConfig::from_yaml(yaml, Path::new("x.yaml")).is_err());
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let path = Path::new("/nonexistent/select.yaml");
        let err = SelectConfig::from_file(path).unwrap_err();
        assert!(matches!(err, CliError::ConfigNotFound { .. }));
    }

    #[test]
    fn test_roundtrip_through_yaml() {
        let config = SelectConfig::default();
        let yaml = serde_yaml::to_string(&config).unwrap();
        assert!(yaml.contains("save_interval"));
        assert!(yaml.contains("disqualify"));
    }
}
