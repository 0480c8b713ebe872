//! Selection pipeline execution.
//!
//! Builds the synthetic dataset and models from the configuration, runs
//! teacher selection and summarizes the outcome.

use serde::{Deserialize, Serialize};

use distill_select::distill::{
    CandidateScore, Distiller, LogObserver, SelectionObserver, TeacherSelector,
};
use distill_select::synthetic::{make_dataset, LinearSoftmax, SyntheticTeacherTrainer};

use crate::config::SelectConfig;
use crate::error::Result;

/// Seed offset between the initial teacher and student weights
const STUDENT_SEED_OFFSET: u64 = 1;

/// Summary of a completed selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionReport {
    /// Index of the winning snapshot
    pub best_index: usize,
    /// Stage of the winning snapshot
    pub best_stage: usize,
    /// Teacher epochs behind the winning snapshot
    pub best_epochs: usize,
    /// Winning distillation loss
    pub best_loss: Option<f32>,
    /// Every candidate, in collection order
    pub scores: Vec<CandidateScore>,
}

impl SelectionReport {
    /// Number of candidates excluded for degenerate losses.
    pub fn disqualified(&self) -> usize {
        self.scores.iter().filter(|s| s.is_disqualified()).count()
    }
}

/// Pipeline execution result.
#[derive(Debug, Clone)]
pub struct PipelineResult {
    pub report: SelectionReport,
    /// Total execution time in seconds
    pub duration_seconds: f64,
}

/// Selection pipeline orchestrator.
pub struct Pipeline<'a> {
    config: &'a SelectConfig,
}

impl<'a> Pipeline<'a> {
    /// Create a new pipeline with the given configuration.
    pub fn new(config: &'a SelectConfig) -> Self {
        Self { config }
    }

    /// Execute with progress reported through `log`.
    pub fn execute(&self) -> Result<PipelineResult> {
        self.execute_observed(&mut LogObserver)
    }

    /// Execute, reporting progress to `observer`.
    pub fn execute_observed(&self, observer: &mut dyn SelectionObserver) -> Result<PipelineResult> {
        let start = std::time::Instant::now();
        let cfg = self.config;

        let (features, classes) = (cfg.dataset.features, cfg.dataset.classes);
        let student_seed = cfg.dataset.seed.wrapping_add(STUDENT_SEED_OFFSET);
        let teacher = LinearSoftmax::random(features, classes, cfg.dataset.seed);
        let student = LinearSoftmax::random(features, classes, student_seed);
        let dataset = make_dataset(cfg.dataset.samples, features, classes, cfg.dataset.seed);
        log::debug!(
            "Synthetic dataset: {} samples, {features} features, {classes} classes",
            dataset.len()
        );

        let trainer = SyntheticTeacherTrainer::new(cfg.teacher.seed, cfg.teacher.step_scale);
        let distiller = Distiller::blend(cfg.distillation.temperature, cfg.distillation.alpha)?;
        let mut selector = TeacherSelector::new(trainer, distiller)
            .with_degenerate_policy(cfg.selection.on_degenerate);

        let selection = selector.select_best_teacher_observed(
            &dataset,
            &teacher,
            &student,
            cfg.selection.epochs,
            cfg.selection.save_interval,
            observer,
        )?;

        let best = *selection.best();
        Ok(PipelineResult {
            report: SelectionReport {
                best_index: selection.index,
                best_stage: best.stage,
                best_epochs: best.epochs,
                best_loss: best.loss,
                scores: selection.scores,
            },
            duration_seconds: start.elapsed().as_secs_f64(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use distill_select::distill::RecordingObserver;

    #[test]
    fn test_default_pipeline_two_candidates() {
        let config = SelectConfig::default();
        let mut recorder = RecordingObserver::default();
        let result = Pipeline::new(&config)
            .execute_observed(&mut recorder)
            .unwrap();

        let report = &result.report;
        assert_eq!(report.scores.len(), 2);
        assert_eq!(report.disqualified(), 0);
        assert!(report.best_index < 2);
        assert_eq!(report.best_stage, report.best_index + 1);
        assert_eq!(report.best_epochs, report.best_stage * 5);
        assert_eq!(report.best_loss, report.scores[report.best_index].loss);
        assert_eq!(recorder.snapshots.len(), 2);
        assert!(result.duration_seconds >= 0.0);
    }

    #[test]
    fn test_pipeline_is_deterministic() {
        let config = SelectConfig::default();
        let first = Pipeline::new(&config).execute().unwrap();
        let second = Pipeline::new(&config).execute().unwrap();
        assert_eq!(first.report, second.report);
    }

    #[test]
    fn test_pipeline_surfaces_selection_errors() {
        let mut config = SelectConfig::default();
        config.selection.epochs = 2;
        let err = Pipeline::new(&config).execute().unwrap_err();
        assert_eq!(err.code(), "E100");
    }

    #[test]
    fn test_report_serializes_to_json() {
        let config = SelectConfig::default();
        let result = Pipeline::new(&config).execute().unwrap();
        let json = serde_json::to_value(&result.report).unwrap();
        assert_eq!(json["scores"].as_array().unwrap().len(), 2);
        assert!(json["best_index"].is_u64());
    }
}
