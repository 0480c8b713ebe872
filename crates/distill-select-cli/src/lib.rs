//! Command-line teacher snapshot selection.
//!
//! - Configure the snapshot schedule and distillation hyperparameters via YAML
//! - Validate the configuration before any snapshot is trained
//! - Run selection over synthetic models and report every candidate
//!
//! # Toyota Way Principles
//!
//! - **Jidoka**: Pre-flight validation catches errors before training
//! - **Andon**: Every failure carries a code and a suggested fix

pub mod cli;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod validation;

pub use config::SelectConfig;
pub use error::{CliError, Result};
pub use pipeline::{Pipeline, PipelineResult, SelectionReport};
pub use validation::ConfigValidator;

use distill_select::distill::{pick_best, CandidateScore};

/// Run the selection pipeline with the given configuration.
pub fn run(config: &SelectConfig) -> Result<PipelineResult> {
    // Validate configuration first (Jidoka)
    ConfigValidator::validate(config)?;

    Pipeline::new(config).execute()
}

/// Apply the selection rule to precomputed losses.
///
/// Non-finite losses count as disqualified; negative losses are rejected.
/// Returns the scores (one stage per loss, `save_interval` epochs apart) and
/// the winning index.
pub fn pick(losses: &[f32], save_interval: usize) -> Result<(Vec<CandidateScore>, usize)> {
    if let Some(pos) = losses.iter().position(|&l| l.is_finite() && l < 0.0) {
        return Err(CliError::ConfigValue {
            field: "losses".into(),
            message: format!("Loss {} at position {pos} is negative", losses[pos]),
            suggestion: "Pass KL divergences, which are never below 0".into(),
        });
    }

    let scores: Vec<CandidateScore> = losses
        .iter()
        .enumerate()
        .map(|(index, &loss)| CandidateScore {
            index,
            stage: index + 1,
            epochs: (index + 1).saturating_mul(save_interval),
            loss: Some(loss).filter(|l| l.is_finite()),
        })
        .collect();
    let best = pick_best(&scores)?;
    Ok((scores, best))
}

/// Render candidate scores as an aligned text table, marking the winner.
pub fn render_table(scores: &[CandidateScore], best: usize) -> String {
    let mut out = format!(
        "{:>5}  {:>5}  {:>6}  {:>12}\n",
        "index", "stage", "epochs", "loss"
    );
    for score in scores {
        let loss = match score.loss {
            Some(l) => format!("{l:.6}"),
            None => "disqualified".to_string(),
        };
        let marker = if score.index == best { "  *" } else { "" };
        out.push_str(&format!(
            "{:>5}  {:>5}  {:>6}  {:>12}{marker}\n",
            score.index, score.stage, score.epochs, loss
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pick_lowest_loss() {
        let (scores, best) = pick(&[0.8, 0.3, 0.5], 5).unwrap();
        assert_eq!(best, 1);
        assert_eq!(scores[2].epochs, 15);
    }

    #[test]
    fn test_pick_tie_takes_first() {
        let (_, best) = pick(&[0.4, 0.4, 0.9], 5).unwrap();
        assert_eq!(best, 0);
    }

    #[test]
    fn test_pick_non_finite_disqualified() {
        let losses = [f32::NAN, f32::INFINITY, f32::NEG_INFINITY, 2.0];
        let (scores, best) = pick(&losses, 1).unwrap();
        assert_eq!(best, 3);
        assert!(scores[0].is_disqualified());
        assert!(scores[1].is_disqualified());
        assert!(scores[2].is_disqualified());
    }

    #[test]
    fn test_pick_rejects_negative_loss() {
        let err = pick(&[0.2, -0.1], 5).unwrap_err();
        assert_eq!(err.code(), "E003");
        assert!(err.to_string().contains("position 1"));
    }

    #[test]
    fn test_pick_huge_interval_saturates() {
        let (scores, best) = pick(&[0.5, 0.4], usize::MAX).unwrap();
        assert_eq!(best, 1);
        assert_eq!(scores[0].epochs, usize::MAX);
        assert_eq!(scores[1].epochs, usize::MAX);
    }

    #[test]
    fn test_pick_empty_fails() {
        let err = pick(&[], 5).unwrap_err();
        assert_eq!(err.code(), "E100");
    }

    #[test]
    fn test_render_table_marks_winner() {
        let (scores, best) = pick(&[0.8, f32::NAN, 0.5], 5).unwrap();
        let table = render_table(&scores, best);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].contains("loss"));
        assert!(lines[2].contains("disqualified"));
        assert!(lines[3].ends_with('*'));
        assert!(!lines[1].ends_with('*'));
    }

    #[test]
    fn test_run_validates_first() {
        let mut config = SelectConfig::default();
        config.selection.save_interval = 0;
        assert!(matches!(run(&config), Err(CliError::ConfigValue { .. })));
    }
}
