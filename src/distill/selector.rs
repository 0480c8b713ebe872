//! Teacher snapshot selection
//!
//! Collects a teacher snapshot every `save_interval` epochs, distills a fresh
//! student from each one on the first tenth of the dataset, and keeps the
//! snapshot whose student ends up closest to it in KL divergence.

use serde::{Deserialize, Serialize};

use super::loss::kl_divergence;
use super::model::{Classifier, Sample, TeacherTrainer};
use super::observer::{SelectionObserver, SnapshotEvent};
use super::student::{Distiller, StudentUpdatePolicy};
use crate::error::{Error, Result};

/// The evaluation subset is the first `len / EVAL_SUBSET_DIVISOR` samples
pub const EVAL_SUBSET_DIVISOR: usize = 10;

/// Temperature at which candidate scores are measured
pub const SCORING_TEMPERATURE: f32 = 1.0;

/// What to do with a candidate whose loss is numerically degenerate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DegeneratePolicy {
    /// Record the candidate without a loss; it can never win
    #[default]
    Disqualify,
    /// Fail the whole selection
    Abort,
}

/// Measured loss of one teacher snapshot
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CandidateScore {
    /// Position in collection order, starting at 0
    pub index: usize,
    /// Stage number, `index + 1`
    pub stage: usize,
    /// Teacher training epochs behind the snapshot
    pub epochs: usize,
    /// Distillation loss, `None` when disqualified
    pub loss: Option<f32>,
}

impl CandidateScore {
    pub fn is_disqualified(&self) -> bool {
        self.loss.is_none()
    }
}

/// A captured teacher snapshot together with its score
#[derive(Debug, Clone)]
pub struct Candidate<M> {
    pub snapshot: M,
    pub score: CandidateScore,
}

/// Outcome of [`TeacherSelector::select_best_teacher`]
#[derive(Debug, Clone)]
pub struct Selection<M> {
    /// The winning teacher snapshot
    pub snapshot: M,
    /// Index of the winner in collection order
    pub index: usize,
    /// Scores of every collected candidate, in collection order
    pub scores: Vec<CandidateScore>,
}

impl<M> Selection<M> {
    pub fn best(&self) -> &CandidateScore {
        &self.scores[self.index]
    }
}

/// Index of the lowest finite loss; ties go to the earliest candidate.
///
/// Disqualified candidates and non-finite losses are skipped. Fails with
/// [`Error::NoCandidates`] when nothing is left to choose from.
pub fn pick_best(scores: &[CandidateScore]) -> Result<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (pos, score) in scores.iter().enumerate() {
        let Some(loss) = score.loss.filter(|l| l.is_finite()) else {
            continue;
        };
        match best {
            Some((_, best_loss)) if loss >= best_loss => {}
            _ => best = Some((pos, loss)),
        }
    }

    match best {
        Some((pos, _)) => Ok(pos),
        None => Err(Error::NoCandidates {
            collected: scores.len(),
            disqualified: scores
                .iter()
                .filter(|s| !s.loss.is_some_and(f32::is_finite))
                .count(),
        }),
    }
}

/// Samples every candidate is evaluated on.
pub fn evaluation_subset(dataset: &[Sample]) -> &[Sample] {
    &dataset[..dataset.len() / EVAL_SUBSET_DIVISOR]
}

/// Number of snapshots a run with these settings collects.
pub fn stage_count(epochs: usize, save_interval: usize) -> Result<usize> {
    if save_interval == 0 {
        return Err(Error::InvalidParameter(
            "save_interval must be at least 1".into(),
        ));
    }
    Ok(epochs / save_interval)
}

/// Picks the teacher snapshot that distills best.
pub struct TeacherSelector<T, P> {
    teacher_trainer: T,
    distiller: Distiller<P>,
    on_degenerate: DegeneratePolicy,
}

impl<T, P> TeacherSelector<T, P> {
    pub fn new(teacher_trainer: T, distiller: Distiller<P>) -> Self {
        Self {
            teacher_trainer,
            distiller,
            on_degenerate: DegeneratePolicy::default(),
        }
    }

    /// Set the policy for numerically degenerate candidates
    pub fn with_degenerate_policy(mut self, policy: DegeneratePolicy) -> Self {
        self.on_degenerate = policy;
        self
    }

    pub fn degenerate_policy(&self) -> DegeneratePolicy {
        self.on_degenerate
    }

    pub fn teacher_trainer(&self) -> &T {
        &self.teacher_trainer
    }

    /// Run selection without reporting progress.
    pub fn select_best_teacher<M>(
        &mut self,
        dataset: &[Sample],
        initial_teacher: &M,
        initial_student: &M,
        epochs: usize,
        save_interval: usize,
    ) -> Result<Selection<M>>
    where
        M: Classifier + Clone,
        T: TeacherTrainer<M>,
        P: StudentUpdatePolicy<M>,
    {
        struct Silent;
        impl SelectionObserver for Silent {}

        self.select_best_teacher_observed(
            dataset,
            initial_teacher,
            initial_student,
            epochs,
            save_interval,
            &mut Silent,
        )
    }

    /// Run selection, reporting every step to `observer`.
    pub fn select_best_teacher_observed<M>(
        &mut self,
        dataset: &[Sample],
        initial_teacher: &M,
        initial_student: &M,
        epochs: usize,
        save_interval: usize,
        observer: &mut dyn SelectionObserver,
    ) -> Result<Selection<M>>
    where
        M: Classifier + Clone,
        T: TeacherTrainer<M>,
        P: StudentUpdatePolicy<M>,
    {
        let stages = stage_count(epochs, save_interval)?;
        if stages == 0 {
            return Err(Error::NoCandidates {
                collected: 0,
                disqualified: 0,
            });
        }

        let subset = evaluation_subset(dataset);
        if subset.is_empty() {
            return Err(Error::EmptyInput(format!(
                "evaluation subset of {} samples is empty, need at least {}",
                dataset.len(),
                EVAL_SUBSET_DIVISOR
            )));
        }

        let mut candidates =
            self.collect_snapshots(dataset, initial_teacher, stages, save_interval, observer)?;

        for candidate in &mut candidates {
            let loss = self.score_candidate(candidate, initial_student, subset, observer)?;
            candidate.score.loss = loss;
            observer.on_candidate_scored(&candidate.score);
        }

        let scores: Vec<CandidateScore> = candidates.iter().map(|c| c.score).collect();
        let index = pick_best(&scores)?;
        observer.on_selected(&scores[index]);

        let snapshot = candidates.swap_remove(index).snapshot;
        Ok(Selection {
            snapshot,
            index,
            scores,
        })
    }

    fn collect_snapshots<M>(
        &mut self,
        dataset: &[Sample],
        initial_teacher: &M,
        stages: usize,
        save_interval: usize,
        observer: &mut dyn SelectionObserver,
    ) -> Result<Vec<Candidate<M>>>
    where
        T: TeacherTrainer<M>,
    {
        let mut candidates = Vec::with_capacity(stages);
        for stage in 1..=stages {
            let epochs = stage * save_interval;
            let snapshot = self
                .teacher_trainer
                .train_teacher(initial_teacher, dataset, epochs)?;
            observer.on_snapshot(&SnapshotEvent { stage, epochs });
            candidates.push(Candidate {
                snapshot,
                score: CandidateScore {
                    index: stage - 1,
                    stage,
                    epochs,
                    loss: None,
                },
            });
        }
        Ok(candidates)
    }

    /// Distillation loss of a fresh student trained against `candidate`,
    /// or `None` if the candidate is disqualified.
    fn score_candidate<M>(
        &mut self,
        candidate: &Candidate<M>,
        initial_student: &M,
        subset: &[Sample],
        observer: &mut dyn SelectionObserver,
    ) -> Result<Option<f32>>
    where
        M: Classifier + Clone,
        P: StudentUpdatePolicy<M>,
    {
        let teacher = &candidate.snapshot;
        let stage = candidate.score.stage;

        let scored = self
            .distiller
            .train_student(initial_student.clone(), teacher, subset, stage, observer)
            .and_then(|outcome| {
                let teacher_probs = teacher.predict(subset, SCORING_TEMPERATURE)?;
                let student_probs = outcome.student.predict(subset, SCORING_TEMPERATURE)?;
                kl_divergence(&teacher_probs, &student_probs)
            });

        match scored {
            Ok(loss) => Ok(Some(loss)),
            Err(Error::NumericDegenerate(reason))
                if self.on_degenerate == DegeneratePolicy::Disqualify =>
            {
                log::warn!("Disqualifying teacher snapshot at stage {stage}: {reason}");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scores(losses: &[Option<f32>]) -> Vec<CandidateScore> {
        losses
            .iter()
            .enumerate()
            .map(|(i, &loss)| CandidateScore {
                index: i,
                stage: i + 1,
                epochs: (i + 1) * 5,
                loss,
            })
            .collect()
    }

    #[test]
    fn test_pick_best_lowest_loss() {
        let s = scores(&[Some(0.8), Some(0.3), Some(0.5)]);
        assert_eq!(pick_best(&s).unwrap(), 1);
    }

    #[test]
    fn test_pick_best_tie_goes_to_first() {
        let s = scores(&[Some(0.4), Some(0.4), Some(0.9)]);
        assert_eq!(pick_best(&s).unwrap(), 0);
    }

    #[test]
    fn test_pick_best_skips_disqualified_and_non_finite() {
        let s = scores(&[
            None,
            Some(f32::NAN),
            Some(f32::INFINITY),
            Some(0.7),
            Some(0.9),
        ]);
        assert_eq!(pick_best(&s).unwrap(), 3);
    }

    #[test]
    fn test_pick_best_nan_does_not_win_over_later_loss() {
        let s = scores(&[Some(f32::NAN), Some(2.0)]);
        assert_eq!(pick_best(&s).unwrap(), 1);
    }

    #[test]
    fn test_pick_best_empty_is_no_candidates() {
        let err = pick_best(&[]).unwrap_err();
        assert_eq!(
            err,
            Error::NoCandidates {
                collected: 0,
                disqualified: 0
            }
        );
    }

    #[test]
    fn test_pick_best_all_disqualified() {
        let err = pick_best(&scores(&[None, Some(f32::NAN)])).unwrap_err();
        assert_eq!(
            err,
            Error::NoCandidates {
                collected: 2,
                disqualified: 2
            }
        );
    }

    #[test]
    fn test_stage_count() {
        assert_eq!(stage_count(10, 5).unwrap(), 2);
        assert_eq!(stage_count(12, 5).unwrap(), 2);
        assert_eq!(stage_count(2, 5).unwrap(), 0);
        assert!(matches!(stage_count(10, 0), Err(Error::InvalidParameter(_))));
    }

    #[test]
    fn test_evaluation_subset_is_first_tenth() {
        use ndarray::array;
        let dataset: Vec<Sample> = (0..25)
            .map(|i| Sample::new(array![i as f32], i % 3))
            .collect();
        let subset = evaluation_subset(&dataset);
        assert_eq!(subset.len(), 2);
        assert_eq!(subset[1].features[0], 1.0);
        assert!(evaluation_subset(&dataset[..9]).is_empty());
    }

    #[test]
    fn test_degenerate_policy_serde_names() {
        let policy: DegeneratePolicy = serde_json::from_str("\"abort\"").unwrap();
        assert_eq!(policy, DegeneratePolicy::Abort);
        let name = serde_json::to_string(&DegeneratePolicy::Disqualify).unwrap();
        assert_eq!(name, "\"disqualify\"");
    }
}
