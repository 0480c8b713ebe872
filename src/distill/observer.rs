//! Progress events for teacher selection
//!
//! Selection and student training report what they do through the
//! [`SelectionObserver`] trait. All methods have no-op defaults, so an
//! observer only implements the events it cares about.

use serde::{Deserialize, Serialize};

use super::selector::CandidateScore;

/// A teacher snapshot was captured
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SnapshotEvent {
    /// Stage number, starting at 1
    pub stage: usize,
    /// Teacher training epochs the snapshot represents
    pub epochs: usize,
}

/// A student was trained against a teacher snapshot
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StudentEvent {
    /// Stage of the teacher snapshot used
    pub stage: usize,
    pub distillation_loss: f32,
    pub hard_loss: f32,
    pub total_loss: f32,
}

/// Trait for selection observers
pub trait SelectionObserver {
    /// Called after each teacher snapshot is collected
    fn on_snapshot(&mut self, _event: &SnapshotEvent) {}

    /// Called after each student training step
    fn on_student_trained(&mut self, _event: &StudentEvent) {}

    /// Called after a candidate has been scored or disqualified
    fn on_candidate_scored(&mut self, _score: &CandidateScore) {}

    /// Called once with the winning candidate
    fn on_selected(&mut self, _best: &CandidateScore) {}
}

/// Reports progress through the `log` facade
#[derive(Debug, Clone, Copy, Default)]
pub struct LogObserver;

impl SelectionObserver for LogObserver {
    fn on_snapshot(&mut self, event: &SnapshotEvent) {
        log::info!(
            "Saved teacher snapshot at stage {} ({} epochs)",
            event.stage,
            event.epochs
        );
    }

    fn on_student_trained(&mut self, event: &StudentEvent) {
        log::info!(
            "Stage {}: distillation loss {:.6}, hard loss {:.6}, total loss {:.6}",
            event.stage,
            event.distillation_loss,
            event.hard_loss,
            event.total_loss
        );
    }

    fn on_candidate_scored(&mut self, score: &CandidateScore) {
        match score.loss {
            Some(loss) => log::info!(
                "Distillation loss for teacher snapshot {} (stage {}): {:.6}",
                score.index,
                score.stage,
                loss
            ),
            None => log::info!(
                "Teacher snapshot {} (stage {}) disqualified",
                score.index,
                score.stage
            ),
        }
    }

    fn on_selected(&mut self, best: &CandidateScore) {
        if let Some(loss) = best.loss {
            log::info!(
                "Best teacher snapshot {} (stage {}, {} epochs) with loss {:.6}",
                best.index,
                best.stage,
                best.epochs,
                loss
            );
        }
    }
}

/// Records every event, mostly useful in tests and reports
#[derive(Debug, Clone, Default)]
pub struct RecordingObserver {
    pub snapshots: Vec<SnapshotEvent>,
    pub students: Vec<StudentEvent>,
    pub scores: Vec<CandidateScore>,
    pub selected: Option<CandidateScore>,
}

impl SelectionObserver for RecordingObserver {
    fn on_snapshot(&mut self, event: &SnapshotEvent) {
        self.snapshots.push(*event);
    }

    fn on_student_trained(&mut self, event: &StudentEvent) {
        self.students.push(*event);
    }

    fn on_candidate_scored(&mut self, score: &CandidateScore) {
        self.scores.push(*score);
    }

    fn on_selected(&mut self, best: &CandidateScore) {
        self.selected = Some(*best);
    }
}

/// Fans events out to several observers
#[derive(Default)]
pub struct ObserverSet<'a> {
    observers: Vec<&'a mut dyn SelectionObserver>,
}

impl<'a> ObserverSet<'a> {
    pub fn new() -> Self {
        Self {
            observers: Vec::new(),
        }
    }

    /// Add an observer
    pub fn add(&mut self, observer: &'a mut dyn SelectionObserver) {
        self.observers.push(observer);
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }
}

impl SelectionObserver for ObserverSet<'_> {
    fn on_snapshot(&mut self, event: &SnapshotEvent) {
        for obs in &mut self.observers {
            obs.on_snapshot(event);
        }
    }

    fn on_student_trained(&mut self, event: &StudentEvent) {
        for obs in &mut self.observers {
            obs.on_student_trained(event);
        }
    }

    fn on_candidate_scored(&mut self, score: &CandidateScore) {
        for obs in &mut self.observers {
            obs.on_candidate_scored(score);
        }
    }

    fn on_selected(&mut self, best: &CandidateScore) {
        for obs in &mut self.observers {
            obs.on_selected(best);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_observer_impl_is_noop() {
        struct Minimal;
        impl SelectionObserver for Minimal {}

        let mut obs = Minimal;
        obs.on_snapshot(&SnapshotEvent {
            stage: 1,
            epochs: 5,
        });
        obs.on_student_trained(&StudentEvent {
            stage: 1,
            distillation_loss: 0.1,
            hard_loss: 2.3,
            total_loss: 0.76,
        });
    }

    #[test]
    fn test_observer_set_fans_out() {
        let mut first = RecordingObserver::default();
        let mut second = RecordingObserver::default();
        {
            let mut set = ObserverSet::new();
            assert!(set.is_empty());
            set.add(&mut first);
            set.add(&mut second);
            assert_eq!(set.len(), 2);

            set.on_snapshot(&SnapshotEvent {
                stage: 2,
                epochs: 10,
            });
            set.on_candidate_scored(&CandidateScore {
                index: 1,
                stage: 2,
                epochs: 10,
                loss: Some(0.3),
            });
        }

        let expected = SnapshotEvent {
            stage: 2,
            epochs: 10,
        };
        for obs in [&first, &second] {
            assert_eq!(obs.snapshots, vec![expected]);
            assert_eq!(obs.scores.len(), 1);
            assert_eq!(obs.scores[0].loss, Some(0.3));
        }
    }

    #[test]
    fn test_log_observer_handles_disqualified_candidate() {
        let _ = env_logger::builder().is_test(true).try_init();
        let mut obs = LogObserver;
        let score = CandidateScore {
            index: 0,
            stage: 1,
            epochs: 5,
            loss: None,
        };
        obs.on_candidate_scored(&score);
        obs.on_selected(&score);
    }
}
