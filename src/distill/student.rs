//! Student training against a fixed teacher

use super::loss::{DistillationLoss, LossBreakdown};
use super::model::{labels, Blend, Classifier, Sample};
use super::observer::{SelectionObserver, StudentEvent};
use crate::error::Result;

/// How a student is updated once its losses against a teacher are known.
///
/// Real training would run an optimizer here; the shipped [`BlendPolicy`]
/// is a scalar stand-in.
pub trait StudentUpdatePolicy<M> {
    fn update(&mut self, student: M, teacher: &M, losses: &LossBreakdown) -> Result<M>;
}

/// `student + teacher * (1 - total_loss)`
#[derive(Debug, Clone, Copy, Default)]
pub struct BlendPolicy;

impl<M: Blend> StudentUpdatePolicy<M> for BlendPolicy {
    fn update(&mut self, student: M, teacher: &M, losses: &LossBreakdown) -> Result<M> {
        student.blend(teacher, 1.0 - losses.total)
    }
}

/// Result of one student training call
#[derive(Debug, Clone)]
pub struct StudentOutcome<M> {
    pub student: M,
    /// Losses measured before the update
    pub losses: LossBreakdown,
}

/// Trains students from teacher soft targets plus ground truth labels.
#[derive(Debug, Clone)]
pub struct Distiller<P> {
    loss: DistillationLoss,
    policy: P,
}

impl Distiller<BlendPolicy> {
    /// Distiller using the scalar blend update.
    pub fn blend(temperature: f32, alpha: f32) -> Result<Self> {
        let loss = DistillationLoss::new(temperature, alpha)?;
        Ok(Self::new(loss, BlendPolicy))
    }
}

impl<P> Distiller<P> {
    pub fn new(loss: DistillationLoss, policy: P) -> Self {
        Self { loss, policy }
    }

    /// Train `student` against `teacher` on `samples`.
    ///
    /// Both models predict at the distillation temperature; the losses are
    /// reported to `observer` as stage `stage` before the update policy runs.
    pub fn train_student<M>(
        &mut self,
        student: M,
        teacher: &M,
        samples: &[Sample],
        stage: usize,
        observer: &mut dyn SelectionObserver,
    ) -> Result<StudentOutcome<M>>
    where
        M: Classifier,
        P: StudentUpdatePolicy<M>,
    {
        let temperature = self.loss.temperature;
        let teacher_probs = teacher.predict(samples, temperature)?;
        let student_probs = student.predict(samples, temperature)?;

        let truth = labels(samples);
        let losses = self.loss.evaluate(&teacher_probs, &student_probs, &truth)?;

        observer.on_student_trained(&StudentEvent {
            stage,
            distillation_loss: losses.distillation,
            hard_loss: losses.hard,
            total_loss: losses.total,
        });

        let student = self.policy.update(student, teacher, &losses)?;
        Ok(StudentOutcome { student, losses })
    }
}
