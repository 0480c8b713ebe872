//! Knowledge Distillation
//!
//! Scores teacher snapshots by how well a student distills from them.
//!
//! ## Features
//!
//! - **Probability tables**: validated examples × classes distributions
//! - **KL divergence and cross-entropy**: soft and hard targets combined by α
//! - **Student training**: pluggable update policy behind the losses
//! - **Teacher selection**: staged snapshots, fixed evaluation subset, argmin
//!
//! ## Example
//!
//! ```
//! use distill_select::distill::{kl_divergence, ProbabilityTable};
//! use ndarray::array;
//!
//! let teacher = ProbabilityTable::new(array![[0.7, 0.2, 0.1]]).unwrap();
//! let student = ProbabilityTable::new(array![[0.4, 0.4, 0.2]]).unwrap();
//! assert!(kl_divergence(&teacher, &student).unwrap() > 0.0);
//! ```

mod loss;
mod model;
mod observer;
mod prob;
mod selector;
mod student;

pub use loss::{cross_entropy, kl_divergence, DistillationLoss, LossBreakdown};
pub use model::{labels, Blend, Classifier, Sample, TeacherTrainer};
pub use observer::{
    LogObserver, ObserverSet, RecordingObserver, SelectionObserver, SnapshotEvent, StudentEvent,
};
pub use prob::{softmax_2d, ProbabilityTable, ROW_SUM_TOLERANCE};
pub use selector::{
    evaluation_subset, pick_best, stage_count, Candidate, CandidateScore, DegeneratePolicy,
    Selection, TeacherSelector, EVAL_SUBSET_DIVISOR, SCORING_TEMPERATURE,
};
pub use student::{BlendPolicy, Distiller, StudentOutcome, StudentUpdatePolicy};
