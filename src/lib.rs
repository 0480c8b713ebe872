//! # distill-select: Knowledge Distillation Teacher Selection
//!
//! Trains a student model against several snapshots of a teacher model and
//! picks the snapshot that yields the lowest distillation loss.
//!
//! ## Architecture
//!
//! - **distill**: probability tables, KL/cross-entropy losses, student
//!   training, teacher selection and progress observers
//! - **synthetic**: seeded stand-ins for datasets, models and teacher training
//!
//! ## Example
//!
//! ```
//! use distill_select::distill::{Distiller, TeacherSelector};
//! use distill_select::synthetic::{self, LinearSoftmax, SyntheticTeacherTrainer};
//!
//! let dataset = synthetic::make_dataset(100, 8, 4, 42);
//! let teacher = LinearSoftmax::random(8, 4, 1);
//! let student = LinearSoftmax::random(8, 4, 2);
//!
//! let mut selector = TeacherSelector::new(
//!     SyntheticTeacherTrainer::new(7, 0.05),
//!     Distiller::blend(3.0, 0.7).unwrap(),
//! );
//! let selection = selector
//!     .select_best_teacher(&dataset, &teacher, &student, 10, 5)
//!     .unwrap();
//! assert!(selection.index < 2);
//! ```

pub mod distill;
pub mod error;
pub mod synthetic;

pub use error::{Error, Result};
