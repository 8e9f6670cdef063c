//! exam-engine-core — Exam session state machine, grading, and data model.
//!
//! This crate defines the exam data model, the session state machine that
//! tracks one attempt from start to a graded result, and the capability
//! traits through which the rest of the system supplies exams and stores
//! results.

pub mod error;
pub mod grading;
pub mod model;
pub mod parser;
pub mod record;
pub mod session;
pub mod statistics;
pub mod timer;
pub mod traits;

pub use error::ExamError;
pub use grading::Score;
pub use model::{Exam, Question, QuestionKind};
pub use record::ExamRecord;
pub use session::{ExamSession, SessionEvent, SessionSnapshot, SessionStatus};
