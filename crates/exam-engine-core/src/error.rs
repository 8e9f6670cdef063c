//! Exam session error types.
//!
//! These errors are surfaced synchronously by every session operation.
//! None of them are retried internally; the caller decides whether to
//! ignore, log, or abort.

use thiserror::Error;

use crate::session::SessionStatus;

/// Errors that can occur when building or driving an exam session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExamError {
    /// The exam definition is malformed. Fatal to session creation.
    #[error("invalid exam: {0}")]
    InvalidExam(String),

    /// A mutating operation was attempted after the session became terminal.
    #[error("session is closed ({status})")]
    SessionClosed { status: SessionStatus },

    /// An answer was recorded against an id that is not part of the exam.
    #[error("unknown question id: {0}")]
    UnknownQuestion(String),

    /// A navigation target outside `0..len`.
    #[error("question index {index} out of range (exam has {len} questions)")]
    IndexOutOfRange { index: usize, len: usize },
}

impl ExamError {
    /// Returns `true` if this error points at a bug in the caller (bad id or
    /// index, or a stale operation) rather than at the exam data itself.
    pub fn is_caller_bug(&self) -> bool {
        !matches!(self, ExamError::InvalidExam(_))
    }

    /// Returns `true` if the operation can be safely dropped by the caller.
    ///
    /// A `SessionClosed` error usually means a late UI event raced with
    /// submission or expiry; the graded result is already final.
    pub fn is_stale(&self) -> bool {
        matches!(self, ExamError::SessionClosed { .. })
    }
}
