//! Capability traits for the collaborators around an exam session.
//!
//! The session never talks to storage or document parsing directly. Question
//! banks, PDF extraction, and version-control sync are reached through these
//! async traits, implemented by the `exam-engine-providers` crate.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::{Exam, Question};
use crate::record::ExamRecord;

// ---------------------------------------------------------------------------
// Question bank
// ---------------------------------------------------------------------------

/// Source of ready-to-take exams.
#[async_trait]
pub trait QuestionBank: Send + Sync {
    /// Human-readable bank name (e.g. "mock").
    fn name(&self) -> &str;

    /// Load the exam with the given id.
    async fn load_exam(&self, id: &str) -> anyhow::Result<Exam>;

    /// Ids of the exams this bank can serve.
    fn list(&self) -> Vec<String>;
}

// ---------------------------------------------------------------------------
// PDF extraction
// ---------------------------------------------------------------------------

/// Turns an uploaded document into question records.
#[async_trait]
pub trait PdfExtractor: Send + Sync {
    /// Extract questions from the raw bytes of a PDF document.
    async fn extract(&self, document: &[u8]) -> anyhow::Result<Vec<Question>>;
}

/// Returns `true` if `bytes` start with the PDF magic header.
pub fn is_pdf(bytes: &[u8]) -> bool {
    bytes.starts_with(b"%PDF-")
}

// ---------------------------------------------------------------------------
// Version-control sync
// ---------------------------------------------------------------------------

/// Storage backend that versions exam definitions and archived attempts.
#[async_trait]
pub trait ExamSync: Send + Sync {
    /// Store an exam definition, creating a new revision.
    async fn push(&self, exam: &Exam, message: &str) -> anyhow::Result<Revision>;

    /// Fetch the latest definition of the exam with the given title.
    async fn pull(&self, title: &str) -> anyhow::Result<Exam>;

    /// Archive the record of a finished attempt.
    async fn archive(&self, record: &ExamRecord) -> anyhow::Result<Revision>;

    /// All revisions, oldest first.
    async fn history(&self) -> anyhow::Result<Vec<Revision>>;
}

/// One change stored by an [`ExamSync`] backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Revision {
    /// Unique revision identifier.
    pub id: Uuid,
    /// Commit message.
    pub message: String,
    /// Path of the stored file, relative to the store root.
    pub path: String,
    /// When the revision was created.
    pub created_at: DateTime<Utc>,
}

impl Revision {
    pub fn new(message: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            message: message.into(),
            path: path.into(),
            created_at: Utc::now(),
        }
    }

    /// First eight hex digits of the id, for display.
    pub fn short_id(&self) -> String {
        self.id.simple().to_string()[..8].to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pdf_magic() {
        assert!(is_pdf(b"%PDF-1.7\n%\xe2\xe3\xcf\xd3"));
        assert!(!is_pdf(b"PK\x03\x04"));
        assert!(!is_pdf(b""));
        assert!(!is_pdf(b"%PD"));
    }

    #[test]
    fn revision_short_id() {
        let rev = Revision::new("Add exam", "exams/a.toml");
        assert_eq!(rev.short_id().len(), 8);
        assert!(rev.id.simple().to_string().starts_with(&rev.short_id()));
    }
}
