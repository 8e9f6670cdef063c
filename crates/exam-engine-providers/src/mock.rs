//! In-memory providers for demos and tests.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use exam_engine_core::model::{Exam, Question};
use exam_engine_core::record::{slugify, ExamRecord};
use exam_engine_core::traits::{is_pdf, ExamSync, PdfExtractor, QuestionBank, Revision};

use crate::error::ProviderError;

// ---------------------------------------------------------------------------
// Question bank
// ---------------------------------------------------------------------------

/// A question bank serving a fixed set of exams, keyed by id.
pub struct MockQuestionBank {
    exams: BTreeMap<String, Exam>,
    call_count: AtomicU32,
}

impl MockQuestionBank {
    pub fn new(exams: impl IntoIterator<Item = (String, Exam)>) -> Self {
        Self {
            exams: exams.into_iter().collect(),
            call_count: AtomicU32::new(0),
        }
    }

    /// A bank holding a single exam under the slug of its title.
    pub fn with_exam(exam: Exam) -> Self {
        Self::new([(slugify(&exam.title), exam)])
    }

    /// Number of `load_exam` calls made.
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl QuestionBank for MockQuestionBank {
    fn name(&self) -> &str {
        "mock"
    }

    async fn load_exam(&self, id: &str) -> anyhow::Result<Exam> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        self.exams
            .get(id)
            .cloned()
            .ok_or_else(|| ProviderError::NotFound(format!("exam '{id}'")).into())
    }

    fn list(&self) -> Vec<String> {
        self.exams.keys().cloned().collect()
    }
}

// ---------------------------------------------------------------------------
// PDF extraction
// ---------------------------------------------------------------------------

/// An extractor that accepts any PDF and returns a canned question list.
pub struct MockPdfExtractor {
    questions: Vec<Question>,
    call_count: AtomicU32,
}

impl MockPdfExtractor {
    pub fn new(questions: Vec<Question>) -> Self {
        Self {
            questions,
            call_count: AtomicU32::new(0),
        }
    }

    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }
}

impl Default for MockPdfExtractor {
    /// Three sample questions, one of each kind.
    fn default() -> Self {
        Self::new(vec![
            Question::multiple_choice(
                "1",
                "What is the capital of France?",
                &["London", "Berlin", "Paris", "Madrid"],
                Some("Paris"),
            ),
            Question::free_text("2", "Explain the concept of object-oriented programming."),
            Question::true_false("3", "JavaScript is a compiled language.", Some(false)),
        ])
    }
}

#[async_trait]
impl PdfExtractor for MockPdfExtractor {
    async fn extract(&self, document: &[u8]) -> anyhow::Result<Vec<Question>> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        if !is_pdf(document) {
            return Err(ProviderError::InvalidDocument("missing %PDF- header".into()).into());
        }
        tracing::debug!(
            "extracted {} questions from {} byte document",
            self.questions.len(),
            document.len()
        );
        Ok(self.questions.clone())
    }
}

// ---------------------------------------------------------------------------
// Sync
// ---------------------------------------------------------------------------

#[derive(Default)]
struct MemoryStore {
    exams: BTreeMap<String, Exam>,
    records: Vec<ExamRecord>,
    history: Vec<Revision>,
}

/// A sync backend that keeps everything in process memory.
#[derive(Default)]
pub struct MemorySync {
    store: Mutex<MemoryStore>,
}

impl MemorySync {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records archived so far, oldest first.
    pub fn records(&self) -> anyhow::Result<Vec<ExamRecord>> {
        Ok(self.lock()?.records.clone())
    }

    fn lock(&self) -> anyhow::Result<std::sync::MutexGuard<'_, MemoryStore>> {
        self.store
            .lock()
            .map_err(|_| ProviderError::Storage("memory store poisoned".into()).into())
    }
}

#[async_trait]
impl ExamSync for MemorySync {
    async fn push(&self, exam: &Exam, message: &str) -> anyhow::Result<Revision> {
        exam.validate()?;
        let slug = slugify(&exam.title);
        let revision = Revision::new(message, format!("exams/{slug}.toml"));

        let mut store = self.lock()?;
        if let Some(stored) = store.exams.get(&slug) {
            if stored.title != exam.title {
                return Err(ProviderError::Conflict(format!(
                    "'{}' is already stored as exams/{slug}.toml",
                    stored.title
                ))
                .into());
            }
        }
        store.exams.insert(slug, exam.clone());
        store.history.push(revision.clone());
        Ok(revision)
    }

    async fn pull(&self, title: &str) -> anyhow::Result<Exam> {
        self.lock()?
            .exams
            .get(&slugify(title))
            .filter(|exam| exam.title == title)
            .cloned()
            .ok_or_else(|| ProviderError::NotFound(format!("exam '{title}'")).into())
    }

    async fn archive(&self, record: &ExamRecord) -> anyhow::Result<Revision> {
        let revision = Revision::new(
            format!("Archive attempt at {}", record.title),
            format!("records/{}", record.file_name()),
        );

        let mut store = self.lock()?;
        store.records.push(record.clone());
        store.history.push(revision.clone());
        Ok(revision)
    }

    async fn history(&self) -> anyhow::Result<Vec<Revision>> {
        Ok(self.lock()?.history.clone())
    }
}
