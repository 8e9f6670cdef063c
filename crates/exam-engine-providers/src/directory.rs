//! Directory-backed sync store.
//!
//! Layout under the root:
//!
//! ```text
//! exams/<slug>.toml      latest definition of each exam
//! records/<file>.json    archived attempts
//! history.json           append-only revision log
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::sync::Mutex;

use exam_engine_core::model::Exam;
use exam_engine_core::parser::{parse_exam_str, to_toml};
use exam_engine_core::record::{slugify, ExamRecord};
use exam_engine_core::traits::{ExamSync, Revision};

use crate::error::ProviderError;

const HISTORY_FILE: &str = "history.json";

/// Sync backend that writes exams and records into a local directory.
pub struct DirectorySync {
    root: PathBuf,
    branch: String,
    /// Serializes read-modify-write of the history log.
    history_lock: Mutex<()>,
}

impl DirectorySync {
    pub fn new(root: impl Into<PathBuf>, branch: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            branch: branch.into(),
            history_lock: Mutex::new(()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn branch(&self) -> &str {
        &self.branch
    }

    async fn write_file(&self, relative: &str, content: &str) -> Result<()> {
        let path = self.root.join(relative);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        tokio::fs::write(&path, content)
            .await
            .with_context(|| format!("failed to write {}", path.display()))
    }

    async fn read_history(&self) -> Result<Vec<Revision>> {
        let path = self.root.join(HISTORY_FILE);
        match tokio::fs::read_to_string(&path).await {
            Ok(content) => serde_json::from_str(&content)
                .with_context(|| format!("failed to parse {}", path.display())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(ProviderError::Storage(format!("{}: {e}", path.display())).into()),
        }
    }

    /// Read the exam stored under `slug`, if any.
    async fn read_exam(&self, slug: &str) -> Result<Option<Exam>> {
        let path = self.root.join("exams").join(format!("{slug}.toml"));
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(ProviderError::Storage(format!("{}: {e}", path.display())).into());
            }
        };
        tracing::debug!("read {}", path.display());
        parse_exam_str(&content, &path).map(Some)
    }

    /// Write `content` and append `revision` to the history log.
    ///
    /// The caller must hold `history_lock`.
    async fn commit_locked(
        &self,
        revision: Revision,
        relative: &str,
        content: &str,
    ) -> Result<Revision> {
        self.write_file(relative, content).await?;

        let mut history = self.read_history().await?;
        history.push(revision.clone());
        let json = serde_json::to_string_pretty(&history).context("failed to serialize history")?;
        self.write_file(HISTORY_FILE, &json).await?;

        tracing::info!(
            "[{}] {} {}: {}",
            self.branch,
            revision.short_id(),
            revision.path,
            revision.message
        );
        Ok(revision)
    }
}

#[async_trait]
impl ExamSync for DirectorySync {
    async fn push(&self, exam: &Exam, message: &str) -> Result<Revision> {
        exam.validate()?;
        let slug = slugify(&exam.title);
        let relative = format!("exams/{slug}.toml");
        let content = to_toml(exam)?;

        let _guard = self.history_lock.lock().await;
        if let Some(stored) = self.read_exam(&slug).await? {
            if stored.title != exam.title {
                return Err(ProviderError::Conflict(format!(
                    "'{}' is already stored as {relative}",
                    stored.title
                ))
                .into());
            }
        }
        self.commit_locked(Revision::new(message, relative.as_str()), &relative, &content)
            .await
    }

    async fn pull(&self, title: &str) -> Result<Exam> {
        match self.read_exam(&slugify(title)).await? {
            Some(exam) if exam.title == title => Ok(exam),
            _ => Err(ProviderError::NotFound(format!("exam '{title}'")).into()),
        }
    }

    async fn archive(&self, record: &ExamRecord) -> Result<Revision> {
        let relative = format!("records/{}", record.file_name());
        let content = serde_json::to_string_pretty(record).context("failed to serialize record")?;
        let message = format!(
            "Archive attempt at {} ({}%)",
            record.title, record.score.percentage
        );

        let _guard = self.history_lock.lock().await;
        self.commit_locked(Revision::new(message, relative.as_str()), &relative, &content)
            .await
    }

    async fn history(&self) -> Result<Vec<Revision>> {
        self.read_history().await
    }
}
