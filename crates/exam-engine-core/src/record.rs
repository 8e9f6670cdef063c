//! Archival record of a finished exam attempt, with JSON persistence.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::grading::Score;
use crate::session::SessionStatus;

/// Immutable summary of a terminal session, suitable for archival.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExamRecord {
    /// Unique record identifier.
    pub id: Uuid,
    /// Title of the exam attempted.
    pub title: String,
    /// Description of the exam attempted.
    #[serde(default)]
    pub description: String,
    /// How the attempt ended: submitted or expired.
    pub status: SessionStatus,
    /// Final answers keyed by question id.
    pub answers: BTreeMap<String, String>,
    /// The graded result.
    pub score: Score,
    /// Number of questions in the exam.
    pub question_count: usize,
    /// Time allotted, in seconds.
    pub time_limit_secs: u64,
    /// Time consumed before the attempt ended, in seconds.
    pub time_used_secs: u64,
    /// When the attempt ended.
    pub completed_at: DateTime<Utc>,
}

impl ExamRecord {
    /// Default file name: `<slug>-<timestamp>-<short id>.json`.
    ///
    /// The id suffix keeps attempts that end in the same second apart.
    pub fn file_name(&self) -> String {
        let id = self.id.simple().to_string();
        format!(
            "{}-{}-{}.json",
            slugify(&self.title),
            self.completed_at.format("%Y-%m-%dT%H%M%S"),
            &id[..8]
        )
    }

    /// Save the record as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize record")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write record to {}", path.display()))?;
        Ok(())
    }

    /// Load a record from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read record from {}", path.display()))?;
        let record: ExamRecord = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse record JSON: {}", path.display()))?;
        Ok(record)
    }
}

/// Load every `.json` record in a directory (non-recursive).
///
/// Files that fail to parse are skipped with a warning.
pub fn load_records_dir(dir: &Path) -> Result<Vec<ExamRecord>> {
    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    let mut records = Vec::new();
    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
    {
        let path = entry?.path();
        if path.extension().is_some_and(|ext| ext == "json") {
            match ExamRecord::load_json(&path) {
                Ok(record) => records.push(record),
                Err(e) => tracing::warn!("skipping {}: {e:#}", path.display()),
            }
        }
    }

    records.sort_by_key(|r| r.completed_at);
    Ok(records)
}

/// File-name form of a title: lowercase ASCII alphanumerics joined by `-`.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    if slug.is_empty() {
        slug.push_str("exam");
    }
    slug
}
