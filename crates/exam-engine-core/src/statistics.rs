//! Catalog statistics for the admin dashboard.
//!
//! Joins exam definitions with archived attempt records to produce one
//! catalog entry per exam, plus totals across the catalog.

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::Exam;
use crate::record::{slugify, ExamRecord};

/// Publication state of an exam in the catalog: `draft` until first attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CatalogStatus {
    Active,
    Draft,
}

impl fmt::Display for CatalogStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogStatus::Active => write!(f, "active"),
            CatalogStatus::Draft => write!(f, "draft"),
        }
    }
}

/// One row of the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Slug of the exam title.
    pub id: String,
    pub title: String,
    pub description: String,
    pub question_count: usize,
    /// Number of archived attempts.
    pub attempts: usize,
    /// Mean percentage across attempts, rounded. 0 with no attempts.
    pub avg_score: u32,
    pub status: CatalogStatus,
    /// Time of the most recent attempt, if any.
    pub last_attempt_at: Option<DateTime<Utc>>,
}

/// Totals across the whole catalog.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogTotals {
    pub exams: usize,
    pub active: usize,
    pub attempts: usize,
    /// Mean of `avg_score` over entries with at least one attempt.
    pub avg_score: u32,
}

/// Build one catalog entry per exam.
///
/// Records are matched to exams by title. Records whose exam is not in
/// `exams` are ignored. Entries are sorted by title.
pub fn build_catalog(exams: &[Exam], records: &[ExamRecord]) -> Vec<CatalogEntry> {
    let mut by_title: HashMap<&str, Vec<&ExamRecord>> = HashMap::new();
    for r in records {
        by_title.entry(r.title.as_str()).or_default().push(r);
    }

    let mut entries: Vec<CatalogEntry> = exams
        .iter()
        .map(|exam| {
            let attempts = by_title.get(exam.title.as_str()).map(Vec::as_slice).unwrap_or(&[]);
            let total: u64 = attempts.iter().map(|r| u64::from(r.score.percentage)).sum();
            let avg_score = mean(total, attempts.len());
            CatalogEntry {
                id: slugify(&exam.title),
                title: exam.title.clone(),
                description: exam.description.clone(),
                question_count: exam.questions.len(),
                attempts: attempts.len(),
                avg_score,
                status: if attempts.is_empty() {
                    CatalogStatus::Draft
                } else {
                    CatalogStatus::Active
                },
                last_attempt_at: attempts.iter().map(|r| r.completed_at).max(),
            }
        })
        .collect();

    entries.sort_by(|a, b| a.title.cmp(&b.title));
    entries
}

/// Case-insensitive substring search over title and description.
pub fn search<'a>(entries: &'a [CatalogEntry], term: &str) -> Vec<&'a CatalogEntry> {
    let needle = term.trim().to_lowercase();
    entries
        .iter()
        .filter(|e| {
            needle.is_empty()
                || e.title.to_lowercase().contains(&needle)
                || e.description.to_lowercase().contains(&needle)
        })
        .collect()
}

/// Compute catalog-wide totals.
pub fn totals<'a>(entries: impl IntoIterator<Item = &'a CatalogEntry>) -> CatalogTotals {
    let mut totals = CatalogTotals::default();
    let mut score_sum = 0u64;
    let mut scored = 0usize;

    for e in entries {
        totals.exams += 1;
        totals.attempts += e.attempts;
        if e.status == CatalogStatus::Active {
            totals.active += 1;
        }
        if e.attempts > 0 {
            score_sum += u64::from(e.avg_score);
            scored += 1;
        }
    }

    totals.avg_score = mean(score_sum, scored);
    totals
}

fn mean(sum: u64, count: usize) -> u32 {
    if count == 0 {
        return 0;
    }
    (sum as f64 / count as f64).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grading::Score;
    use crate::model::Question;
    use crate::session::SessionStatus;
    use chrono::TimeZone;
    use std::collections::BTreeMap;
    use uuid::Uuid;

    fn exam(title: &str, description: &str) -> Exam {
        Exam {
            title: title.into(),
            description: description.into(),
            time_limit_secs: 600,
            questions: vec![Question::true_false("1", "Is it?", Some(true))],
        }
    }

    fn record(title: &str, percentage: u32, day: u32) -> ExamRecord {
        ExamRecord {
            id: Uuid::new_v4(),
            title: title.into(),
            description: String::new(),
            status: SessionStatus::Submitted,
            answers: BTreeMap::new(),
            score: Score {
                correct_count: 0,
                total_graded: 1,
                percentage,
                answered_count: 0,
            },
            question_count: 1,
            time_limit_secs: 600,
            time_used_secs: 60,
            completed_at: Utc.with_ymd_and_hms(2024, 1, day, 12, 0, 0).unwrap(),
        }
    }

    fn catalog() -> Vec<CatalogEntry> {
        let exams = vec![
            exam("JavaScript Fundamentals", "Basic JavaScript concepts and syntax"),
            exam("React Components", "Understanding React component lifecycle"),
            exam("Database Design", "SQL and database normalization"),
        ];
        let records = vec![
            record("JavaScript Fundamentals", 80, 15),
            record("JavaScript Fundamentals", 75, 16),
            record("React Components", 82, 10),
            record("Unknown Exam", 10, 1),
        ];
        build_catalog(&exams, &records)
    }

    #[test]
    fn entries_per_exam() {
        let entries = catalog();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].title, "Database Design");

        let js = entries.iter().find(|e| e.id == "javascript-fundamentals").unwrap();
        assert_eq!(js.attempts, 2);
        assert_eq!(js.avg_score, 78);
        assert_eq!(js.status, CatalogStatus::Active);
        assert_eq!(
            js.last_attempt_at,
            Some(Utc.with_ymd_and_hms(2024, 1, 16, 12, 0, 0).unwrap())
        );

        let db = &entries[0];
        assert_eq!(db.attempts, 0);
        assert_eq!(db.avg_score, 0);
        assert_eq!(db.status, CatalogStatus::Draft);
        assert!(db.last_attempt_at.is_none());
    }

    #[test]
    fn search_title_and_description() {
        let entries = catalog();
        assert_eq!(search(&entries, "react").len(), 1);
        assert_eq!(search(&entries, "SQL")[0].title, "Database Design");
        assert_eq!(search(&entries, "  ").len(), 3);
        assert!(search(&entries, "rust").is_empty());
    }

    #[test]
    fn catalog_totals() {
        let entries = catalog();
        let t = totals(&entries);
        assert_eq!(t.exams, 3);
        assert_eq!(t.active, 2);
        assert_eq!(t.attempts, 3);
        assert_eq!(t.avg_score, 80);
    }

    #[test]
    fn totals_of_empty_catalog() {
        assert_eq!(totals(&Vec::new()), CatalogTotals::default());
    }

    #[test]
    fn status_display() {
        assert_eq!(CatalogStatus::Draft.to_string(), "draft");
    }
}
