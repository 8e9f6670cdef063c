//! Markdown dashboard summary.

use exam_engine_core::statistics::{CatalogEntry, CatalogTotals};

/// Format catalog entries and totals as a Markdown table.
pub fn catalog_markdown(entries: &[&CatalogEntry], totals: &CatalogTotals) -> String {
    let mut md = String::new();

    md.push_str(&format!(
        "**Summary:** {} exams ({} active), {} attempts, {}% average score\n\n",
        totals.exams, totals.active, totals.attempts, totals.avg_score
    ));

    if entries.is_empty() {
        md.push_str("_No exams found._\n");
        return md;
    }

    md.push_str("| Exam | Questions | Attempts | Avg Score | Status | Last Attempt |\n");
    md.push_str("|------|-----------|----------|-----------|--------|--------------|\n");
    for e in entries {
        let last = e
            .last_attempt_at
            .map(|t| t.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "-".into());
        md.push_str(&format!(
            "| {} | {} | {} | {}% | {} | {} |\n",
            e.title.replace('|', "\\|"),
            e.question_count,
            e.attempts,
            e.avg_score,
            e.status,
            last
        ));
    }

    md
}

#[cfg(test)]
mod tests {
    use super::*;
    use exam_engine_core::statistics::CatalogStatus;

    fn entry(title: &str, attempts: usize, avg_score: u32) -> CatalogEntry {
        CatalogEntry {
            id: title.to_lowercase(),
            title: title.into(),
            description: String::new(),
            question_count: 25,
            attempts,
            avg_score,
            status: if attempts > 0 {
                CatalogStatus::Active
            } else {
                CatalogStatus::Draft
            },
            last_attempt_at: None,
        }
    }

    #[test]
    fn markdown_table() {
        let a = entry("JavaScript Fundamentals", 142, 78);
        let b = entry("Database | Design", 0, 0);
        let totals = CatalogTotals {
            exams: 2,
            active: 1,
            attempts: 142,
            avg_score: 78,
        };

        let md = catalog_markdown(&[&a, &b], &totals);
        assert!(md.contains("**Summary:** 2 exams (1 active), 142 attempts, 78% average score"));
        assert!(md.contains("| JavaScript Fundamentals | 25 | 142 | 78% | active | - |"));
        assert!(md.contains("Database \\| Design"));
        assert!(md.contains("| draft |"));
    }

    #[test]
    fn markdown_empty() {
        let md = catalog_markdown(&[], &CatalogTotals::default());
        assert!(md.contains("No exams found"));
    }
}
