//! The `exam-engine stats` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use exam_engine_core::parser::load_exam_directory;
use exam_engine_core::record::load_records_dir;
use exam_engine_core::statistics::{build_catalog, search, totals, CatalogEntry, CatalogTotals};
use exam_engine_report::markdown::catalog_markdown;

pub fn execute(
    records_dir: PathBuf,
    exams_dir: PathBuf,
    term: Option<String>,
    format: String,
) -> Result<()> {
    let exams = load_exam_directory(&exams_dir)?;
    let records = if records_dir.is_dir() {
        load_records_dir(&records_dir)?
    } else {
        tracing::warn!("no records at {}, showing exams only", records_dir.display());
        Vec::new()
    };

    let catalog = build_catalog(&exams, &records);
    let entries = search(&catalog, term.as_deref().unwrap_or(""));
    let summary = totals(entries.iter().copied());

    match format.as_str() {
        "text" => print_table(&entries, &summary),
        "markdown" => print!("{}", catalog_markdown(&entries, &summary)),
        other => anyhow::bail!("unknown format: {other} (expected text or markdown)"),
    }

    Ok(())
}

fn print_table(entries: &[&CatalogEntry], summary: &CatalogTotals) {
    let mut table = Table::new();
    table.set_header(vec![
        "Exam",
        "Questions",
        "Attempts",
        "Avg Score",
        "Status",
        "Last Attempt",
    ]);

    for e in entries {
        table.add_row(vec![
            Cell::new(&e.title),
            Cell::new(e.question_count),
            Cell::new(e.attempts),
            Cell::new(format!("{}%", e.avg_score)),
            Cell::new(e.status.to_string()),
            Cell::new(
                e.last_attempt_at
                    .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                    .unwrap_or_else(|| "-".into()),
            ),
        ]);
    }

    println!("{table}");
    println!(
        "{} exams ({} active), {} attempts, {}% average score",
        summary.exams, summary.active, summary.attempts, summary.avg_score
    );
}
