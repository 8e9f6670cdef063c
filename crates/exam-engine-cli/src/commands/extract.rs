//! The `exam-engine extract` command.

use std::path::PathBuf;

use anyhow::{Context, Result};

use exam_engine_core::model::Exam;
use exam_engine_core::parser::{lint_exam, to_toml};
use exam_engine_core::traits::PdfExtractor;
use exam_engine_providers::MockPdfExtractor;

pub async fn execute(
    pdf: PathBuf,
    title: String,
    description: String,
    time_limit_mins: u64,
    output: PathBuf,
) -> Result<()> {
    anyhow::ensure!(time_limit_mins >= 1, "time limit must be at least 1 minute");
    let time_limit_secs = time_limit_mins
        .checked_mul(60)
        .with_context(|| format!("time limit of {time_limit_mins} minutes is too large"))?;

    let document =
        std::fs::read(&pdf).with_context(|| format!("failed to read {}", pdf.display()))?;

    let extractor = MockPdfExtractor::default();
    let questions = extractor
        .extract(&document)
        .await
        .with_context(|| format!("failed to extract questions from {}", pdf.display()))?;

    let exam = Exam {
        title,
        description,
        time_limit_secs,
        questions,
    };
    exam.validate()?;

    if let Some(parent) = output.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&output, to_toml(&exam)?)
        .with_context(|| format!("failed to write {}", output.display()))?;

    println!(
        "Extracted {} questions into {}",
        exam.questions.len(),
        output.display()
    );
    for w in lint_exam(&exam) {
        let id = w.question_id.as_deref().unwrap_or("-");
        println!("  [{id}] WARNING: {}", w.message);
    }

    Ok(())
}
