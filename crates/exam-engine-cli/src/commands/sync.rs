//! The `exam-engine sync` commands.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use comfy_table::Table;

use exam_engine_core::parser::{parse_exam, to_toml};
use exam_engine_core::traits::ExamSync;
use exam_engine_providers::config::load_config_from;
use exam_engine_providers::create_sync;

fn connect(config_path: Option<&Path>) -> Result<Arc<dyn ExamSync>> {
    let config = load_config_from(config_path)?;
    tracing::debug!("sync config: {:?}", config.sync);
    let sync = create_sync(config.sync.as_ref())?;
    if let Some(store) = &config.sync {
        eprintln!("Connected to {}", store.location());
    }
    Ok(sync)
}

pub async fn push(exam_path: PathBuf, message: Option<String>, config: Option<PathBuf>) -> Result<()> {
    let sync = connect(config.as_deref())?;
    let exam = parse_exam(&exam_path)?;
    let message = message.unwrap_or_else(|| format!("Update {}", exam.title));

    let revision = sync.push(&exam, &message).await?;
    println!("Pushed {} as {} ({})", exam.title, revision.short_id(), revision.path);
    Ok(())
}

pub async fn pull(title: String, output: PathBuf, config: Option<PathBuf>) -> Result<()> {
    let sync = connect(config.as_deref())?;
    let exam = sync.pull(&title).await?;

    if let Some(parent) = output.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&output, to_toml(&exam)?)
        .with_context(|| format!("failed to write {}", output.display()))?;
    println!(
        "Pulled {} ({} questions) into {}",
        exam.title,
        exam.questions.len(),
        output.display()
    );
    Ok(())
}

pub async fn history(config: Option<PathBuf>) -> Result<()> {
    let sync = connect(config.as_deref())?;
    let revisions = sync.history().await?;

    if revisions.is_empty() {
        println!("No revisions yet.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["Revision", "When", "Path", "Message"]);
    for rev in &revisions {
        table.add_row(vec![
            rev.short_id(),
            rev.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            rev.path.clone(),
            rev.message.clone(),
        ]);
    }
    println!("{table}");
    Ok(())
}
