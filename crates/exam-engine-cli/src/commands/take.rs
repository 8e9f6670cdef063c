//! The `exam-engine take` command.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use exam_engine_core::parser;
use exam_engine_core::record::ExamRecord;
use exam_engine_core::session::{ExamSession, SessionEvent, SessionStatus};
use exam_engine_core::timer::{format_time, shared, Countdown};
use exam_engine_providers::config::load_config_from;
use exam_engine_providers::create_sync;
use exam_engine_report::html::write_html_report;

/// A recorded sequence of inputs to replay against a session.
#[derive(Debug, Deserialize)]
struct Script {
    #[serde(default)]
    events: Vec<SessionEvent>,
}

fn load_script(path: &Path) -> Result<Script> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read script: {}", path.display()))?;
    toml::from_str(&content).with_context(|| format!("failed to parse script: {}", path.display()))
}

/// Apply one scripted event. Events arriving after the session closed are
/// skipped; any other rejection aborts the run.
fn apply_event(session: &mut ExamSession, n: usize, event: &SessionEvent) -> Result<()> {
    match session.apply(event) {
        Ok(()) => {
            tracing::debug!(
                "{} | {} left | {}% through",
                session.position_label(),
                session.remaining_label(),
                session.progress_percent()
            );
            Ok(())
        }
        Err(e) if e.is_stale() => {
            tracing::warn!("event {} ignored: {}", n + 1, e);
            Ok(())
        }
        Err(e) => Err(e).with_context(|| format!("event {} ({event:?})", n + 1)),
    }
}

/// Replay the script instantly; `tick` events move the clock.
fn replay(mut session: ExamSession, events: &[SessionEvent]) -> Result<ExamSession> {
    for (n, event) in events.iter().enumerate() {
        apply_event(&mut session, n, event)?;
    }
    Ok(session)
}

/// Replay the script against a live countdown; `tick` events become real
/// pauses and the countdown owns the clock.
async fn replay_live(
    session: ExamSession,
    events: &[SessionEvent],
    interval: Duration,
) -> Result<ExamSession> {
    let session = shared(session);
    let countdown = Countdown::spawn(session.clone(), interval);

    for (n, event) in events.iter().enumerate() {
        if let SessionEvent::Tick { secs } = event {
            tokio::time::sleep(Duration::from_secs(*secs)).await;
            continue;
        }
        let mut guard = session.lock().await;
        apply_event(&mut guard, n, event)?;
    }

    countdown.stop();
    let guard = session.lock().await;
    Ok(guard.clone())
}

pub async fn execute(
    exam_path: PathBuf,
    script_path: PathBuf,
    output: Option<PathBuf>,
    format: String,
    live: bool,
    archive: bool,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let output = output.unwrap_or_else(|| config.records_dir.clone());
    let exam = parser::parse_exam(&exam_path)?;
    let script = load_script(&script_path)?;
    let session = ExamSession::new(exam)?;

    eprintln!(
        "{}: {} questions, {} on the clock",
        session.exam().title,
        session.exam().questions.len(),
        session.remaining_label()
    );

    let mut session = if live {
        let interval = Duration::from_millis(config.tick_interval_ms.max(1));
        replay_live(session, &script.events, interval).await?
    } else {
        replay(session, &script.events)?
    };

    if session.status() == SessionStatus::InProgress {
        session.submit()?;
    }

    let record = session
        .record()
        .context("session ended without a result")?;
    print_summary(&record);

    std::fs::create_dir_all(&output)
        .with_context(|| format!("failed to create {}", output.display()))?;
    let file_name = record.file_name();
    let stem = file_name.trim_end_matches(".json");

    let formats: Vec<&str> = if format == "all" {
        vec!["json", "html"]
    } else {
        format.split(',').collect()
    };

    for fmt in &formats {
        match *fmt {
            "json" => {
                let path = output.join(format!("{stem}.json"));
                record.save_json(&path)?;
                eprintln!("Record saved to: {}", path.display());
            }
            "html" => {
                let path = output.join(format!("{stem}.html"));
                write_html_report(&record, Some(session.exam()), &path)?;
                eprintln!("HTML result page: {}", path.display());
            }
            _ => {
                eprintln!("Unknown format: {fmt}");
            }
        }
    }

    if archive {
        let sync = create_sync(config.sync.as_ref())?;
        let revision = sync.archive(&record).await?;
        eprintln!("Archived as {} ({})", revision.short_id(), revision.path);
    }

    Ok(())
}

fn print_summary(record: &ExamRecord) {
    let (headline, answered) = record.score.summary(&record.title, record.question_count);
    println!("{headline}");
    println!("{answered}");
    println!(
        "Correct: {} of {} graded questions",
        record.score.correct_count, record.score.total_graded
    );
    println!(
        "Status: {} after {} of {}",
        record.status,
        format_time(record.time_used_secs),
        format_time(record.time_limit_secs)
    );
}
