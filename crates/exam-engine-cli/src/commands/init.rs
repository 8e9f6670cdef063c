//! The `exam-engine init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    // Create exam-engine.toml
    if std::path::Path::new("exam-engine.toml").exists() {
        println!("exam-engine.toml already exists, skipping.");
    } else {
        std::fs::write("exam-engine.toml", SAMPLE_CONFIG)?;
        println!("Created exam-engine.toml");
    }

    // Create example exam
    std::fs::create_dir_all("exams")?;
    let example_path = std::path::Path::new("exams/example.toml");
    if example_path.exists() {
        println!("exams/example.toml already exists, skipping.");
    } else {
        std::fs::write(example_path, EXAMPLE_EXAM)?;
        println!("Created exams/example.toml");
    }

    println!("\nNext steps:");
    println!("  1. Edit exam-engine.toml to point [sync] at your exam store");
    println!("  2. Run: exam-engine validate --exam exams/example.toml");
    println!("  3. Run: exam-engine sync push --exam exams/example.toml");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# exam-engine configuration

records_dir = "./exam-results"
tick_interval_ms = 1000

[sync]
type = "directory"
path = "./exam-store"
repo_url = "https://github.com/your-org/exam-questions"
access_token = "${EXAM_ENGINE_SYNC_TOKEN}"
branch = "main"
"#;

const EXAMPLE_EXAM: &str = r#"[exam]
title = "Example Exam"
description = "A short example exam to get started"
time_limit_mins = 10

[[questions]]
id = "1"
prompt = "What is the capital of France?"
kind = "multiple-choice"
options = ["London", "Berlin", "Paris", "Madrid"]
correct_answer = "Paris"

[[questions]]
id = "2"
prompt = "Explain the concept of object-oriented programming."
kind = "free-text"

[[questions]]
id = "3"
prompt = "JavaScript is a compiled language."
kind = "true-false"
correct_answer = "False"
"#;
