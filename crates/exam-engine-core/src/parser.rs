//! TOML exam file parser.
//!
//! Loads exams from TOML files and directories, writes them back out, and
//! lints them for problems that do not make an exam invalid but usually
//! indicate an authoring mistake.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::model::{Exam, Question, QuestionKind};

/// Intermediate TOML structure for exam files.
#[derive(Debug, Serialize, Deserialize)]
struct TomlExamFile {
    exam: TomlExamHeader,
    #[serde(default)]
    questions: Vec<TomlQuestion>,
}

#[derive(Debug, Serialize, Deserialize)]
struct TomlExamHeader {
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    time_limit_secs: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    time_limit_mins: Option<u64>,
}

#[derive(Debug, Serialize, Deserialize)]
struct TomlQuestion {
    id: String,
    prompt: String,
    #[serde(default = "default_kind")]
    kind: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    options: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    correct_answer: Option<String>,
}

fn default_kind() -> String {
    "multiple-choice".to_string()
}

/// Parse a single TOML file into an `Exam`.
pub fn parse_exam(path: &Path) -> Result<Exam> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read exam file: {}", path.display()))?;

    parse_exam_str(&content, path)
}

/// Parse a TOML string into an `Exam` (useful for testing).
///
/// The result is structurally validated; an exam that could not start a
/// session is rejected here.
pub fn parse_exam_str(content: &str, source_path: &Path) -> Result<Exam> {
    let parsed: TomlExamFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    let time_limit_secs = match (parsed.exam.time_limit_secs, parsed.exam.time_limit_mins) {
        (Some(secs), None) => secs,
        (None, Some(mins)) => mins.saturating_mul(60),
        (Some(_), Some(_)) => anyhow::bail!(
            "{}: set either time_limit_secs or time_limit_mins, not both",
            source_path.display()
        ),
        (None, None) => anyhow::bail!("{}: missing time limit", source_path.display()),
    };

    let questions = parsed
        .questions
        .into_iter()
        .map(|q| {
            let kind: QuestionKind = q
                .kind
                .parse()
                .map_err(|e: String| anyhow::anyhow!("question '{}': {}", q.id, e))?;
            let options = match (kind, q.options.is_empty()) {
                (QuestionKind::TrueFalse, true) => vec!["True".to_string(), "False".to_string()],
                _ => q.options,
            };
            Ok(Question {
                id: q.id,
                prompt: q.prompt,
                kind,
                options,
                correct_answer: q.correct_answer,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let exam = Exam {
        title: parsed.exam.title,
        description: parsed.exam.description,
        time_limit_secs,
        questions,
    };
    exam.validate()
        .with_context(|| format!("invalid exam in {}", source_path.display()))?;

    Ok(exam)
}

/// Serialize an exam back to the TOML file format.
pub fn to_toml(exam: &Exam) -> Result<String> {
    let (time_limit_secs, time_limit_mins) = if exam.time_limit_secs % 60 == 0 {
        (None, Some(exam.time_limit_secs / 60))
    } else {
        (Some(exam.time_limit_secs), None)
    };

    let file = TomlExamFile {
        exam: TomlExamHeader {
            title: exam.title.clone(),
            description: exam.description.clone(),
            time_limit_secs,
            time_limit_mins,
        },
        questions: exam
            .questions
            .iter()
            .map(|q| TomlQuestion {
                id: q.id.clone(),
                prompt: q.prompt.clone(),
                kind: q.kind.to_string(),
                options: q.options.clone(),
                correct_answer: q.correct_answer.clone(),
            })
            .collect(),
    };

    toml::to_string_pretty(&file).context("failed to serialize exam to TOML")
}

/// Recursively load all `.toml` exam files from a directory.
pub fn load_exam_directory(dir: &Path) -> Result<Vec<Exam>> {
    let mut exams = Vec::new();

    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
    {
        let entry = entry?;
        let path = entry.path();

        if path.is_dir() {
            exams.extend(load_exam_directory(&path)?);
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            match parse_exam(&path) {
                Ok(exam) => exams.push(exam),
                Err(e) => {
                    tracing::warn!("skipping {}: {:#}", path.display(), e);
                }
            }
        }
    }

    Ok(exams)
}

/// A non-fatal issue found in an exam.
#[derive(Debug, Clone)]
pub struct LintWarning {
    /// The question id (if applicable).
    pub question_id: Option<String>,
    /// Warning message.
    pub message: String,
}

/// Check an exam for authoring mistakes that grading would silently absorb.
pub fn lint_exam(exam: &Exam) -> Vec<LintWarning> {
    let mut warnings = Vec::new();

    for q in &exam.questions {
        let mut warn = |message: String| {
            warnings.push(LintWarning {
                question_id: Some(q.id.clone()),
                message,
            })
        };

        if q.prompt.trim().is_empty() {
            warn("prompt is empty".into());
        }
        if q.kind.is_choice() && q.correct_answer.is_none() {
            warn(format!("{} question has no correct_answer and will not be graded", q.kind));
        }
        if q.kind == QuestionKind::FreeText && q.correct_answer.is_some() {
            warn("free-text questions are never auto-graded; correct_answer is ignored".into());
        }
        if q.kind == QuestionKind::FreeText && !q.options.is_empty() {
            warn("free-text question lists options that will never be shown".into());
        }

        let mut seen = HashSet::new();
        for option in &q.options {
            if !seen.insert(option.as_str()) {
                warn(format!("duplicate option: {option}"));
            }
        }
    }

    if exam.gradable_count() == 0 {
        warnings.push(LintWarning {
            question_id: None,
            message: "no gradable questions; every attempt will score 0%".into(),
        });
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const VALID_TOML: &str = r#"
[exam]
title = "JavaScript Fundamentals"
description = "Test your knowledge of JavaScript basics"
time_limit_mins = 30

[[questions]]
id = "1"
prompt = "What is the correct way to declare a variable in JavaScript?"
kind = "multiple-choice"
options = ["var x = 5;", "variable x = 5;", "v x = 5;", "declare x = 5;"]
correct_answer = "var x = 5;"

[[questions]]
id = "2"
prompt = "Explain the difference between let, const, and var in JavaScript."
kind = "text"

[[questions]]
id = "3"
prompt = "JavaScript is case-sensitive."
kind = "true-false"
correct_answer = "True"
"#;

    #[test]
    fn parse_valid_toml() {
        let exam = parse_exam_str(VALID_TOML, &PathBuf::from("test.toml")).unwrap();
        assert_eq!(exam.title, "JavaScript Fundamentals");
        assert_eq!(exam.time_limit_secs, 1800);
        assert_eq!(exam.questions.len(), 3);
        assert_eq!(exam.questions[1].kind, QuestionKind::FreeText);
        assert_eq!(exam.questions[2].options, vec!["True", "False"]);
        assert_eq!(exam.gradable_count(), 2);
    }

    #[test]
    fn parse_time_limit_in_seconds() {
        let toml = r#"
[exam]
title = "Quick"
time_limit_secs = 90

[[questions]]
id = "a"
prompt = "Pick one"
options = ["x", "y"]
correct_answer = "y"
"#;
        let exam = parse_exam_str(toml, &PathBuf::from("quick.toml")).unwrap();
        assert_eq!(exam.time_limit_secs, 90);
        assert_eq!(exam.questions[0].kind, QuestionKind::MultipleChoice);
    }

    #[test]
    fn parse_rejects_missing_or_double_time_limit() {
        let missing = "[exam]\ntitle = \"T\"\n\n[[questions]]\nid = \"a\"\nprompt = \"p\"\nkind = \"text\"\n";
        assert!(parse_exam_str(missing, &PathBuf::from("t.toml")).is_err());

        let both = "[exam]\ntitle = \"T\"\ntime_limit_secs = 60\ntime_limit_mins = 1\n\n[[questions]]\nid = \"a\"\nprompt = \"p\"\nkind = \"text\"\n";
        let err = parse_exam_str(both, &PathBuf::from("t.toml")).unwrap_err();
        assert!(err.to_string().contains("not both"));
    }

    #[test]
    fn parse_rejects_empty_exam() {
        let toml = "[exam]\ntitle = \"Empty\"\ntime_limit_mins = 10\n";
        let err = parse_exam_str(toml, &PathBuf::from("empty.toml")).unwrap_err();
        assert!(format!("{err:#}").contains("has no questions"));
    }

    #[test]
    fn parse_rejects_unknown_kind() {
        let toml = "[exam]\ntitle = \"T\"\ntime_limit_mins = 1\n\n[[questions]]\nid = \"a\"\nprompt = \"p\"\nkind = \"essay\"\n";
        let err = parse_exam_str(toml, &PathBuf::from("t.toml")).unwrap_err();
        assert!(err.to_string().contains("unknown question kind"));
    }

    #[test]
    fn parse_malformed_toml() {
        let bad = "this is not [valid toml }{";
        assert!(parse_exam_str(bad, &PathBuf::from("bad.toml")).is_err());
    }

    #[test]
    fn toml_roundtrip() {
        let exam = parse_exam_str(VALID_TOML, &PathBuf::from("test.toml")).unwrap();
        let rendered = to_toml(&exam).unwrap();
        assert!(rendered.contains("time_limit_mins = 30"));
        let back = parse_exam_str(&rendered, &PathBuf::from("rendered.toml")).unwrap();
        assert_eq!(back, exam);
    }

    #[test]
    fn lint_flags_authoring_mistakes() {
        let toml = r#"
[exam]
title = "Sloppy"
time_limit_mins = 5

[[questions]]
id = "a"
prompt = "Pick"
options = ["x", "x"]

[[questions]]
id = "b"
prompt = "Explain"
kind = "free-text"
correct_answer = "because"
"#;
        let exam = parse_exam_str(toml, &PathBuf::from("sloppy.toml")).unwrap();
        let warnings = lint_exam(&exam);
        assert!(warnings.iter().any(|w| w.message.contains("will not be graded")));
        assert!(warnings.iter().any(|w| w.message.contains("duplicate option")));
        assert!(warnings.iter().any(|w| w.message.contains("never auto-graded")));
        assert!(warnings
            .iter()
            .any(|w| w.question_id.is_none() && w.message.contains("no gradable questions")));
    }

    #[test]
    fn lint_clean_exam() {
        let exam = parse_exam_str(VALID_TOML, &PathBuf::from("test.toml")).unwrap();
        assert!(lint_exam(&exam).is_empty());
    }

    #[test]
    fn load_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("js.toml"), VALID_TOML).unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();
        std::fs::write(dir.path().join("nested").join("bad.toml"), "[exam]").unwrap();
        std::fs::write(dir.path().join("readme.md"), "# not an exam").unwrap();

        let exams = load_exam_directory(dir.path()).unwrap();
        assert_eq!(exams.len(), 1);
        assert_eq!(exams[0].title, "JavaScript Fundamentals");
    }
}
