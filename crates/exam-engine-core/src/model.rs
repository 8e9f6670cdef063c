//! Core data model types for exam-engine.
//!
//! An [`Exam`] is an ordered, immutable list of [`Question`]s plus a time
//! limit. Exams are built once by a question bank (or the PDF extractor) and
//! shared read-only with every session attempting them.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use crate::error::ExamError;

/// The kind of answer a question expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuestionKind {
    MultipleChoice,
    TrueFalse,
    FreeText,
}

impl QuestionKind {
    /// Whether the question is answered by picking one of its options.
    pub fn is_choice(&self) -> bool {
        matches!(self, QuestionKind::MultipleChoice | QuestionKind::TrueFalse)
    }

    /// Hint shown to the candidate above the answer area.
    pub fn instructions(&self) -> &'static str {
        match self {
            QuestionKind::MultipleChoice => "Select the correct answer",
            QuestionKind::TrueFalse => "Select True or False",
            QuestionKind::FreeText => "Provide your answer in the text area below",
        }
    }
}

impl fmt::Display for QuestionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuestionKind::MultipleChoice => write!(f, "multiple-choice"),
            QuestionKind::TrueFalse => write!(f, "true-false"),
            QuestionKind::FreeText => write!(f, "free-text"),
        }
    }
}

impl FromStr for QuestionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "multiple-choice" | "multiple_choice" | "mc" => Ok(QuestionKind::MultipleChoice),
            "true-false" | "true_false" | "tf" => Ok(QuestionKind::TrueFalse),
            "free-text" | "free_text" | "text" => Ok(QuestionKind::FreeText),
            other => Err(format!("unknown question kind: {other}")),
        }
    }
}

/// A single item in an exam.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// Unique identifier within the exam.
    pub id: String,
    /// Text of the question.
    pub prompt: String,
    /// What kind of answer is expected.
    pub kind: QuestionKind,
    /// Ordered answer options. Empty for free-text questions.
    #[serde(default)]
    pub options: Vec<String>,
    /// Expected answer. Must be one of `options` for choice questions.
    #[serde(default)]
    pub correct_answer: Option<String>,
}

impl Question {
    /// Build a multiple-choice question.
    pub fn multiple_choice(
        id: impl Into<String>,
        prompt: impl Into<String>,
        options: &[&str],
        correct_answer: Option<&str>,
    ) -> Self {
        Self {
            id: id.into(),
            prompt: prompt.into(),
            kind: QuestionKind::MultipleChoice,
            options: options.iter().map(|o| o.to_string()).collect(),
            correct_answer: correct_answer.map(str::to_string),
        }
    }

    /// Build a true/false question with the canonical `True`/`False` options.
    pub fn true_false(id: impl Into<String>, prompt: impl Into<String>, correct: Option<bool>) -> Self {
        Self {
            id: id.into(),
            prompt: prompt.into(),
            kind: QuestionKind::TrueFalse,
            options: vec!["True".to_string(), "False".to_string()],
            correct_answer: correct.map(|c| if c { "True" } else { "False" }.to_string()),
        }
    }

    /// Build a free-text question. Free-text is never auto-graded.
    pub fn free_text(id: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            prompt: prompt.into(),
            kind: QuestionKind::FreeText,
            options: Vec::new(),
            correct_answer: None,
        }
    }

    /// Whether grading counts this question.
    ///
    /// Only choice questions with a defined correct answer are graded.
    pub fn is_gradable(&self) -> bool {
        self.kind.is_choice() && self.correct_answer.is_some()
    }

    /// Display label for the option at `index`.
    ///
    /// Multiple-choice options are lettered (`"A. Paris"`); true/false
    /// options are shown as-is.
    pub fn option_label(&self, index: usize) -> Option<String> {
        let option = self.options.get(index)?;
        match self.kind {
            QuestionKind::MultipleChoice => {
                let letter = u8::try_from(index)
                    .ok()
                    .filter(|i| *i < 26)
                    .map(|i| char::from(b'A' + i))?;
                Some(format!("{letter}. {option}"))
            }
            _ => Some(option.clone()),
        }
    }

    /// Check the structural invariant of a single question.
    pub fn validate(&self) -> Result<(), ExamError> {
        if self.id.trim().is_empty() {
            return Err(ExamError::InvalidExam("question id is empty".into()));
        }
        if self.kind.is_choice() {
            if self.options.is_empty() {
                return Err(ExamError::InvalidExam(format!(
                    "question '{}' is {} but has no options",
                    self.id, self.kind
                )));
            }
            if let Some(answer) = &self.correct_answer {
                if !self.options.contains(answer) {
                    return Err(ExamError::InvalidExam(format!(
                        "question '{}': correct answer '{answer}' is not one of its options",
                        self.id
                    )));
                }
            }
        }
        Ok(())
    }
}

/// An ordered set of questions with a time limit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exam {
    /// Human-readable title.
    pub title: String,
    /// Short description shown under the title.
    #[serde(default)]
    pub description: String,
    /// Total time allotted, in seconds.
    pub time_limit_secs: u64,
    /// Questions in navigation order.
    pub questions: Vec<Question>,
}

impl Exam {
    /// Check every structural invariant an exam session relies on.
    pub fn validate(&self) -> Result<(), ExamError> {
        if self.questions.is_empty() {
            return Err(ExamError::InvalidExam(format!(
                "exam '{}' has no questions",
                self.title
            )));
        }
        if self.time_limit_secs == 0 {
            return Err(ExamError::InvalidExam(format!(
                "exam '{}' has a zero time limit",
                self.title
            )));
        }

        let mut seen = HashSet::new();
        for question in &self.questions {
            question.validate()?;
            if !seen.insert(question.id.as_str()) {
                return Err(ExamError::InvalidExam(format!(
                    "duplicate question id: {}",
                    question.id
                )));
            }
        }
        Ok(())
    }

    /// Look up a question by id.
    pub fn question(&self, id: &str) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == id)
    }

    /// Number of questions grading will count.
    pub fn gradable_count(&self) -> usize {
        self.questions.iter().filter(|q| q.is_gradable()).count()
    }
}
