//! Exam scoring.
//!
//! Grading is a pure function of the exam's questions and the captured
//! answers. Only choice questions with a defined correct answer count toward
//! the score; answers are compared byte-for-byte (case-sensitive, no
//! trimming).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::model::Question;

/// The outcome of grading an answer set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    /// Graded questions answered exactly right.
    pub correct_count: usize,
    /// Questions with a defined correct answer.
    pub total_graded: usize,
    /// `correct_count / total_graded * 100`, rounded. 0 when nothing is graded.
    pub percentage: u32,
    /// Questions of any kind that have an answer.
    pub answered_count: usize,
}

impl Score {
    /// Headline and answered-count lines for a result screen.
    pub fn summary(&self, title: &str, question_count: usize) -> (String, String) {
        (
            format!("You scored {}% on {title}", self.percentage),
            format!(
                "{} of {question_count} questions answered",
                self.answered_count
            ),
        )
    }
}

/// Grade `answers` against `questions`.
pub fn grade(questions: &[Question], answers: &HashMap<String, String>) -> Score {
    let mut correct_count = 0usize;
    let mut total_graded = 0usize;
    let mut answered_count = 0usize;

    for question in questions {
        let answer = answers.get(&question.id);
        if answer.is_some() {
            answered_count += 1;
        }

        if !question.is_gradable() {
            continue;
        }
        total_graded += 1;
        if answer.is_some() && answer == question.correct_answer.as_ref() {
            correct_count += 1;
        }
    }

    Score {
        correct_count,
        total_graded,
        percentage: percentage(correct_count, total_graded),
        answered_count,
    }
}

/// Integer percentage, rounded half away from zero.
pub fn percentage(part: usize, whole: usize) -> u32 {
    if whole == 0 {
        return 0;
    }
    ((part as f64 / whole as f64) * 100.0).round() as u32
}
