//! The exam session state machine.
//!
//! A session is one candidate's attempt at an [`Exam`]. It starts
//! `in-progress` and ends in exactly one of two terminal states:
//!
//! - `submitted`, when the candidate calls [`ExamSession::submit`];
//! - `expired`, when [`ExamSession::tick`] runs the clock down to zero.
//!
//! Both transitions grade the answers once and freeze the result. Every
//! mutating call on a terminal session fails with
//! [`ExamError::SessionClosed`], except `tick`, which is ignored so that a
//! countdown driver racing with submission is harmless.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ExamError;
use crate::grading::{self, Score};
use crate::model::{Exam, Question};
use crate::record::ExamRecord;
use crate::timer::format_time;

/// Lifecycle state of a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SessionStatus {
    #[default]
    InProgress,
    Submitted,
    Expired,
}

impl SessionStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, SessionStatus::InProgress)
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionStatus::InProgress => write!(f, "in-progress"),
            SessionStatus::Submitted => write!(f, "submitted"),
            SessionStatus::Expired => write!(f, "expired"),
        }
    }
}

/// An input to the session, as produced by a presentation layer or a script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "kebab-case")]
pub enum SessionEvent {
    Answer { question: String, value: String },
    GoTo { index: usize },
    Next,
    Previous,
    Tick { secs: u64 },
    Submit,
}

/// Read-only copy of the state a presentation layer renders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub current_index: usize,
    pub answers: HashMap<String, String>,
    pub remaining_secs: u64,
    pub status: SessionStatus,
    pub result: Option<Score>,
}

/// One cell of the question overview grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OverviewItem {
    pub index: usize,
    pub id: String,
    pub answered: bool,
    pub current: bool,
}

/// Mutable state of one exam attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "SessionState")]
pub struct ExamSession {
    id: Uuid,
    exam: Arc<Exam>,
    current_index: usize,
    answers: HashMap<String, String>,
    remaining_secs: u64,
    status: SessionStatus,
    result: Option<Score>,
    started_at: DateTime<Utc>,
    finished_at: Option<DateTime<Utc>>,
}

impl ExamSession {
    /// Start a new attempt at `exam`.
    ///
    /// Fails with [`ExamError::InvalidExam`] if the exam has no questions,
    /// a zero time limit, or a malformed question.
    pub fn new(exam: impl Into<Arc<Exam>>) -> Result<Self, ExamError> {
        let exam = exam.into();
        exam.validate()?;

        let session = Self {
            id: Uuid::new_v4(),
            current_index: 0,
            answers: HashMap::new(),
            remaining_secs: exam.time_limit_secs,
            status: SessionStatus::InProgress,
            result: None,
            started_at: Utc::now(),
            finished_at: None,
            exam,
        };
        tracing::debug!(
            "session {} started: '{}' ({} questions, {}s)",
            session.id,
            session.exam.title,
            session.exam.questions.len(),
            session.remaining_secs
        );
        Ok(session)
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn exam(&self) -> &Arc<Exam> {
        &self.exam
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn answers(&self) -> &HashMap<String, String> {
        &self.answers
    }

    pub fn answer(&self, question_id: &str) -> Option<&str> {
        self.answers.get(question_id).map(String::as_str)
    }

    pub fn remaining_secs(&self) -> u64 {
        self.remaining_secs
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn result(&self) -> Option<Score> {
        self.result
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn finished_at(&self) -> Option<DateTime<Utc>> {
        self.finished_at
    }

    fn ensure_open(&self) -> Result<(), ExamError> {
        if self.status.is_terminal() {
            return Err(ExamError::SessionClosed {
                status: self.status,
            });
        }
        Ok(())
    }

    /// Capture an answer, replacing any earlier answer to the same question.
    ///
    /// The value is stored as-is; it is not checked against the question's
    /// options. Correctness is only evaluated when grading.
    pub fn record_answer(
        &mut self,
        question_id: &str,
        value: impl Into<String>,
    ) -> Result<&mut Self, ExamError> {
        self.ensure_open()?;
        if self.exam.question(question_id).is_none() {
            return Err(ExamError::UnknownQuestion(question_id.to_string()));
        }
        self.answers.insert(question_id.to_string(), value.into());
        Ok(self)
    }

    /// Jump to the question at `index`. Never clamps.
    pub fn go_to(&mut self, index: usize) -> Result<&mut Self, ExamError> {
        self.ensure_open()?;
        let len = self.exam.questions.len();
        if index >= len {
            return Err(ExamError::IndexOutOfRange { index, len });
        }
        self.current_index = index;
        Ok(self)
    }

    /// Advance one question. A no-op on the last question.
    pub fn next(&mut self) -> Result<&mut Self, ExamError> {
        self.ensure_open()?;
        if !self.is_last() {
            self.current_index += 1;
        }
        Ok(self)
    }

    /// Go back one question. A no-op on the first question.
    pub fn previous(&mut self) -> Result<&mut Self, ExamError> {
        self.ensure_open()?;
        self.current_index = self.current_index.saturating_sub(1);
        Ok(self)
    }

    /// Advance the clock by `elapsed_secs`.
    ///
    /// Ignored once the session is terminal. When the remaining time reaches
    /// zero the session expires and is graded. Returns the status after the
    /// tick.
    pub fn tick(&mut self, elapsed_secs: u64) -> SessionStatus {
        if self.status.is_terminal() {
            return self.status;
        }

        self.remaining_secs = self.remaining_secs.saturating_sub(elapsed_secs);
        if self.remaining_secs == 0 {
            let score = self.finish(SessionStatus::Expired);
            tracing::info!(
                "session {} expired on '{}': {}%",
                self.id,
                self.exam.title,
                score.percentage
            );
        }
        self.status
    }

    /// Hand the exam in and grade it.
    ///
    /// Fails with [`ExamError::SessionClosed`] if the session already ended;
    /// the existing result is left untouched.
    pub fn submit(&mut self) -> Result<Score, ExamError> {
        self.ensure_open()?;
        let score = self.finish(SessionStatus::Submitted);
        tracing::info!(
            "session {} submitted '{}': {}/{} correct ({}%)",
            self.id,
            self.exam.title,
            score.correct_count,
            score.total_graded,
            score.percentage
        );
        Ok(score)
    }

    fn finish(&mut self, status: SessionStatus) -> Score {
        let score = self.grade();
        self.status = status;
        self.result = Some(score);
        self.finished_at = Some(Utc::now());
        score
    }

    /// Grade the current answers without changing the session.
    pub fn grade(&self) -> Score {
        grading::grade(&self.exam.questions, &self.answers)
    }

    /// Apply an event. `Tick` never fails.
    pub fn apply(&mut self, event: &SessionEvent) -> Result<(), ExamError> {
        match event {
            SessionEvent::Answer { question, value } => {
                self.record_answer(question, value.as_str())?;
            }
            SessionEvent::GoTo { index } => {
                self.go_to(*index)?;
            }
            SessionEvent::Next => {
                self.next()?;
            }
            SessionEvent::Previous => {
                self.previous()?;
            }
            SessionEvent::Tick { secs } => {
                self.tick(*secs);
            }
            SessionEvent::Submit => {
                self.submit()?;
            }
        }
        Ok(())
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            current_index: self.current_index,
            answers: self.answers.clone(),
            remaining_secs: self.remaining_secs,
            status: self.status,
            result: self.result,
        }
    }

    pub fn current_question(&self) -> &Question {
        &self.exam.questions[self.current_index]
    }

    pub fn is_last(&self) -> bool {
        self.current_index + 1 >= self.exam.questions.len()
    }

    /// "Question N of M".
    pub fn position_label(&self) -> String {
        format!(
            "Question {} of {}",
            self.current_index + 1,
            self.exam.questions.len()
        )
    }

    /// How far through the exam the current question is, as a whole percent.
    pub fn progress_percent(&self) -> u32 {
        grading::percentage(self.current_index + 1, self.exam.questions.len())
    }

    /// Remaining time as `m:ss`.
    pub fn remaining_label(&self) -> String {
        format_time(self.remaining_secs)
    }

    pub fn overview(&self) -> Vec<OverviewItem> {
        self.exam
            .questions
            .iter()
            .enumerate()
            .map(|(index, q)| OverviewItem {
                index,
                id: q.id.clone(),
                answered: self.answers.contains_key(&q.id),
                current: index == self.current_index,
            })
            .collect()
    }

    /// The archival record, once the session has ended.
    pub fn record(&self) -> Option<ExamRecord> {
        let score = self.result?;
        Some(ExamRecord {
            id: self.id,
            title: self.exam.title.clone(),
            description: self.exam.description.clone(),
            status: self.status,
            answers: self
                .answers
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
            score,
            question_count: self.exam.questions.len(),
            time_limit_secs: self.exam.time_limit_secs,
            time_used_secs: self.exam.time_limit_secs - self.remaining_secs,
            completed_at: self.finished_at.unwrap_or(self.started_at),
        })
    }
}

/// Wire form of [`ExamSession`]; checked on the way in.
#[derive(Deserialize)]
struct SessionState {
    id: Uuid,
    exam: Arc<Exam>,
    current_index: usize,
    answers: HashMap<String, String>,
    remaining_secs: u64,
    status: SessionStatus,
    result: Option<Score>,
    started_at: DateTime<Utc>,
    finished_at: Option<DateTime<Utc>>,
}

impl TryFrom<SessionState> for ExamSession {
    type Error = ExamError;

    fn try_from(state: SessionState) -> Result<Self, Self::Error> {
        state.exam.validate()?;

        let len = state.exam.questions.len();
        if state.current_index >= len {
            return Err(ExamError::IndexOutOfRange {
                index: state.current_index,
                len,
            });
        }
        if let Some(unknown) = state
            .answers
            .keys()
            .find(|id| state.exam.question(id).is_none())
        {
            return Err(ExamError::UnknownQuestion(unknown.clone()));
        }
        if state.remaining_secs > state.exam.time_limit_secs {
            return Err(ExamError::InvalidExam(format!(
                "remaining time {}s exceeds the time limit",
                state.remaining_secs
            )));
        }
        if state.status.is_terminal() != state.result.is_some() {
            return Err(ExamError::InvalidExam(format!(
                "a {} session must {}carry a result",
                state.status,
                if state.status.is_terminal() { "" } else { "not " }
            )));
        }

        Ok(Self {
            id: state.id,
            exam: state.exam,
            current_index: state.current_index,
            answers: state.answers,
            remaining_secs: state.remaining_secs,
            status: state.status,
            result: state.result,
            started_at: state.started_at,
            finished_at: state.finished_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures::geography_exam;

    fn session() -> ExamSession {
        ExamSession::new(geography_exam()).unwrap()
    }

    #[test]
    fn new_session_initial_state() {
        let s = session();
        assert_eq!(s.current_index(), 0);
        assert!(s.answers().is_empty());
        assert_eq!(s.remaining_secs(), 1800);
        assert_eq!(s.status(), SessionStatus::InProgress);
        assert!(s.result().is_none());
        assert!(s.record().is_none());
    }

    #[test]
    fn new_rejects_empty_exam() {
        let mut exam = geography_exam();
        exam.questions.clear();
        assert!(matches!(
            ExamSession::new(exam),
            Err(ExamError::InvalidExam(_))
        ));
    }

    #[test]
    fn new_rejects_zero_time_limit() {
        let mut exam = geography_exam();
        exam.time_limit_secs = 0;
        assert!(matches!(
            ExamSession::new(exam),
            Err(ExamError::InvalidExam(_))
        ));
    }

    #[test]
    fn record_answer_upserts() {
        let mut s = session();
        s.record_answer("q1", "London").unwrap();
        s.record_answer("q1", "Paris").unwrap();
        assert_eq!(s.answer("q1"), Some("Paris"));
        assert_eq!(s.answers().len(), 1);
    }

    #[test]
    fn record_answer_accepts_values_outside_options() {
        let mut s = session();
        s.record_answer("q1", "somewhere in Europe").unwrap();
        assert_eq!(s.answer("q1"), Some("somewhere in Europe"));
        assert_eq!(s.grade().correct_count, 0);
    }

    #[test]
    fn record_answer_unknown_id() {
        let mut s = session();
        assert_eq!(
            s.record_answer("q42", "x").unwrap_err(),
            ExamError::UnknownQuestion("q42".into())
        );
        assert!(s.answers().is_empty());
    }

    #[test]
    fn go_to_validates_index() {
        let mut s = session();
        s.go_to(2).unwrap();
        assert_eq!(s.current_index(), 2);
        assert_eq!(
            s.go_to(3).unwrap_err(),
            ExamError::IndexOutOfRange { index: 3, len: 3 }
        );
        assert_eq!(s.current_index(), 2);
    }

    #[test]
    fn navigation_does_not_touch_answers() {
        let mut s = session();
        s.record_answer("q1", "Paris").unwrap();
        s.next().unwrap().next().unwrap().previous().unwrap();
        s.go_to(0).unwrap();
        assert_eq!(s.answer("q1"), Some("Paris"));
        assert_eq!(s.answers().len(), 1);
    }

    #[test]
    fn next_is_noop_on_last_question() {
        let mut s = session();
        s.go_to(2).unwrap();
        s.next().unwrap();
        assert_eq!(s.current_index(), 2);
    }

    #[test]
    fn previous_is_noop_on_first_question() {
        let mut s = session();
        s.previous().unwrap();
        assert_eq!(s.current_index(), 0);
    }

    #[test]
    fn submit_grades_and_closes() {
        let mut s = session();
        s.record_answer("q1", "Paris").unwrap();
        s.record_answer("q3", "False").unwrap();

        let score = s.submit().unwrap();
        assert_eq!(score.correct_count, 1);
        assert_eq!(score.total_graded, 2);
        assert_eq!(score.percentage, 50);
        assert_eq!(score.answered_count, 2);
        assert_eq!(s.status(), SessionStatus::Submitted);
        assert_eq!(s.result(), Some(score));
    }

    #[test]
    fn terminal_guard_after_submit() {
        let mut s = session();
        s.record_answer("q1", "Paris").unwrap();
        let score = s.submit().unwrap();

        let closed = ExamError::SessionClosed {
            status: SessionStatus::Submitted,
        };
        assert_eq!(s.record_answer("q3", "True").unwrap_err(), closed);
        assert_eq!(s.go_to(1).unwrap_err(), closed);
        assert_eq!(s.next().unwrap_err(), closed);
        assert_eq!(s.previous().unwrap_err(), closed);
        assert_eq!(s.submit().unwrap_err(), closed);

        assert_eq!(s.result(), Some(score));
        assert_eq!(s.answers().len(), 1);
    }

    #[test]
    fn tick_counts_down() {
        let mut s = session();
        assert_eq!(s.tick(1), SessionStatus::InProgress);
        assert_eq!(s.tick(59), SessionStatus::InProgress);
        assert_eq!(s.remaining_secs(), 1740);
        assert_eq!(s.remaining_label(), "29:00");
    }

    #[test]
    fn tick_past_zero_expires_and_grades() {
        let mut s = session();
        s.record_answer("q1", "Paris").unwrap();

        assert_eq!(s.tick(10_000), SessionStatus::Expired);
        assert_eq!(s.remaining_secs(), 0);
        let score = s.result().expect("expired session carries a result");
        assert_eq!(score.correct_count, 1);
        assert_eq!(score.percentage, 50);
    }

    #[test]
    fn tick_exactly_to_zero_expires() {
        let mut s = session();
        assert_eq!(s.tick(1800), SessionStatus::Expired);
        assert_eq!(s.remaining_secs(), 0);
        assert!(s.result().is_some());
    }

    #[test]
    fn tick_after_terminal_is_ignored() {
        let mut s = session();
        s.tick(100);
        s.submit().unwrap();
        assert_eq!(s.tick(5000), SessionStatus::Submitted);
        assert_eq!(s.remaining_secs(), 1700);
    }

    #[test]
    fn expired_session_rejects_submit() {
        let mut s = session();
        s.tick(1800);
        assert_eq!(
            s.submit().unwrap_err(),
            ExamError::SessionClosed {
                status: SessionStatus::Expired
            }
        );
        assert_eq!(s.status(), SessionStatus::Expired);
    }

    #[test]
    fn grade_is_pure() {
        let mut s = session();
        s.record_answer("q3", "True").unwrap();
        let before = s.snapshot();
        assert_eq!(s.grade(), s.grade());
        assert_eq!(s.snapshot(), before);
        assert_eq!(s.status(), SessionStatus::InProgress);
    }

    #[test]
    fn apply_events() {
        let mut s = session();
        let events = [
            SessionEvent::Answer {
                question: "q1".into(),
                value: "Paris".into(),
            },
            SessionEvent::Next,
            SessionEvent::Next,
            SessionEvent::Answer {
                question: "q3".into(),
                value: "True".into(),
            },
            SessionEvent::Tick { secs: 90 },
            SessionEvent::Previous,
            SessionEvent::Submit,
        ];
        for event in &events {
            s.apply(event).unwrap();
        }
        assert_eq!(s.current_index(), 1);
        assert_eq!(s.remaining_secs(), 1710);
        assert_eq!(s.result().unwrap().percentage, 100);
        assert!(s.apply(&SessionEvent::GoTo { index: 0 }).is_err());
        assert!(s.apply(&SessionEvent::Tick { secs: 1 }).is_ok());
    }

    #[test]
    fn event_serde_shape() {
        let json = r#"{"action":"answer","question":"q1","value":"Paris"}"#;
        let event: SessionEvent = serde_json::from_str(json).unwrap();
        assert_eq!(
            event,
            SessionEvent::Answer {
                question: "q1".into(),
                value: "Paris".into()
            }
        );
        let event: SessionEvent = serde_json::from_str(r#"{"action":"go-to","index":2}"#).unwrap();
        assert_eq!(event, SessionEvent::GoTo { index: 2 });
    }

    #[test]
    fn presentation_helpers() {
        let mut s = session();
        assert_eq!(s.position_label(), "Question 1 of 3");
        assert_eq!(s.progress_percent(), 33);
        assert_eq!(s.current_question().id, "q1");
        assert!(!s.is_last());

        s.record_answer("q1", "Paris").unwrap();
        s.go_to(2).unwrap();
        assert_eq!(s.position_label(), "Question 3 of 3");
        assert_eq!(s.progress_percent(), 100);
        assert!(s.is_last());

        let overview = s.overview();
        assert_eq!(overview.len(), 3);
        assert!(overview[0].answered && !overview[0].current);
        assert!(!overview[1].answered);
        assert!(overview[2].current);
    }

    #[test]
    fn record_after_submit() {
        let mut s = session();
        s.record_answer("q1", "Paris").unwrap();
        s.tick(300);
        s.submit().unwrap();

        let record = s.record().unwrap();
        assert_eq!(record.id, s.id());
        assert_eq!(record.title, "General Knowledge");
        assert_eq!(record.status, SessionStatus::Submitted);
        assert_eq!(record.time_used_secs, 300);
        assert_eq!(record.question_count, 3);
        assert_eq!(record.answers.get("q1").map(String::as_str), Some("Paris"));
    }

    #[test]
    fn serde_roundtrip_preserves_state() {
        let mut s = session();
        s.record_answer("q2", "Objects and messages").unwrap();
        s.go_to(1).unwrap();
        s.tick(42);

        let json = serde_json::to_string(&s).unwrap();
        let restored: ExamSession = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.snapshot(), s.snapshot());
        assert_eq!(restored.id(), s.id());
    }

    #[test]
    fn deserialize_rejects_inconsistent_state() {
        let mut s = session();
        s.go_to(2).unwrap();
        let mut value = serde_json::to_value(&s).unwrap();
        value["current_index"] = serde_json::json!(7);
        assert!(serde_json::from_value::<ExamSession>(value).is_err());

        let mut value = serde_json::to_value(&s).unwrap();
        value["status"] = serde_json::json!("submitted");
        assert!(serde_json::from_value::<ExamSession>(value).is_err());
    }
}
