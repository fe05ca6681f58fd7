use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::evaluation::EvaluationResult;

/// Progress of a session, derived from its cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Uninitialized,
    InProgress,
    Complete,
}

/// One answered question. Never modified after it is appended.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnswerRecord {
    pub question: String,
    pub answer: String,
    pub evaluation: EvaluationResult,
    pub answered_at: DateTime<Utc>,
}

/// Per-caller interview progress.
///
/// `index` only ever moves forward and never exceeds `questions.len()`.
#[derive(Debug, Clone, PartialEq)]
pub struct InterviewSession {
    questions: Vec<String>,
    index: usize,
    history: Vec<AnswerRecord>,
    started_at: DateTime<Utc>,
}

impl InterviewSession {
    pub fn new(questions: Vec<String>) -> Self {
        Self {
            questions,
            index: 0,
            history: Vec::new(),
            started_at: Utc::now(),
        }
    }

    pub fn questions(&self) -> &[String] {
        &self.questions
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn history(&self) -> &[AnswerRecord] {
        &self.history
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn current_question(&self) -> Option<&str> {
        self.questions.get(self.index).map(String::as_str)
    }

    pub fn state(&self) -> SessionState {
        if self.index < self.questions.len() {
            SessionState::InProgress
        } else {
            SessionState::Complete
        }
    }

    pub fn is_complete(&self) -> bool {
        self.state() == SessionState::Complete
    }

    /// Records an answer to the current question and advances the cursor.
    /// Returns `None` when the session is already complete.
    pub fn record_answer(
        &mut self,
        answer: String,
        evaluation: EvaluationResult,
    ) -> Option<&AnswerRecord> {
        let question = self.current_question()?.to_string();
        self.history.push(AnswerRecord {
            question,
            answer,
            evaluation,
            answered_at: Utc::now(),
        });
        self.index += 1;
        self.history.last()
    }

    pub fn average_score(&self) -> Option<f64> {
        if self.history.is_empty() {
            return None;
        }
        let total: i64 = self.history.iter().map(|r| r.evaluation.score).sum();
        Some(total as f64 / self.history.len() as f64)
    }
}

/// Read-only snapshot of a caller's interview.
#[derive(Debug, Clone, Serialize)]
pub struct InterviewSummary {
    pub state: SessionState,
    pub total: usize,
    pub answered: usize,
    pub average_score: Option<f64>,
    pub started_at: Option<DateTime<Utc>>,
    pub history: Vec<AnswerRecord>,
}

impl InterviewSummary {
    pub fn uninitialized() -> Self {
        Self {
            state: SessionState::Uninitialized,
            total: 0,
            answered: 0,
            average_score: None,
            started_at: None,
            history: Vec::new(),
        }
    }
}

impl From<&InterviewSession> for InterviewSummary {
    fn from(session: &InterviewSession) -> Self {
        Self {
            state: session.state(),
            total: session.questions().len(),
            answered: session.history().len(),
            average_score: session.average_score(),
            started_at: Some(session.started_at()),
            history: session.history().to_vec(),
        }
    }
}
