//! Axum route handlers for the interview API.

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::interview::identity::CallerIdentity;
use crate::interview::orchestrator::NextQuestion;
use crate::models::interview::InterviewSummary;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum QuestionResponse {
    Question { question: String },
    Done { done: bool },
}

#[derive(Debug, Deserialize)]
pub struct AnswerRequest {
    #[serde(default)]
    pub answer: String,
}

#[derive(Debug, Serialize)]
pub struct AnswerResponse {
    /// The evaluation object serialized as JSON text.
    pub evaluation: String,
    pub next_question: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ResetResponse {
    pub status: &'static str,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /question
///
/// Returns the caller's current question, generating a question set on first use.
pub async fn handle_get_question(
    State(state): State<AppState>,
    identity: CallerIdentity,
) -> Result<Json<QuestionResponse>, AppError> {
    let response = match state.interviewer.fetch_next(identity.as_str()).await? {
        NextQuestion::Question(question) => QuestionResponse::Question { question },
        NextQuestion::Done => QuestionResponse::Done { done: true },
    };
    Ok(Json(response))
}

/// POST /answer
///
/// Scores the answer to the current question and advances to the next one.
pub async fn handle_submit_answer(
    State(state): State<AppState>,
    identity: CallerIdentity,
    payload: Result<Json<AnswerRequest>, JsonRejection>,
) -> Result<Json<AnswerResponse>, AppError> {
    let Json(request) = payload?;

    let outcome = state
        .interviewer
        .submit_answer(identity.as_str(), &request.answer)
        .await?;

    Ok(Json(AnswerResponse {
        evaluation: outcome.evaluation.to_json_text(),
        next_question: outcome.next_question,
    }))
}

/// GET /reset
pub async fn handle_reset(
    State(state): State<AppState>,
    identity: CallerIdentity,
) -> Json<ResetResponse> {
    state.interviewer.reset(identity.as_str()).await;
    Json(ResetResponse {
        status: "reset complete",
    })
}

/// GET /summary
///
/// Progress and per-answer history for the caller's interview.
pub async fn handle_summary(
    State(state): State<AppState>,
    identity: CallerIdentity,
) -> Json<InterviewSummary> {
    Json(state.interviewer.summary(identity.as_str()).await)
}
