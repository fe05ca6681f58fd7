use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::interview::session::SessionError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Could not generate questions: {0}")]
    QuestionGeneration(String),

    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, details) = match &self {
            AppError::QuestionGeneration(details) => {
                tracing::error!("Question generation failed: {details}");
                (
                    StatusCode::BAD_GATEWAY,
                    "QUESTION_GENERATION_FAILED",
                    "Could not generate questions.".to_string(),
                    details.clone(),
                )
            }
            AppError::Session(e) => (
                StatusCode::CONFLICT,
                "NO_ACTIVE_SESSION",
                "No more questions left.".to_string(),
                e.to_string(),
            ),
            AppError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                "Invalid request.".to_string(),
                msg.clone(),
            ),
        };

        let body = Json(json!({
            "error": message,
            "code": code,
            "details": details,
        }));

        (status, body).into_response()
    }
}
