pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::interview::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/question", get(handlers::handle_get_question))
        .route("/answer", post(handlers::handle_submit_answer))
        .route("/reset", get(handlers::handle_reset))
        .route("/summary", get(handlers::handle_summary))
        .with_state(state)
}
