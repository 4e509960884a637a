use std::sync::Arc;

use axum::{routing::post, Router};

use shared_config::AppConfig;

use crate::handlers;

/// Symptom assistant, mounted at `/api/chatbot`.
pub fn chatbot_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/chat", post(handlers::chat))
        .route("/analyze", post(handlers::analyze))
        .with_state(state)
}
