use std::sync::Arc;

use axum::{extract::State, Json};
use serde_json::{json, Value};

use shared_config::AppConfig;
use shared_models::error::AppError;

use crate::models::{ChatReply, SymptomRequest};
use crate::services::{assistant::ChatbotService, triage::analyze_symptoms};

#[axum::debug_handler]
pub async fn chat(
    State(state): State<Arc<AppConfig>>,
    Json(request): Json<SymptomRequest>,
) -> Result<Json<ChatReply>, AppError> {
    let symptoms = request.symptoms()?;
    let reply = ChatbotService::new(&state).chat(symptoms).await;

    Ok(Json(reply))
}

#[axum::debug_handler]
pub async fn analyze(
    Json(request): Json<SymptomRequest>,
) -> Result<Json<Value>, AppError> {
    let analysis = analyze_symptoms(request.symptoms()?);

    Ok(Json(json!({
        "success": true,
        "analysis": analysis
    })))
}
