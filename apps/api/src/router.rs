use std::sync::Arc;

use axum::{
    extract::State,
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};

use appointment_cell::router::appointment_routes;
use auth_cell::handlers::status as auth_status;
use auth_cell::router::auth_routes;
use chatbot_cell::router::chatbot_routes;
use doctor_cell::router::{doctor_profile_routes, doctor_routes};
use shared_config::AppConfig;
use verification_cell::router::{admin_routes, doctor_registration_routes};

async fn health(State(state): State<Arc<AppConfig>>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "message": "Server is running correctly!",
        "environment": state.environment,
        "apiKeyConfigured": state.is_chatbot_configured()
    }))
}

pub fn create_router(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/", get(|| async { "HealthLink API is running!" }))
        .route("/api/health", get(health))
        // Nested "/" only answers the bare prefix
        .route("/api/authentication/", get(auth_status))
        .with_state(state.clone())
        .nest("/api/authentication", auth_routes(state.clone()))
        .nest("/api/doctors", doctor_routes(state.clone()))
        .nest("/api/doctor-profile", doctor_profile_routes(state.clone()))
        .nest("/api/appointments", appointment_routes(state.clone()))
        .nest("/api/doctor-registration", doctor_registration_routes(state.clone()))
        .nest("/api/admin", admin_routes(state.clone()))
        .nest("/api/chatbot", chatbot_routes(state))
}
