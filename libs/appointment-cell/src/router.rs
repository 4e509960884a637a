// libs/appointment-cell/src/router.rs
use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post, put},
    middleware,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

pub fn appointment_routes(state: Arc<AppConfig>) -> Router {
    // Patients book without an account
    let public_routes = Router::new()
        .route("/book", post(handlers::book_appointment))
        .route("/available-slots/{doctor_id}/{date}", get(handlers::get_available_slots))
        .route("/check-slot/{doctor_id}/{date}/{time}", get(handlers::check_slot))
        .route("/patient", get(handlers::get_patient_appointments))
        .route("/{appointment_id}/confirmation", get(handlers::get_confirmation));

    let protected_routes = Router::new()
        .route("/doctor/{doctor_id}", get(handlers::get_doctor_appointments))
        .route("/{appointment_id}/status", put(handlers::update_status))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}
