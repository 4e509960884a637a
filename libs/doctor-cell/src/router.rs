use std::sync::Arc;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    middleware,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

/// A 5 MB profile image grows by a third once base64 encoded.
const PROFILE_BODY_LIMIT: usize = 8 * 1024 * 1024;

/// Doctor directory, mounted at `/api/doctors`.
pub fn doctor_routes(state: Arc<AppConfig>) -> Router {
    let public_routes = Router::new()
        .route("/", get(handlers::list_doctors))
        .route("/{doctor_id}", get(handlers::get_doctor));

    let protected_routes = Router::new()
        .route("/", post(handlers::create_doctor))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}

/// Doctor self-service profile, mounted at `/api/doctor-profile`.
pub fn doctor_profile_routes(state: Arc<AppConfig>) -> Router {
    let public_routes = Router::new()
        .route("/{doctor_id}", get(handlers::get_profile))
        .route("/{doctor_id}/availability", get(handlers::get_availability));

    let protected_routes = Router::new()
        .route("/user/{user_id}", get(handlers::get_profile_by_user))
        .route("/verification-status/{doctor_id}", get(handlers::get_verification_status))
        .route("/{doctor_id}", put(handlers::update_profile))
        .route("/{doctor_id}/image", put(handlers::update_profile_image))
        .route("/{doctor_id}/availability", put(handlers::update_availability))
        .layer(DefaultBodyLimit::max(PROFILE_BODY_LIMIT))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}
