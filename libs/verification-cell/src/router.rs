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

/// Three base64 documents of up to 10 MB each.
const REGISTRATION_BODY_LIMIT: usize = 45 * 1024 * 1024;

pub fn doctor_registration_routes(state: Arc<AppConfig>) -> Router {
    let public_routes = Router::new()
        .route("/register", post(handlers::register))
        .route("/verify-documents", post(handlers::verify_documents))
        .layer(DefaultBodyLimit::max(REGISTRATION_BODY_LIMIT));

    let protected_routes = Router::new()
        .route("/verification-status", get(handlers::get_verification_status))
        // Admin queue under its older registration paths
        .route("/pending-verification", get(handlers::get_pending_applications))
        .route("/update-verification/{application_id}", put(handlers::review_application))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}

pub fn admin_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/profile", get(handlers::get_admin_profile))
        .route("/dashboard-stats", get(handlers::get_dashboard_stats))
        .route("/pending-applications", get(handlers::get_pending_applications))
        .route("/pending-verifications", get(handlers::get_pending_applications))
        .route("/pending-approval", get(handlers::get_pending_approval))
        .route("/doctor-application/{application_id}", get(handlers::get_application))
        .route("/review-application/{application_id}", put(handlers::review_application))
        .route("/verify-pmdc/{application_id}", post(handlers::verify_pmdc))
        .route("/verified-doctors", get(handlers::get_verified_doctors))
        .route("/users", get(handlers::get_users))
        .route("/pmdc-stats", get(handlers::get_pmdc_stats))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .with_state(state)
}
