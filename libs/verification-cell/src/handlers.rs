use std::sync::Arc;

use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};

use shared_config::AppConfig;
use shared_models::auth::User;
use shared_models::error::AppError;
use shared_utils::extractor::require_admin;

use crate::models::{ApplicationStatus, PmdcCheckRequest, RegistrationRequest, ReviewRequest};
use crate::services::{admin::AdminService, registration::RegistrationService};

// ==============================================================================
// DOCTOR REGISTRATION
// ==============================================================================

#[axum::debug_handler]
pub async fn register(
    State(state): State<Arc<AppConfig>>,
    Json(request): Json<RegistrationRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let outcome = RegistrationService::new(&state).register(&request).await?;

    Ok((StatusCode::CREATED, Json(json!({
        "success": true,
        "message": "Doctor registration successful",
        "authToken": outcome.auth_token,
        "verification_status": outcome.verification_status,
        "application_id": outcome.application_id
    }))))
}

#[axum::debug_handler]
pub async fn verify_documents(
    State(state): State<Arc<AppConfig>>,
    Json(request): Json<RegistrationRequest>,
) -> Result<Json<Value>, AppError> {
    let result = RegistrationService::new(&state).check_documents(&request).await?;
    Ok(Json(result))
}

#[axum::debug_handler]
pub async fn get_verification_status(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let mut status = RegistrationService::new(&state).status_for(&user).await?;
    status["success"] = json!(true);

    Ok(Json(status))
}

// ==============================================================================
// ADMIN
// ==============================================================================

#[axum::debug_handler]
pub async fn get_admin_profile(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    require_admin(&user)?;

    let admin = AdminService::new(&state).profile(&user.id).await?;

    Ok(Json(json!({
        "success": true,
        "data": admin
    })))
}

#[axum::debug_handler]
pub async fn get_dashboard_stats(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    require_admin(&user)?;

    let stats = AdminService::new(&state).dashboard().await?;

    Ok(Json(json!({
        "success": true,
        "data": stats
    })))
}

async fn applications_response(state: &AppConfig, status: ApplicationStatus) -> Result<Json<Value>, AppError> {
    let applications = AdminService::new(state).applications_with_status(status).await?;

    Ok(Json(json!({
        "success": true,
        "count": applications.len(),
        "data": applications
    })))
}

#[axum::debug_handler]
pub async fn get_pending_applications(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    require_admin(&user)?;
    applications_response(&state, ApplicationStatus::Pending).await
}

#[axum::debug_handler]
pub async fn get_pending_approval(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    require_admin(&user)?;
    applications_response(&state, ApplicationStatus::PendingApproval).await
}

#[axum::debug_handler]
pub async fn get_application(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    Path(application_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    require_admin(&user)?;

    let application = AdminService::new(&state).get_application(&application_id).await?;

    Ok(Json(json!({
        "success": true,
        "data": application
    })))
}

#[axum::debug_handler]
pub async fn review_application(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    Path(application_id): Path<String>,
    Json(request): Json<ReviewRequest>,
) -> Result<Json<Value>, AppError> {
    require_admin(&user)?;

    let application = AdminService::new(&state).review(&application_id, &request).await?;

    Ok(Json(json!({
        "success": true,
        "message": format!("Application has been {}", application.verification_status),
        "data": {
            "id": application.id,
            "name": application.name,
            "status": application.verification_status
        }
    })))
}

#[axum::debug_handler]
pub async fn verify_pmdc(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    Path(application_id): Path<String>,
    Json(request): Json<PmdcCheckRequest>,
) -> Result<Json<Value>, AppError> {
    require_admin(&user)?;

    let (result, status) = AdminService::new(&state)
        .verify_pmdc(&application_id, request.pmdc_number.as_deref())
        .await?;

    Ok(Json(json!({
        "success": true,
        "message": "PMDC verification completed",
        "verification_result": result,
        "application_status": status
    })))
}

#[axum::debug_handler]
pub async fn get_verified_doctors(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    require_admin(&user)?;

    let doctors = AdminService::new(&state).verified_doctors().await?;

    Ok(Json(json!({
        "success": true,
        "count": doctors.len(),
        "data": doctors
    })))
}

#[axum::debug_handler]
pub async fn get_users(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    require_admin(&user)?;

    let users = AdminService::new(&state).users().await?;

    Ok(Json(json!({
        "success": true,
        "count": users.len(),
        "data": users
    })))
}

#[axum::debug_handler]
pub async fn get_pmdc_stats(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    require_admin(&user)?;

    let stats = AdminService::new(&state).pmdc_overview().await?;

    Ok(Json(json!({
        "success": true,
        "data": stats
    })))
}
