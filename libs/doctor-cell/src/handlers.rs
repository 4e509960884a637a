use std::sync::Arc;

use axum::{
    extract::{Path, Query, State, Extension},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};

use shared_config::AppConfig;
use shared_models::auth::{User, ROLE_DOCTOR};
use shared_models::error::AppError;
use shared_utils::extractor::{require_admin, require_role};

use crate::models::{
    AvailabilityUpdate, CreateDoctorRequest, DoctorQuery, ProfileImageUpload, UpdateDoctorRequest,
};
use crate::services::{
    availability::AvailabilityService,
    doctor::DoctorService,
    profile::ProfileService,
};

const DOCTOR_ONLY: &str = "Access denied. Doctor privileges required.";

// ==============================================================================
// DIRECTORY
// ==============================================================================

#[axum::debug_handler]
pub async fn list_doctors(
    State(state): State<Arc<AppConfig>>,
    Query(query): Query<DoctorQuery>,
) -> Result<Json<Value>, AppError> {
    let doctors = DoctorService::new(&state).list_doctors(&query).await?;

    Ok(Json(json!({
        "success": true,
        "data": doctors
    })))
}

#[axum::debug_handler]
pub async fn create_doctor(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    Json(request): Json<CreateDoctorRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    require_admin(&user)?;

    let doctor = DoctorService::new(&state).create_doctor(request).await?;

    Ok((StatusCode::CREATED, Json(json!({
        "success": true,
        "message": "Doctor added successfully",
        "data": doctor
    }))))
}

#[axum::debug_handler]
pub async fn get_doctor(
    State(state): State<Arc<AppConfig>>,
    Path(doctor_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let doctor = DoctorService::new(&state).get_doctor(&doctor_id).await?;

    Ok(Json(json!({
        "success": true,
        "data": doctor
    })))
}

// ==============================================================================
// PROFILE
// ==============================================================================

#[axum::debug_handler]
pub async fn get_profile_by_user(
    State(state): State<Arc<AppConfig>>,
    Path(user_id): Path<String>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let doctor = ProfileService::new(&state).get_by_user(&user_id, &user).await?;

    Ok(Json(json!({
        "success": true,
        "data": doctor
    })))
}

#[axum::debug_handler]
pub async fn get_profile(
    State(state): State<Arc<AppConfig>>,
    Path(doctor_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let profile = ProfileService::new(&state).get_profile(&doctor_id).await?;

    Ok(Json(json!({
        "success": true,
        "data": profile
    })))
}

#[axum::debug_handler]
pub async fn update_profile(
    State(state): State<Arc<AppConfig>>,
    Path(doctor_id): Path<String>,
    Extension(user): Extension<User>,
    Json(request): Json<UpdateDoctorRequest>,
) -> Result<Json<Value>, AppError> {
    require_role(&user, &[ROLE_DOCTOR], DOCTOR_ONLY)?;

    let doctor = ProfileService::new(&state)
        .update_profile(&doctor_id, &user, request)
        .await?;

    Ok(Json(json!({
        "success": true,
        "message": "Profile updated successfully",
        "data": doctor
    })))
}

#[axum::debug_handler]
pub async fn update_profile_image(
    State(state): State<Arc<AppConfig>>,
    Path(doctor_id): Path<String>,
    Extension(user): Extension<User>,
    Json(upload): Json<ProfileImageUpload>,
) -> Result<Json<Value>, AppError> {
    require_role(&user, &[ROLE_DOCTOR], DOCTOR_ONLY)?;

    let profile = ProfileService::new(&state)
        .update_image(&doctor_id, &user, &upload)
        .await?;

    Ok(Json(json!({
        "success": true,
        "message": "Profile image updated successfully",
        "data": { "profile": profile }
    })))
}

#[axum::debug_handler]
pub async fn get_verification_status(
    State(state): State<Arc<AppConfig>>,
    Path(doctor_id): Path<String>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let (status, details) = ProfileService::new(&state)
        .verification_status(&doctor_id, &user)
        .await?;

    Ok(Json(json!({
        "success": true,
        "verification_status": status,
        "verification_details": details
    })))
}

// ==============================================================================
// AVAILABILITY
// ==============================================================================

#[axum::debug_handler]
pub async fn get_availability(
    State(state): State<Arc<AppConfig>>,
    Path(doctor_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let availability = AvailabilityService::new(&state).get_availability(&doctor_id).await?;

    Ok(Json(json!({
        "success": true,
        "data": { "availability": availability }
    })))
}

#[axum::debug_handler]
pub async fn update_availability(
    State(state): State<Arc<AppConfig>>,
    Path(doctor_id): Path<String>,
    Extension(user): Extension<User>,
    Json(body): Json<AvailabilityUpdate>,
) -> Result<Json<Value>, AppError> {
    require_role(&user, &[ROLE_DOCTOR], DOCTOR_ONLY)?;

    let availability = AvailabilityService::new(&state)
        .update_availability(&doctor_id, &user, body.availability.as_ref())
        .await?;

    Ok(Json(json!({
        "success": true,
        "message": "Availability updated successfully",
        "data": { "availability": availability }
    })))
}
