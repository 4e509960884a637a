use std::sync::Arc;

use axum::{
    extract::{Path, Query, State, Extension},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};

use shared_config::AppConfig;
use shared_models::auth::{User, ROLE_ADMIN, ROLE_DOCTOR};
use shared_models::error::AppError;
use shared_utils::extractor::require_role;

use crate::models::{
    BookAppointmentRequest, ConfirmationQuery, PatientQuery, StatusUpdateRequest,
};
use crate::services::booking::AppointmentService;
use crate::services::confirmation::{attachment_filename, build_confirmation, render_text};

const STAFF_ONLY: &str = "Access denied. Doctor or admin privileges required.";

#[axum::debug_handler]
pub async fn book_appointment(
    State(state): State<Arc<AppConfig>>,
    Json(request): Json<BookAppointmentRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let appointment = AppointmentService::new(&state).book(&request).await?;

    Ok((StatusCode::CREATED, Json(json!({
        "success": true,
        "message": "Appointment booked successfully",
        "data": appointment
    }))))
}

#[axum::debug_handler]
pub async fn get_available_slots(
    State(state): State<Arc<AppConfig>>,
    Path((doctor_id, date)): Path<(String, String)>,
) -> Result<Json<Value>, AppError> {
    let slots = AppointmentService::new(&state)
        .available_slots(&doctor_id, &date)
        .await?;

    Ok(Json(json!({
        "success": true,
        "data": slots
    })))
}

#[axum::debug_handler]
pub async fn check_slot(
    State(state): State<Arc<AppConfig>>,
    Path((doctor_id, date, time)): Path<(String, String, String)>,
) -> Result<Json<Value>, AppError> {
    let available = AppointmentService::new(&state)
        .is_slot_free(&doctor_id, &date, &time)
        .await?;

    Ok(Json(json!({
        "success": true,
        "available": available
    })))
}

#[axum::debug_handler]
pub async fn get_doctor_appointments(
    State(state): State<Arc<AppConfig>>,
    Path(doctor_id): Path<String>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    require_role(&user, &[ROLE_DOCTOR, ROLE_ADMIN], STAFF_ONLY)?;

    let appointments = AppointmentService::new(&state)
        .doctor_appointments(&doctor_id)
        .await?;

    Ok(Json(json!({
        "success": true,
        "count": appointments.len(),
        "data": appointments
    })))
}

#[axum::debug_handler]
pub async fn get_patient_appointments(
    State(state): State<Arc<AppConfig>>,
    Query(query): Query<PatientQuery>,
) -> Result<Json<Value>, AppError> {
    let email = query
        .patient_email
        .filter(|e| !e.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("Patient email is required".to_string()))?;

    let appointments = AppointmentService::new(&state)
        .patient_appointments(email.trim())
        .await?;

    Ok(Json(json!({
        "success": true,
        "count": appointments.len(),
        "data": appointments
    })))
}

#[axum::debug_handler]
pub async fn update_status(
    State(state): State<Arc<AppConfig>>,
    Path(appointment_id): Path<String>,
    Extension(user): Extension<User>,
    Json(request): Json<StatusUpdateRequest>,
) -> Result<Json<Value>, AppError> {
    require_role(&user, &[ROLE_DOCTOR, ROLE_ADMIN], STAFF_ONLY)?;

    let appointment = AppointmentService::new(&state)
        .update_status(&appointment_id, request.status.as_deref())
        .await?;

    Ok(Json(json!({
        "success": true,
        "message": format!("Appointment status updated to {}", appointment.status),
        "data": appointment
    })))
}

#[axum::debug_handler]
pub async fn get_confirmation(
    State(state): State<Arc<AppConfig>>,
    Path(appointment_id): Path<String>,
    Query(query): Query<ConfirmationQuery>,
) -> Result<Response, AppError> {
    let (appointment, doctor) = AppointmentService::new(&state)
        .appointment_with_doctor(&appointment_id)
        .await?;
    let confirmation = build_confirmation(&appointment, &doctor);

    if query.format.as_deref() == Some("text") {
        let disposition = format!(
            "attachment; filename={}",
            attachment_filename(&confirmation.patient_name)
        );
        return Ok((
            [
                (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
                (header::CONTENT_DISPOSITION, disposition),
            ],
            render_text(&confirmation),
        )
            .into_response());
    }

    Ok(Json(json!({
        "success": true,
        "data": confirmation
    }))
    .into_response())
}
