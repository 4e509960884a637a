use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use doctor_cell::models::DoctorError;
use shared_models::error::AppError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum AppointmentStatus {
    Scheduled,
    Completed,
    Cancelled,
    NoShow,
}

impl AppointmentStatus {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "scheduled" => Some(Self::Scheduled),
            "completed" => Some(Self::Completed),
            "cancelled" => Some(Self::Cancelled),
            "no-show" => Some(Self::NoShow),
            _ => None,
        }
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentStatus::Scheduled => write!(f, "scheduled"),
            AppointmentStatus::Completed => write!(f, "completed"),
            AppointmentStatus::Cancelled => write!(f, "cancelled"),
            AppointmentStatus::NoShow => write!(f, "no-show"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: String,
    pub doctor_id: String,
    pub patient_name: String,
    pub patient_email: String,
    #[serde(default)]
    pub patient_phone: String,
    pub appointment_date: NaiveDate,
    pub appointment_time: String,
    #[serde(default)]
    pub reason: String,
    pub status: AppointmentStatus,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Booking body. Camel-case aliases match what the booking page sends.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookAppointmentRequest {
    pub doctor_id: Option<String>,
    #[serde(alias = "appointmentDate")]
    pub appointment_date: Option<String>,
    #[serde(alias = "appointmentTime")]
    pub appointment_time: Option<String>,
    pub reason: Option<String>,
    pub notes: Option<String>,
    pub patient_name: Option<String>,
    pub patient_email: Option<String>,
    pub patient_phone: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatusUpdateRequest {
    pub status: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PatientQuery {
    pub patient_email: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConfirmationQuery {
    pub format: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoctorSummary {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub specialization: String,
    #[serde(default)]
    pub profile: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PatientAppointment {
    #[serde(flatten)]
    pub appointment: Appointment,
    pub doctor: Option<DoctorSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Confirmation {
    pub reference: String,
    pub doctor_name: String,
    pub doctor_specialty: String,
    pub patient_name: String,
    pub patient_email: String,
    pub patient_phone: String,
    pub appointment_date: NaiveDate,
    pub formatted_date: String,
    pub time: String,
    pub reason: String,
    pub status: AppointmentStatus,
    pub fee: f64,
    pub clinic_address: Option<String>,
    pub notes: Option<String>,
}

/// ISO-8601 date, or a date-time whose date part is used.
pub fn parse_appointment_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();

    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(text).ok().map(|dt| dt.date_naive()))
        .or_else(|| {
            NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|dt| dt.date())
        })
}

#[derive(Debug, Error)]
pub enum AppointmentError {
    #[error("Appointment not found")]
    NotFound,

    #[error("Doctor not found")]
    DoctorNotFound,

    #[error("This time slot is no longer available")]
    SlotTaken,

    #[error("Invalid date format")]
    InvalidDate,

    #[error("Valid status is required (scheduled, completed, cancelled, or no-show)")]
    InvalidStatus,

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<anyhow::Error> for AppointmentError {
    fn from(e: anyhow::Error) -> Self {
        AppointmentError::Database(e.to_string())
    }
}

impl From<DoctorError> for AppointmentError {
    fn from(e: DoctorError) -> Self {
        match e {
            DoctorError::NotFound | DoctorError::ProfileNotFound => AppointmentError::DoctorNotFound,
            DoctorError::NoMatches => AppointmentError::DoctorNotFound,
            DoctorError::Forbidden(msg) => AppointmentError::Forbidden(msg),
            DoctorError::Validation(msg) => AppointmentError::Validation(msg),
            DoctorError::Database(msg) => AppointmentError::Database(msg),
        }
    }
}

impl From<AppointmentError> for AppError {
    fn from(e: AppointmentError) -> Self {
        match e {
            AppointmentError::NotFound | AppointmentError::DoctorNotFound => {
                AppError::NotFound(e.to_string())
            }
            AppointmentError::SlotTaken => AppError::Conflict(e.to_string()),
            AppointmentError::InvalidDate | AppointmentError::InvalidStatus => {
                AppError::BadRequest(e.to_string())
            }
            AppointmentError::Validation(msg) => AppError::ValidationError(msg),
            AppointmentError::Forbidden(msg) => AppError::Forbidden(msg),
            AppointmentError::Database(msg) => AppError::Database(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trip_uses_kebab_case() {
        assert_eq!(AppointmentStatus::parse("no-show"), Some(AppointmentStatus::NoShow));
        assert_eq!(AppointmentStatus::parse("no_show"), None);
        assert_eq!(serde_json::to_value(AppointmentStatus::NoShow).unwrap(), "no-show");
        assert_eq!(AppointmentStatus::Cancelled.to_string(), "cancelled");
    }

    #[test]
    fn dates_accept_date_or_datetime() {
        let expected = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
        assert_eq!(parse_appointment_date("2026-01-05"), Some(expected));
        assert_eq!(parse_appointment_date("2026-01-05T10:00:00Z"), Some(expected));
        assert_eq!(parse_appointment_date("2026-01-05T10:00:00.000"), Some(expected));
        assert_eq!(parse_appointment_date("05/01/2026"), None);
        assert_eq!(parse_appointment_date("2026-02-30"), None);
    }

    #[test]
    fn slot_conflict_maps_to_409() {
        let app_error: AppError = AppointmentError::SlotTaken.into();
        assert_eq!(app_error.status_code(), axum::http::StatusCode::CONFLICT);
    }
}
