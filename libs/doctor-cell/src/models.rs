use serde::{Deserialize, Serialize};
use serde_json::Value;
use chrono::{DateTime, Utc};
use thiserror::Error;

use shared_models::error::AppError;

pub const WEEKDAYS: [&str; 7] = [
    "monday", "tuesday", "wednesday", "thursday", "friday", "saturday", "sunday",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Doctor {
    pub id: String,
    #[serde(default)]
    pub user_id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub specialization: String,
    #[serde(default)]
    pub qualification: Vec<String>,
    #[serde(default)]
    pub experience: i32,
    #[serde(default)]
    pub fee: f64,
    #[serde(default)]
    pub profile: String,
    #[serde(default)]
    pub pmdc: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub clinic_address: Option<String>,
    #[serde(default)]
    pub verified: bool,
    #[serde(default)]
    pub verification_status: Option<String>,
    #[serde(default)]
    pub verification_details: Option<Value>,
    #[serde(default)]
    pub availability: Option<Value>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// One weekday of a doctor's schedule. Slots are ranges like `"09:00 AM - 12:00 PM"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayAvailability {
    #[serde(rename = "isAvailable")]
    pub is_available: bool,
    pub slots: Vec<String>,
}

impl DayAvailability {
    pub fn unavailable() -> Self {
        Self { is_available: false, slots: Vec::new() }
    }

    pub fn with_slots(slots: &[&str]) -> Self {
        Self {
            is_available: true,
            slots: slots.iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyAvailability {
    pub monday: DayAvailability,
    pub tuesday: DayAvailability,
    pub wednesday: DayAvailability,
    pub thursday: DayAvailability,
    pub friday: DayAvailability,
    pub saturday: DayAvailability,
    pub sunday: DayAvailability,
}

impl WeeklyAvailability {
    pub fn day(&self, key: &str) -> Option<&DayAvailability> {
        match key {
            "monday" => Some(&self.monday),
            "tuesday" => Some(&self.tuesday),
            "wednesday" => Some(&self.wednesday),
            "thursday" => Some(&self.thursday),
            "friday" => Some(&self.friday),
            "saturday" => Some(&self.saturday),
            "sunday" => Some(&self.sunday),
            _ => None,
        }
    }
}

/// Bookable times for one date, split at noon.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DaySlots {
    #[serde(rename = "morningSlots")]
    pub morning_slots: Vec<String>,
    #[serde(rename = "eveningSlots")]
    pub evening_slots: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DoctorQuery {
    pub specialization: Option<String>,
    pub qualification: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateDoctorRequest {
    pub name: Option<String>,
    pub specialization: Option<String>,
    #[serde(default)]
    pub qualification: Value,
    pub profile: Option<String>,
    #[serde(default)]
    pub experience: Option<Value>,
    #[serde(default)]
    pub fee: Option<Value>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub pmdc: Option<String>,
    pub bio: Option<String>,
    #[serde(alias = "clinicAddress")]
    pub clinic_address: Option<String>,
    pub availability: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateDoctorRequest {
    pub name: Option<String>,
    pub specialization: Option<String>,
    pub qualification: Option<Value>,
    pub experience: Option<Value>,
    pub fee: Option<Value>,
    #[serde(alias = "clinicAddress")]
    pub clinic_address: Option<String>,
    pub bio: Option<String>,
    pub phone: Option<String>,
    pub availability: Option<Value>,
}

/// Base64 image body. `image` may be a data URL, otherwise `content_type` names the MIME type.
#[derive(Debug, Clone, Deserialize)]
pub struct ProfileImageUpload {
    pub image: String,
    pub content_type: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AvailabilityUpdate {
    pub availability: Option<Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ServiceOffering {
    pub name: String,
    pub description: String,
}

#[derive(Debug, Error)]
pub enum DoctorError {
    #[error("Doctor not found")]
    NotFound,

    #[error("Doctor profile not found")]
    ProfileNotFound,

    #[error("No doctors found")]
    NoMatches,

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<anyhow::Error> for DoctorError {
    fn from(e: anyhow::Error) -> Self {
        DoctorError::Database(e.to_string())
    }
}

impl From<DoctorError> for AppError {
    fn from(e: DoctorError) -> Self {
        match e {
            DoctorError::NotFound | DoctorError::ProfileNotFound | DoctorError::NoMatches => {
                AppError::NotFound(e.to_string())
            }
            DoctorError::Forbidden(msg) => AppError::Forbidden(msg),
            DoctorError::Validation(msg) => AppError::BadRequest(msg),
            DoctorError::Database(msg) => AppError::Database(msg),
        }
    }
}
