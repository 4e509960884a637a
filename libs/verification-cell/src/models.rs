use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use doctor_cell::models::DoctorError;
use shared_models::error::AppError;

// ==============================================================================
// APPLICATIONS
// ==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    #[default]
    Pending,
    PendingApproval,
    Approved,
    Rejected,
    Suspicious,
}

impl ApplicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::PendingApproval => "pending_approval",
            ApplicationStatus::Approved => "approved",
            ApplicationStatus::Rejected => "rejected",
            ApplicationStatus::Suspicious => "suspicious",
        }
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApplicationDocuments {
    #[serde(default)]
    pub license: Option<String>,
    #[serde(default)]
    pub degree: Option<String>,
}

/// A doctor signup waiting in `unverified_doctors` for admin review.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoctorApplication {
    pub id: String,
    #[serde(default)]
    pub user_id: Option<String>,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub specialization: String,
    #[serde(default)]
    pub qualification: Vec<String>,
    #[serde(default)]
    pub experience: f64,
    #[serde(default)]
    pub fee: f64,
    #[serde(default)]
    pub pmdc: Option<String>,
    #[serde(default)]
    pub profile_photo: Option<String>,
    #[serde(default)]
    pub verification_status: ApplicationStatus,
    #[serde(default)]
    pub documents: ApplicationDocuments,
    #[serde(default)]
    pub submitted_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub reviewed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub admin_notes: Option<String>,
    #[serde(default)]
    pub ai_analysis_results: Option<Value>,
}

// ==============================================================================
// DOCUMENT AND REGISTRY CHECKS
// ==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    License,
    Degree,
}

impl DocumentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentKind::License => "license",
            DocumentKind::Degree => "degree",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    Verified,
    LikelyValid,
    PendingReview,
    Suspicious,
}

impl DocumentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentStatus::Verified => "verified",
            DocumentStatus::LikelyValid => "likely_valid",
            DocumentStatus::PendingReview => "pending_review",
            DocumentStatus::Suspicious => "suspicious",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentVerification {
    pub status: DocumentStatus,
    pub confidence: f64,
    pub method: String,
    pub document_type: DocumentKind,
    #[serde(default)]
    pub keyword_matches: Vec<String>,
    #[serde(default)]
    pub match_percentage: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pmdc_verification: Option<PmdcVerification>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PmdcStatus {
    Verified,
    Rejected,
    PendingReview,
}

/// Outcome of a PMDC registry lookup. Stored verbatim in the cache table and
/// inside an application's analysis results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PmdcVerification {
    pub pmdc_verified: bool,
    pub status: PmdcStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doctor_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub father_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license_status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registration_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registration_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid_until: Option<String>,
    pub verification_source: String,
    pub verification_time: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pmdc_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PmdcVerification {
    pub fn is_verified(&self) -> bool {
        self.pmdc_verified && self.status == PmdcStatus::Verified
    }
}

// ==============================================================================
// REQUESTS AND VIEWS
// ==============================================================================

/// Signup form. Documents are base64 payloads or data URLs.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegistrationRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub specialization: String,
    #[serde(default, alias = "qualifications")]
    pub qualification: Value,
    pub experience: Option<Value>,
    pub fee: Option<Value>,
    pub pmdc: Option<String>,
    pub license: Option<String>,
    pub degree: Option<String>,
    pub profile_photo: Option<String>,
    pub license_text: Option<String>,
    pub degree_text: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegistrationOutcome {
    pub auth_token: String,
    pub verification_status: ApplicationStatus,
    pub application_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReviewRequest {
    pub status: Option<String>,
    pub admin_notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PmdcCheckRequest {
    pub pmdc_number: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_users: usize,
    pub total_doctors: usize,
    pub pending_verifications: usize,
    pub pending_approval: usize,
    pub rejected_applications: usize,
    pub pmdc_verified_count: usize,
    pub recent_doctor_registrations: Vec<Value>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PmdcStats {
    pub total_verifications: usize,
    pub successful_verifications: usize,
    pub failed_verifications: usize,
    pub verification_rate: f64,
    pub recent_verifications: Vec<Value>,
}

// ==============================================================================
// ERRORS
// ==============================================================================

#[derive(Error, Debug)]
pub enum VerificationError {
    #[error("Application not found")]
    ApplicationNotFound,

    #[error("Doctor profile not found")]
    ProfileNotFound,

    #[error("Admin not found")]
    AdminNotFound,

    #[error("A user with this email already exists")]
    EmailTaken,

    #[error("Application has already been approved")]
    AlreadyApproved,

    #[error("{0}")]
    Validation(String),

    #[error("Password hashing failed: {0}")]
    Hashing(String),

    #[error("Token error: {0}")]
    Token(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<anyhow::Error> for VerificationError {
    fn from(e: anyhow::Error) -> Self {
        VerificationError::Database(e.to_string())
    }
}

impl From<DoctorError> for VerificationError {
    fn from(e: DoctorError) -> Self {
        match e {
            DoctorError::Validation(msg) => VerificationError::Validation(msg),
            DoctorError::NotFound | DoctorError::ProfileNotFound => VerificationError::ProfileNotFound,
            other => VerificationError::Database(other.to_string()),
        }
    }
}

impl From<VerificationError> for AppError {
    fn from(e: VerificationError) -> Self {
        match e {
            VerificationError::ApplicationNotFound
            | VerificationError::ProfileNotFound
            | VerificationError::AdminNotFound => AppError::NotFound(e.to_string()),
            VerificationError::EmailTaken | VerificationError::AlreadyApproved => AppError::Conflict(e.to_string()),
            VerificationError::Validation(msg) => AppError::BadRequest(msg),
            VerificationError::Hashing(msg) | VerificationError::Token(msg) => AppError::Internal(msg),
            VerificationError::Database(msg) => AppError::Database(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn application_row_with_sparse_fields() {
        let application: DoctorApplication = serde_json::from_value(json!({
            "id": "app-1",
            "name": "Dr. Bilal Ahmed",
            "email": "bilal@clinic.pk",
            "verification_status": "pending_approval"
        }))
        .unwrap();

        assert_eq!(application.verification_status, ApplicationStatus::PendingApproval);
        assert!(application.documents.license.is_none());
        assert!(application.ai_analysis_results.is_none());
    }

    #[test]
    fn statuses_serialize_snake_case() {
        assert_eq!(serde_json::to_value(ApplicationStatus::PendingApproval).unwrap(), "pending_approval");
        assert_eq!(serde_json::to_value(DocumentStatus::LikelyValid).unwrap(), "likely_valid");
        assert_eq!(serde_json::to_value(PmdcStatus::PendingReview).unwrap(), "pending_review");
    }

    #[test]
    fn email_taken_is_conflict() {
        let err: AppError = VerificationError::EmailTaken.into();
        assert_eq!(err.status_code(), axum::http::StatusCode::CONFLICT);
    }
}
