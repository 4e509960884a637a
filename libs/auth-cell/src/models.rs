use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use doctor_cell::models::DoctorError;
use shared_models::error::AppError;

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub role: String,
}

/// A row of `users` or `admins`. The password hash is never serialized back out.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing)]
    pub password: String,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginUser {
    pub name: String,
    pub email: String,
    pub role: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    pub success: bool,
    #[serde(rename = "authToken")]
    pub auth_token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<LoginUser>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verification_status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doctor_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

/// Where a doctor account stands: a directory entry or a pending application.
#[derive(Debug, Clone)]
pub struct DoctorStanding {
    pub profile_id: String,
    pub verification_status: String,
    pub profile: Value,
}

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("{0}")]
    Validation(String),

    #[error("Invalid admin credentials")]
    InvalidAdminCredentials,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("You're not registered as a doctor")]
    NotDoctor,

    #[error("Doctor profile not found")]
    ProfileNotFound,

    #[error("Your application has been rejected")]
    Rejected,

    #[error("{0}")]
    InvalidRole(String),

    #[error("{0}")]
    AccountNotFound(String),

    #[error("Token error: {0}")]
    Token(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<anyhow::Error> for AuthError {
    fn from(e: anyhow::Error) -> Self {
        AuthError::Database(e.to_string())
    }
}

impl From<DoctorError> for AuthError {
    fn from(e: DoctorError) -> Self {
        AuthError::Database(e.to_string())
    }
}

impl From<AuthError> for AppError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::InvalidAdminCredentials | AuthError::InvalidCredentials => {
                AppError::Auth(e.to_string())
            }
            AuthError::ProfileNotFound => AppError::NotFound(e.to_string()),
            AuthError::AccountNotFound(msg) => AppError::NotFound(msg),
            AuthError::Rejected => AppError::Forbidden(e.to_string()),
            AuthError::NotDoctor => AppError::BadRequest(e.to_string()),
            AuthError::Validation(msg) | AuthError::InvalidRole(msg) => AppError::BadRequest(msg),
            AuthError::Token(msg) => AppError::Internal(msg),
            AuthError::Database(msg) => AppError::Database(msg),
        }
    }
}
