use std::sync::Arc;
use serde_json::{json, Value};
use uuid::Uuid;
use chrono::Utc;

use shared_config::AppConfig;
use shared_models::auth::User;

use crate::jwt::issue_token;

pub const TEST_JWT_SECRET: &str = "test-secret-key-for-jwt-validation-must-be-long-enough";

pub struct TestConfig {
    pub jwt_secret: String,
    pub base_url: String,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            jwt_secret: TEST_JWT_SECRET.to_string(),
            base_url: "http://localhost:54321".to_string(),
        }
    }
}

impl TestConfig {
    /// Config whose store and external services all point at `base_url` (usually a mock server).
    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            ..Self::default()
        }
    }

    pub fn to_app_config(&self) -> AppConfig {
        AppConfig::for_base_url(&self.base_url, &self.jwt_secret)
    }

    pub fn to_arc(&self) -> Arc<AppConfig> {
        Arc::new(self.to_app_config())
    }
}

pub struct TestUser {
    pub id: String,
    pub email: String,
    pub role: String,
}

impl Default for TestUser {
    fn default() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            email: "test@example.com".to_string(),
            role: "user".to_string(),
        }
    }
}

impl TestUser {
    pub fn new(email: &str, role: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            email: email.to_string(),
            role: role.to_string(),
        }
    }

    pub fn with_id(mut self, id: &str) -> Self {
        self.id = id.to_string();
        self
    }

    pub fn doctor(email: &str) -> Self {
        Self::new(email, "doctor")
    }

    pub fn patient(email: &str) -> Self {
        Self::new(email, "user")
    }

    pub fn admin(email: &str) -> Self {
        Self::new(email, "admin")
    }

    pub fn to_user(&self) -> User {
        User {
            id: self.id.clone(),
            email: Some(self.email.clone()),
            role: Some(self.role.clone()),
            created_at: Some(Utc::now()),
        }
    }
}

pub struct JwtTestUtils;

impl JwtTestUtils {
    pub fn create_test_token(user: &TestUser, secret: &str, exp_hours: Option<i64>) -> String {
        issue_token(&user.id, Some(&user.email), &user.role, secret, exp_hours.unwrap_or(24))
            .expect("test token")
    }

    pub fn bearer(user: &TestUser) -> String {
        format!("Bearer {}", Self::create_test_token(user, TEST_JWT_SECRET, None))
    }

    pub fn create_expired_token(user: &TestUser, secret: &str) -> String {
        Self::create_test_token(user, secret, Some(-1))
    }

    pub fn create_invalid_signature_token(user: &TestUser) -> String {
        Self::create_test_token(user, "wrong-secret", Some(24))
    }

    pub fn create_malformed_token() -> String {
        "invalid.token.format".to_string()
    }
}

/// Canned store rows matching the shapes the cells read and write.
pub struct MockStoreResponses;

impl MockStoreResponses {
    pub fn doctor_row(doctor_id: &str, user_id: Option<&str>) -> Value {
        json!({
            "id": doctor_id,
            "user_id": user_id,
            "name": "Dr. Ayesha Khan",
            "email": "ayesha@clinic.pk",
            "phone": "+92 300 1234567",
            "specialization": "Cardiologist",
            "qualification": ["MBBS", "FCPS Cardiology"],
            "experience": 12,
            "fee": 2500,
            "profile": "uploads/profiles/ayesha.png",
            "pmdc": "12345-P",
            "bio": "Interventional cardiologist",
            "clinic_address": "Blue Area, Islamabad",
            "verified": true,
            "availability": Self::weekday_availability(),
            "created_at": "2024-01-01T00:00:00Z"
        })
    }

    /// Monday to Friday mornings and evenings, weekends off.
    pub fn weekday_availability() -> Value {
        let working = json!({ "isAvailable": true, "slots": ["09:00 AM - 12:00 PM", "05:00 PM - 07:00 PM"] });
        let off = json!({ "isAvailable": false, "slots": [] });
        json!({
            "monday": working,
            "tuesday": working,
            "wednesday": working,
            "thursday": working,
            "friday": working,
            "saturday": off,
            "sunday": off
        })
    }

    pub fn appointment_row(appointment_id: &str, doctor_id: &str, date: &str, time: &str, status: &str) -> Value {
        json!({
            "id": appointment_id,
            "doctor_id": doctor_id,
            "patient_name": "Ali Raza",
            "patient_email": "ali@example.com",
            "patient_phone": "03001234567",
            "appointment_date": date,
            "appointment_time": time,
            "reason": "Chest pain",
            "status": status,
            "notes": "",
            "created_at": "2026-01-05T10:00:00Z"
        })
    }

    pub fn application_row(application_id: &str, user_id: &str, status: &str) -> Value {
        json!({
            "id": application_id,
            "user_id": user_id,
            "name": "Dr. Bilal Ahmed",
            "email": "bilal@clinic.pk",
            "phone": "03211234567",
            "specialization": "Dermatologist",
            "qualification": ["MBBS"],
            "experience": 4,
            "fee": 1500,
            "pmdc": "54321-P",
            "profile_photo": "uploads/profiles/bilal.png",
            "verification_status": status,
            "documents": {
                "license": "uploads/documents/license.pdf",
                "degree": "uploads/documents/degree.pdf"
            },
            "ai_analysis_results": null,
            "admin_notes": null,
            "submitted_at": "2026-01-02T09:00:00Z",
            "reviewed_at": null
        })
    }

    pub fn user_row(user_id: &str, email: &str, role: &str, password_hash: &str) -> Value {
        json!({
            "id": user_id,
            "name": "Test User",
            "email": email,
            "password": password_hash,
            "role": role,
            "created_at": "2026-01-01T00:00:00Z"
        })
    }

    pub fn admin_row(admin_id: &str, email: &str, password_hash: &str) -> Value {
        json!({
            "id": admin_id,
            "name": "Site Admin",
            "email": email,
            "password": password_hash,
            "created_at": "2026-01-01T00:00:00Z"
        })
    }

    pub fn error_response(message: &str, code: &str) -> Value {
        json!({
            "message": message,
            "code": code
        })
    }
}
