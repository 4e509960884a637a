use serde_json::{json, Value};
use tracing::{debug, info, warn};

use doctor_cell::services::doctor::DoctorService;
use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;
use shared_models::auth::{User, ROLE_ADMIN, ROLE_DOCTOR};
use shared_utils::jwt::issue_token;
use shared_utils::validation::is_valid_email;

use crate::models::{Account, AuthError, DoctorStanding, LoginRequest, LoginResponse, LoginUser};
use crate::services::password::PasswordService;

const REJECTED: &str = "rejected";

pub fn validate_login(request: &LoginRequest) -> Result<(), AuthError> {
    if !is_valid_email(&request.email) {
        return Err(AuthError::Validation("Enter a valid email".to_string()));
    }
    if request.password.trim().is_empty() {
        return Err(AuthError::Validation("Password cannot be blank".to_string()));
    }
    Ok(())
}

fn password_matches(password: &str, hash: &str) -> bool {
    PasswordService::verify_password(password, hash).unwrap_or_else(|e| {
        warn!("Stored password hash could not be read: {}", e);
        false
    })
}

fn email_filter(email: &str) -> String {
    format!("email=eq.{}", urlencoding::encode(email))
}

fn id_filter(id: &str) -> String {
    format!("id=eq.{}", urlencoding::encode(id))
}

pub struct LoginService {
    supabase: SupabaseClient,
    doctors: DoctorService,
    jwt_secret: String,
    ttl_hours: i64,
}

impl LoginService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
            doctors: DoctorService::new(config),
            jwt_secret: config.jwt_secret.clone(),
            ttl_hours: config.jwt_expiry_hours,
        }
    }

    pub async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, AuthError> {
        validate_login(request)?;
        let email = request.email.trim();

        match request.role.as_str() {
            ROLE_ADMIN => self.login_admin(email, &request.password).await,
            ROLE_DOCTOR => self.login_doctor(email, &request.password).await,
            other => {
                debug!("Login attempted with role {:?}", other);
                Err(AuthError::InvalidRole("Invalid role specified".to_string()))
            }
        }
    }

    async fn login_admin(&self, email: &str, password: &str) -> Result<LoginResponse, AuthError> {
        let admin: Account = self.supabase
            .select_one("admins", &email_filter(email))
            .await?
            .ok_or(AuthError::InvalidAdminCredentials)?;

        if !password_matches(password, &admin.password) {
            return Err(AuthError::InvalidAdminCredentials);
        }

        let auth_token = self.token_for(&admin.id, &admin.email, ROLE_ADMIN)?;
        info!("Admin {} logged in", admin.id);

        Ok(LoginResponse {
            success: true,
            auth_token,
            user: Some(LoginUser {
                name: admin.name,
                email: admin.email,
                role: ROLE_ADMIN.to_string(),
            }),
            verification_status: None,
            doctor_id: None,
            user_id: None,
        })
    }

    async fn login_doctor(&self, email: &str, password: &str) -> Result<LoginResponse, AuthError> {
        let account: Account = self.supabase
            .select_one("users", &email_filter(email))
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !password_matches(password, &account.password) {
            return Err(AuthError::InvalidCredentials);
        }
        if account.role.as_deref() != Some(ROLE_DOCTOR) {
            return Err(AuthError::NotDoctor);
        }

        let standing = self.doctor_standing(&account.email).await?;
        if standing.verification_status == REJECTED {
            return Err(AuthError::Rejected);
        }

        let auth_token = self.token_for(&account.id, &account.email, ROLE_DOCTOR)?;
        info!("Doctor account {} logged in ({})", account.id, standing.verification_status);

        Ok(LoginResponse {
            success: true,
            auth_token,
            user: None,
            verification_status: Some(standing.verification_status),
            doctor_id: Some(standing.profile_id),
            user_id: Some(account.id),
        })
    }

    /// Directory entry first, then the application queue.
    pub async fn doctor_standing(&self, email: &str) -> Result<DoctorStanding, AuthError> {
        if let Some(doctor) = self.doctors.find_by_email(email).await? {
            return Ok(DoctorStanding {
                profile_id: doctor.id.clone(),
                verification_status: "approved".to_string(),
                profile: serde_json::to_value(&doctor).unwrap_or(Value::Null),
            });
        }

        let application: Value = self.supabase
            .select_one("unverified_doctors", &email_filter(email))
            .await?
            .ok_or(AuthError::ProfileNotFound)?;

        Ok(DoctorStanding {
            profile_id: application["id"].as_str().unwrap_or_default().to_string(),
            verification_status: application["verification_status"]
                .as_str()
                .filter(|s| !s.is_empty())
                .unwrap_or("pending")
                .to_string(),
            profile: application,
        })
    }

    /// The caller's account record, without its password hash.
    pub async fn current_user(&self, user: &User) -> Result<Value, AuthError> {
        if user.is_admin() {
            let admin: Account = self.supabase
                .select_one("admins", &id_filter(&user.id))
                .await?
                .ok_or_else(|| AuthError::AccountNotFound("Admin not found".to_string()))?;

            let mut record = serde_json::to_value(&admin).unwrap_or_else(|_| json!({}));
            record["role"] = json!(ROLE_ADMIN);
            return Ok(record);
        }

        if user.is_doctor() {
            let account: Account = self.supabase
                .select_one("users", &id_filter(&user.id))
                .await?
                .ok_or_else(|| AuthError::AccountNotFound("User not found".to_string()))?;

            let standing = self.doctor_standing(&account.email).await?;

            let mut record = serde_json::to_value(&account).unwrap_or_else(|_| json!({}));
            record["role"] = json!(ROLE_DOCTOR);
            record["doctor_profile"] = standing.profile;
            record["verification_status"] = json!(standing.verification_status);
            return Ok(record);
        }

        Err(AuthError::InvalidRole("Invalid role".to_string()))
    }

    fn token_for(&self, subject: &str, email: &str, role: &str) -> Result<String, AuthError> {
        issue_token(subject, Some(email), role, &self.jwt_secret, self.ttl_hours)
            .map_err(AuthError::Token)
    }
}
