use chrono::Utc;
use serde_json::{json, Value};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use auth_cell::models::Account;
use auth_cell::services::password::PasswordService;
use doctor_cell::services::doctor::{non_negative_number, DoctorService};
use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;
use shared_models::auth::{User, ROLE_DOCTOR};
use shared_utils::jwt::issue_token;
use shared_utils::validation::{is_valid_email, is_valid_phone, split_list};

use crate::models::{
    ApplicationStatus, DoctorApplication, DocumentKind, DocumentStatus, RegistrationOutcome,
    RegistrationRequest, VerificationError,
};
use crate::services::documents::{decode_document, fallback_check, DecodedDocument, DocumentVerificationClient};
use crate::services::pmdc::PmdcClient;
use crate::services::scoring::{extract_pmdc_number, overall_status, score_document};

/// A signup that passed input checks, with its documents decoded.
#[derive(Debug)]
pub struct ValidRegistration {
    pub qualification: Vec<String>,
    pub experience: f64,
    pub fee: f64,
    pub license: DecodedDocument,
    pub degree: DecodedDocument,
    pub profile_photo: DecodedDocument,
}

fn required_number(value: Option<&Value>, field: &str) -> Result<f64, VerificationError> {
    let missing = match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        _ => false,
    };
    if missing {
        return Err(VerificationError::Validation(format!("{} must be a number", field)));
    }
    Ok(non_negative_number(value, field)?)
}

fn required_document(payload: &Option<String>) -> Result<DecodedDocument, VerificationError> {
    match payload.as_deref().map(str::trim).filter(|p| !p.is_empty()) {
        Some(payload) => decode_document(payload),
        None => Err(VerificationError::Validation("Required documents are missing".to_string())),
    }
}

fn invalid(message: &str) -> VerificationError {
    VerificationError::Validation(message.to_string())
}

pub fn validate_registration(request: &RegistrationRequest) -> Result<ValidRegistration, VerificationError> {
    if request.name.trim().chars().count() < 3 {
        return Err(invalid("Name must be at least 3 characters long"));
    }
    if !is_valid_email(&request.email) {
        return Err(invalid("Enter a valid email"));
    }
    if !is_valid_phone(&request.phone) {
        return Err(invalid("Phone number must be valid"));
    }
    if request.password.chars().count() < 6 {
        return Err(invalid("Password must be at least 6 characters long"));
    }
    if request.specialization.trim().is_empty() {
        return Err(invalid("Specialization is required"));
    }

    let experience = required_number(request.experience.as_ref(), "Experience")?;
    let fee = required_number(request.fee.as_ref(), "Fee")?;

    Ok(ValidRegistration {
        qualification: split_list(&request.qualification),
        experience,
        fee,
        license: required_document(&request.license)?,
        degree: required_document(&request.degree)?,
        profile_photo: required_document(&request.profile_photo)?,
    })
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Suspicious analyses are parked apart from the regular queue.
pub fn initial_status(analysis: &Value) -> ApplicationStatus {
    if analysis["status"].as_str() == Some(DocumentStatus::Suspicious.as_str()) {
        ApplicationStatus::Suspicious
    } else {
        ApplicationStatus::Pending
    }
}

pub struct RegistrationService {
    supabase: SupabaseClient,
    doctors: DoctorService,
    documents: DocumentVerificationClient,
    pmdc: PmdcClient,
    jwt_secret: String,
    ttl_hours: i64,
}

impl RegistrationService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
            doctors: DoctorService::new(config),
            documents: DocumentVerificationClient::new(config),
            pmdc: PmdcClient::new(config),
            jwt_secret: config.jwt_secret.clone(),
            ttl_hours: config.jwt_expiry_hours,
        }
    }

    pub async fn register(&self, request: &RegistrationRequest) -> Result<RegistrationOutcome, VerificationError> {
        let valid = validate_registration(request)?;
        let email = request.email.trim();

        let existing: Option<Value> = self.supabase
            .select_one("users", &format!("select=id&email=eq.{}", urlencoding::encode(email)))
            .await?;
        if existing.is_some() {
            return Err(VerificationError::EmailTaken);
        }

        let analysis = self.analyze(request).await;

        let password_hash = PasswordService::hash_password(&request.password)
            .map_err(|e| VerificationError::Hashing(e.to_string()))?;

        // Uploads go first so a storage failure leaves no account behind.
        let license = self.upload("documents", "license", valid.license).await?;
        let degree = self.upload("documents", "degree", valid.degree).await?;
        let profile_photo = self.upload("profiles", "profile", valid.profile_photo).await?;

        let account: Account = self.supabase.insert("users", json!({
            "name": request.name.trim(),
            "email": email,
            "password": password_hash,
            "role": ROLE_DOCTOR
        })).await?;

        let status = initial_status(&analysis);
        let inserted = self.supabase.insert::<DoctorApplication>("unverified_doctors", json!({
            "user_id": account.id,
            "name": request.name.trim(),
            "email": email,
            "phone": request.phone.trim(),
            "specialization": request.specialization.trim(),
            "qualification": valid.qualification,
            "experience": valid.experience,
            "fee": valid.fee,
            "pmdc": non_blank(&request.pmdc),
            "profile_photo": profile_photo,
            "verification_status": status,
            "documents": { "license": license, "degree": degree },
            "submitted_at": Utc::now(),
            "ai_analysis_results": analysis
        })).await;

        let application = match inserted {
            Ok(application) => application,
            Err(e) => {
                self.discard_account(&account.id).await;
                return Err(e.into());
            }
        };

        let auth_token = issue_token(&account.id, Some(email), ROLE_DOCTOR, &self.jwt_secret, self.ttl_hours)
            .map_err(VerificationError::Token)?;

        info!("Doctor application {} submitted ({})", application.id, status);

        Ok(RegistrationOutcome {
            auth_token,
            verification_status: status,
            application_id: application.id,
        })
    }

    async fn discard_account(&self, user_id: &str) {
        let filter = format!("id=eq.{}", urlencoding::encode(user_id));
        match self.supabase.delete("users", &filter).await {
            Ok(_) => warn!("Removed account {} after failed application insert", user_id),
            Err(e) => error!("Could not remove account {} after failed registration: {}", user_id, e),
        }
    }

    /// Pre-submission check: the verification service's verdict, or a holding response.
    pub async fn check_documents(&self, request: &RegistrationRequest) -> Result<Value, VerificationError> {
        if [&request.license, &request.degree, &request.profile_photo]
            .iter()
            .any(|doc| non_blank(doc).is_none())
        {
            return Err(VerificationError::Validation("Required documents are missing".to_string()));
        }

        match self.documents.verify_doctor(request).await {
            Ok(result) => Ok(result),
            Err(e) => {
                warn!("Verification service unavailable, using fallback: {}", e);
                Ok(fallback_check(request))
            }
        }
    }

    /// The external service's analysis, falling back to local scoring of supplied text.
    pub async fn analyze(&self, request: &RegistrationRequest) -> Value {
        match self.documents.verify_doctor(request).await {
            Ok(result) => result,
            Err(e) => {
                warn!("Verification service unavailable, analyzing locally: {}", e);
                self.local_analysis(request).await
            }
        }
    }

    pub async fn local_analysis(&self, request: &RegistrationRequest) -> Value {
        let license_text = non_blank(&request.license_text);
        let degree_text = non_blank(&request.degree_text);

        if license_text.is_none() && degree_text.is_none() {
            return fallback_check(request);
        }

        let mut license = score_document(license_text.unwrap_or_default(), DocumentKind::License);
        let degree = score_document(degree_text.unwrap_or_default(), DocumentKind::Degree);

        let pmdc_number = non_blank(&request.pmdc)
            .map(str::to_string)
            .or_else(|| license_text.and_then(extract_pmdc_number));

        if let Some(number) = pmdc_number {
            debug!("Checking PMDC #{} during registration", number);
            let registry = self.pmdc.verify(&number).await;
            if registry.is_verified() {
                license.status = DocumentStatus::Verified;
                license.confidence = 0.95;
                license.method = "pmdc_api_verification".to_string();
            }
            license.pmdc_verification = Some(registry);
        }

        let status = overall_status(&[&license, &degree]);

        json!({
            "success": true,
            "status": status,
            "message": "Documents have been analyzed and will be reviewed by our team.",
            "verification_results": {
                "license": license,
                "degree": degree
            }
        })
    }

    /// Verification standing of the calling doctor account.
    pub async fn status_for(&self, user: &User) -> Result<Value, VerificationError> {
        if let Some(doctor) = self.doctors.find_by_user_id(&user.id).await? {
            if doctor.verified {
                return Ok(json!({
                    "verification_status": ApplicationStatus::Approved,
                    "verification_details": doctor.verification_details
                }));
            }
        }

        let application: DoctorApplication = self.supabase
            .select_one(
                "unverified_doctors",
                &format!("user_id=eq.{}&order=submitted_at.desc", urlencoding::encode(&user.id)),
            )
            .await?
            .ok_or(VerificationError::ProfileNotFound)?;

        Ok(json!({
            "verification_status": application.verification_status,
            "verification_details": application.ai_analysis_results
        }))
    }

    async fn upload(&self, folder: &str, label: &str, document: DecodedDocument) -> Result<String, VerificationError> {
        let object_path = format!("{}/{}-{}.{}", folder, label, Uuid::new_v4(), document.extension);
        Ok(self.supabase
            .upload_object(&object_path, document.bytes, &document.content_type)
            .await?)
    }
}
