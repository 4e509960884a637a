use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use chrono::{Datelike, Utc};
use serde_json::{json, Map, Value};
use tracing::{debug, info, warn};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::auth::User;
use shared_utils::validation::split_list;

use crate::models::{
    Doctor, DoctorError, ProfileImageUpload, ServiceOffering, UpdateDoctorRequest,
    WeeklyAvailability,
};
use crate::services::doctor::{non_negative_number, DoctorService};

pub const MAX_PROFILE_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// The caller must own the doctor record. Records without a `user_id` are let through.
pub fn ensure_owner(doctor: &Doctor, user: &User, denied: &str) -> Result<(), DoctorError> {
    match doctor.user_id.as_deref() {
        None => {
            warn!("Doctor {} has no user_id, skipping ownership check", doctor.id);
            Ok(())
        }
        Some(owner) if owner == user.id => Ok(()),
        Some(_) => Err(DoctorError::Forbidden(denied.to_string())),
    }
}

pub fn services_for_specialty(specialty: &str) -> [&'static str; 6] {
    let specialty = specialty.to_lowercase();

    if specialty.contains("cardio") {
        ["Cardiac Consultation", "ECG Analysis", "Heart Disease Management",
         "Blood Pressure Management", "Cholesterol Management", "Heart Failure Treatment"]
    } else if specialty.contains("derma") {
        ["Skin Disease Diagnosis", "Acne Treatment", "Eczema Management",
         "Skin Cancer Screening", "Psoriasis Treatment", "Cosmetic Consultation"]
    } else if specialty.contains("ortho") {
        ["Joint Pain Treatment", "Fracture Management", "Sports Injuries",
         "Arthritis Treatment", "Back Pain Management", "Rehabilitation Planning"]
    } else if specialty.contains("gastro") {
        ["Digestive Problem Diagnosis", "Colonoscopy", "IBS Management",
         "Liver Disease Treatment", "Acid Reflux Treatment", "Stomach Pain Diagnosis"]
    } else if specialty.contains("neuro") {
        ["Headache Treatment", "Seizure Management", "Stroke Rehabilitation",
         "Memory Disorder Evaluation", "Nerve Pain Treatment", "Movement Disorder Management"]
    } else if specialty.contains("eye") || specialty.contains("ophthal") {
        ["Vision Testing", "Eye Disease Diagnosis", "Glaucoma Screening",
         "Cataract Evaluation", "LASIK Consultation", "Contact Lens Fitting"]
    } else if specialty.contains("dent") {
        ["Dental Check-up", "Teeth Cleaning", "Cavity Treatment",
         "Root Canal", "Teeth Whitening", "Dental Emergency Care"]
    } else {
        ["General Consultation", "Preventive Health Check", "Chronic Disease Management",
         "Vaccination Services", "Health Screening", "Medical Certificates"]
    }
}

pub fn service_description(service: &str) -> &'static str {
    match service {
        "Cardiac Consultation" => "Comprehensive evaluation of heart health and cardiovascular system.",
        "ECG Analysis" => "Interpretation of electrocardiogram results to detect heart abnormalities.",
        "Heart Disease Management" => "Ongoing care and treatment plans for patients with heart conditions.",
        "Blood Pressure Management" => "Monitoring and treatment strategies for hypertension.",
        "Cholesterol Management" => "Assessment and treatment of cholesterol levels to reduce heart disease risk.",
        "Heart Failure Treatment" => "Specialized care for patients with heart failure conditions.",
        "Skin Disease Diagnosis" => "Identification and treatment plans for various skin conditions.",
        "Acne Treatment" => "Personalized treatment options for acne and related skin issues.",
        "Eczema Management" => "Care plans for managing eczema symptoms and flare-ups.",
        "Skin Cancer Screening" => "Examination of suspicious skin lesions for early cancer detection.",
        "Psoriasis Treatment" => "Treatment options for managing psoriasis symptoms.",
        "Cosmetic Consultation" => "Advice on cosmetic procedures for skin enhancement.",
        "General Consultation" => "Comprehensive medical evaluation, diagnosis and treatment planning.",
        "Preventive Health Check" => "Regular screening to detect potential health issues before they become serious.",
        "Chronic Disease Management" => "Ongoing care for long-term health conditions with regular monitoring.",
        "Vaccination Services" => "Protection against common infectious diseases through immunization.",
        "Health Screening" => "Comprehensive tests to evaluate overall health status and identify risk factors.",
        "Medical Certificates" => "Official documentation for work, school, or travel purposes.",
        _ => "Professional medical care provided by our experienced healthcare team.",
    }
}

pub fn service_offerings(specialty: &str) -> Vec<ServiceOffering> {
    services_for_specialty(specialty)
        .iter()
        .map(|name| ServiceOffering {
            name: name.to_string(),
            description: service_description(name).to_string(),
        })
        .collect()
}

pub fn initials(name: &str) -> String {
    let letters: String = name
        .split_whitespace()
        .filter_map(|word| word.chars().next())
        .take(2)
        .collect();

    if letters.is_empty() {
        "DR".to_string()
    } else {
        letters.to_uppercase()
    }
}

pub fn career_start_year(experience: i32, current_year: i32) -> i32 {
    if experience <= 0 {
        current_year - 5
    } else {
        current_year - experience
    }
}

/// Public profile with the derived fields the profile page shows.
pub fn profile_view(doctor: &Doctor) -> Value {
    let mut view = serde_json::to_value(doctor).unwrap_or_else(|_| json!({}));
    if let Value::Object(map) = &mut view {
        map.insert("services".to_string(), json!(service_offerings(&doctor.specialization)));
        map.insert("initials".to_string(), json!(initials(&doctor.name)));
        map.insert(
            "career_start_year".to_string(),
            json!(career_start_year(doctor.experience, Utc::now().year())),
        );
    }
    view
}

/// Decoded upload ready for storage.
#[derive(Debug)]
pub struct DecodedImage {
    pub bytes: Vec<u8>,
    pub content_type: String,
    pub extension: String,
}

pub fn decode_image(upload: &ProfileImageUpload) -> Result<DecodedImage, DoctorError> {
    let (content_type, payload) = match upload.image.strip_prefix("data:") {
        Some(rest) => {
            let (meta, data) = rest
                .split_once(',')
                .ok_or_else(|| DoctorError::Validation("Malformed data URL".to_string()))?;
            let mime = meta.strip_suffix(";base64").unwrap_or(meta);
            (mime.to_string(), data)
        }
        None => (
            upload.content_type.clone().unwrap_or_default(),
            upload.image.as_str(),
        ),
    };

    if payload.trim().is_empty() {
        return Err(DoctorError::Validation("No image file uploaded".to_string()));
    }
    if !content_type.starts_with("image/") {
        return Err(DoctorError::Validation("Only image files are allowed.".to_string()));
    }

    let bytes = BASE64
        .decode(payload.trim())
        .map_err(|_| DoctorError::Validation("Image is not valid base64".to_string()))?;

    if bytes.len() > MAX_PROFILE_IMAGE_BYTES {
        return Err(DoctorError::Validation(
            "File size too large. Maximum file size is 5MB.".to_string(),
        ));
    }

    let extension = match content_type.trim_start_matches("image/") {
        "jpeg" => "jpg".to_string(),
        "svg+xml" => "svg".to_string(),
        other => other.to_string(),
    };

    Ok(DecodedImage { bytes, content_type, extension })
}

pub struct ProfileService {
    doctors: DoctorService,
}

impl ProfileService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            doctors: DoctorService::new(config),
        }
    }

    pub async fn get_by_user(&self, user_id: &str, caller: &User) -> Result<Doctor, DoctorError> {
        if caller.id != user_id && !caller.is_admin() {
            return Err(DoctorError::Forbidden(
                "Access denied. You can only view your own profile.".to_string(),
            ));
        }

        self.doctors
            .find_by_user_id(user_id)
            .await?
            .ok_or(DoctorError::ProfileNotFound)
    }

    pub async fn get_profile(&self, doctor_id: &str) -> Result<Value, DoctorError> {
        let doctor = self.load(doctor_id).await?;
        Ok(profile_view(&doctor))
    }

    pub async fn update_profile(
        &self,
        doctor_id: &str,
        caller: &User,
        request: UpdateDoctorRequest,
    ) -> Result<Doctor, DoctorError> {
        let doctor = self.load(doctor_id).await?;
        ensure_owner(&doctor, caller, "Access denied. You can only update your own profile.")?;

        let changes = profile_changes(&request)?;
        if changes.is_empty() {
            debug!("No profile fields supplied for doctor {}", doctor_id);
            return Ok(doctor);
        }

        let updated = self.doctors.update_doctor(doctor_id, Value::Object(changes)).await?;

        if let (Some(name), Some(_)) = (non_blank(&request.name), doctor.user_id.as_deref()) {
            self.doctors.update_user_name(&caller.id, name).await?;
        }

        info!("Profile updated for doctor {}", doctor_id);
        Ok(updated)
    }

    pub async fn update_image(
        &self,
        doctor_id: &str,
        caller: &User,
        upload: &ProfileImageUpload,
    ) -> Result<String, DoctorError> {
        let doctor = self.load(doctor_id).await?;
        ensure_owner(&doctor, caller, "Access denied. You can only update your own profile.")?;

        let image = decode_image(upload)?;
        let object_path = format!("profiles/profile-{}.{}", Uuid::new_v4(), image.extension);

        let stored = self
            .doctors
            .supabase()
            .upload_object(&object_path, image.bytes, &image.content_type)
            .await?;

        let updated = self
            .doctors
            .update_doctor(doctor_id, json!({ "profile": stored }))
            .await?;

        info!("Profile image updated for doctor {}", doctor_id);
        Ok(updated.profile)
    }

    pub async fn verification_status(
        &self,
        doctor_id: &str,
        caller: &User,
    ) -> Result<(String, Option<Value>), DoctorError> {
        let doctor = self.load(doctor_id).await?;
        if !caller.is_admin() {
            ensure_owner(&doctor, caller, "Access denied.")?;
        }

        let fallback = if doctor.verified { "approved" } else { "pending" };
        let status = doctor
            .verification_status
            .clone()
            .unwrap_or_else(|| fallback.to_string());

        Ok((status, doctor.verification_details))
    }

    async fn load(&self, doctor_id: &str) -> Result<Doctor, DoctorError> {
        self.doctors.get_doctor(doctor_id).await.map_err(|e| match e {
            DoctorError::NotFound => DoctorError::ProfileNotFound,
            other => other,
        })
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Only the supplied, non-blank fields end up in the patch.
fn profile_changes(request: &UpdateDoctorRequest) -> Result<Map<String, Value>, DoctorError> {
    let mut changes = Map::new();

    if let Some(name) = non_blank(&request.name) {
        changes.insert("name".to_string(), json!(name));
    }
    if let Some(specialization) = non_blank(&request.specialization) {
        changes.insert("specialization".to_string(), json!(specialization));
    }
    if let Some(qualification) = &request.qualification {
        let list = split_list(qualification);
        if !list.is_empty() {
            changes.insert("qualification".to_string(), json!(list));
        }
    }
    if request.experience.is_some() {
        let experience = non_negative_number(request.experience.as_ref(), "Experience")?;
        changes.insert("experience".to_string(), json!(experience.round() as i32));
    }
    if request.fee.is_some() {
        let fee = non_negative_number(request.fee.as_ref(), "Fee")?;
        changes.insert("fee".to_string(), json!(fee));
    }
    if let Some(address) = non_blank(&request.clinic_address) {
        changes.insert("clinic_address".to_string(), json!(address));
    }
    if let Some(bio) = non_blank(&request.bio) {
        changes.insert("bio".to_string(), json!(bio));
    }
    if let Some(phone) = non_blank(&request.phone) {
        changes.insert("phone".to_string(), json!(phone));
    }
    if let Some(availability) = &request.availability {
        let weekly = WeeklyAvailability::parse_strict(availability)?;
        changes.insert("availability".to_string(), json!(weekly));
    }

    Ok(changes)
}
