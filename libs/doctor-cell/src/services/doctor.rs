use serde_json::{json, Value};
use tracing::{debug, info};
use chrono::Utc;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;
use shared_utils::validation::{is_blank, split_list};

use crate::models::{CreateDoctorRequest, Doctor, DoctorError, DoctorQuery};

pub struct DoctorService {
    supabase: SupabaseClient,
}

impl DoctorService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    pub fn supabase(&self) -> &SupabaseClient {
        &self.supabase
    }

    /// Directory listing filtered by specialization and qualification.
    pub async fn list_doctors(&self, query: &DoctorQuery) -> Result<Vec<Doctor>, DoctorError> {
        debug!("Listing doctors with filters: {:?}", query);

        let doctors: Vec<Doctor> = self.supabase.select("doctors", "order=name.asc").await?;

        let filtered: Vec<Doctor> = doctors
            .into_iter()
            .filter(|doctor| matches_query(doctor, query))
            .collect();

        if filtered.is_empty() {
            return Err(DoctorError::NoMatches);
        }

        Ok(filtered)
    }

    pub async fn create_doctor(&self, request: CreateDoctorRequest) -> Result<Doctor, DoctorError> {
        let row = new_doctor_row(request)?;
        let doctor: Doctor = self.supabase.insert("doctors", row).await?;

        info!("Doctor {} added to directory", doctor.id);
        Ok(doctor)
    }

    pub async fn get_doctor(&self, doctor_id: &str) -> Result<Doctor, DoctorError> {
        let query = format!("id=eq.{}", urlencoding::encode(doctor_id));
        self.supabase
            .select_one("doctors", &query)
            .await?
            .ok_or(DoctorError::NotFound)
    }

    pub async fn find_by_user_id(&self, user_id: &str) -> Result<Option<Doctor>, DoctorError> {
        let query = format!("user_id=eq.{}", urlencoding::encode(user_id));
        Ok(self.supabase.select_one("doctors", &query).await?)
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<Doctor>, DoctorError> {
        let query = format!("email=eq.{}", urlencoding::encode(email));
        Ok(self.supabase.select_one("doctors", &query).await?)
    }

    /// Doctors whose specialization contains `specialist`, case-insensitively.
    pub async fn find_by_specialization(&self, specialist: &str) -> Result<Vec<Doctor>, DoctorError> {
        let query = format!(
            "specialization=ilike.{}",
            urlencoding::encode(&format!("*{}*", specialist))
        );
        Ok(self.supabase.select("doctors", &query).await?)
    }

    pub async fn update_doctor(&self, doctor_id: &str, changes: Value) -> Result<Doctor, DoctorError> {
        let filter = format!("id=eq.{}", urlencoding::encode(doctor_id));
        self.supabase
            .update("doctors", &filter, changes)
            .await?
            .ok_or(DoctorError::NotFound)
    }

    pub async fn update_user_name(&self, user_id: &str, name: &str) -> Result<(), DoctorError> {
        let filter = format!("id=eq.{}", urlencoding::encode(user_id));
        let _: Option<Value> = self.supabase.update("users", &filter, json!({ "name": name })).await?;
        Ok(())
    }
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

pub fn matches_query(doctor: &Doctor, query: &DoctorQuery) -> bool {
    let specialization_ok = match query.specialization.as_deref().filter(|s| !s.is_empty()) {
        Some(wanted) => {
            contains_ci(&doctor.specialization, wanted)
                || doctor.qualification.iter().any(|q| contains_ci(q, wanted))
        }
        None => true,
    };

    let qualification_ok = match query.qualification.as_deref().filter(|s| !s.is_empty()) {
        Some(wanted) => doctor.qualification.iter().any(|q| contains_ci(q, wanted)),
        None => true,
    };

    specialization_ok && qualification_ok
}

/// Accept a JSON number or numeric string that is zero or greater.
pub fn non_negative_number(value: Option<&Value>, field: &str) -> Result<f64, DoctorError> {
    let invalid = || DoctorError::Validation(format!("{} must be a non-negative number", field));

    let number = match value {
        None | Some(Value::Null) => return Ok(0.0),
        Some(Value::Number(n)) => n.as_f64().ok_or_else(invalid)?,
        Some(Value::String(s)) if s.trim().is_empty() => return Ok(0.0),
        Some(Value::String(s)) => s.trim().parse::<f64>().map_err(|_| invalid())?,
        Some(_) => return Err(invalid()),
    };

    if number.is_finite() && number >= 0.0 {
        Ok(number)
    } else {
        Err(invalid())
    }
}

fn new_doctor_row(request: CreateDoctorRequest) -> Result<Value, DoctorError> {
    if is_blank(request.name.as_deref())
        || is_blank(request.specialization.as_deref())
        || is_blank(request.profile.as_deref())
    {
        return Err(DoctorError::Validation(
            "Name, specialization, qualification and profile are required".to_string(),
        ));
    }

    let qualification = split_list(&request.qualification);
    if qualification.is_empty() {
        return Err(DoctorError::Validation(
            "Name, specialization, qualification and profile are required".to_string(),
        ));
    }

    let experience = non_negative_number(request.experience.as_ref(), "Experience")?;
    let fee = non_negative_number(request.fee.as_ref(), "Fee")?;

    Ok(json!({
        "name": request.name.as_deref().map(str::trim),
        "specialization": request.specialization.as_deref().map(str::trim),
        "qualification": qualification,
        "profile": request.profile,
        "experience": experience.round() as i32,
        "fee": fee,
        "email": request.email,
        "phone": request.phone,
        "pmdc": request.pmdc,
        "bio": request.bio,
        "clinic_address": request.clinic_address,
        "availability": request.availability,
        "verified": true,
        "created_at": Utc::now().to_rfc3339()
    }))
}
