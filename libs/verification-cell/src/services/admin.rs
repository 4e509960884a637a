use chrono::Utc;
use serde_json::{json, Value};
use tracing::{debug, info};

use auth_cell::models::Account;
use doctor_cell::models::Doctor;
use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;
use shared_models::auth::ROLE_USER;

use crate::models::{
    ApplicationStatus, DashboardStats, DoctorApplication, PmdcStats, PmdcVerification,
    ReviewRequest, VerificationError,
};
use crate::services::pmdc::PmdcClient;

pub const RECENT_REGISTRATIONS: usize = 5;
pub const RECENT_PMDC_CHECKS: usize = 10;

const APPLICATIONS: &str = "unverified_doctors";
const PMDC_RESULT_POINTER: &str = "/verification_results/license/pmdc_verification";

fn id_filter(id: &str) -> String {
    format!("id=eq.{}", urlencoding::encode(id))
}

/// The registry result recorded on an application, if any.
pub fn pmdc_result_of(application: &DoctorApplication) -> Option<&Value> {
    application
        .ai_analysis_results
        .as_ref()?
        .pointer(PMDC_RESULT_POINTER)
        .filter(|v| v.is_object())
}

fn pmdc_verified(application: &DoctorApplication) -> Option<bool> {
    pmdc_result_of(application).map(|r| r["pmdc_verified"].as_bool() == Some(true))
}

/// Record a registry result on an analysis, creating the analysis skeleton when absent.
pub fn attach_pmdc_result(analysis: Option<Value>, result: &PmdcVerification) -> Value {
    let mut analysis = match analysis {
        Some(value @ Value::Object(_)) => value,
        _ => json!({
            "success": true,
            "status": "pending_review",
            "message": "Documents are being verified.",
            "verification_results": { "license": {}, "degree": {} }
        }),
    };

    if !analysis["verification_results"].is_object() {
        analysis["verification_results"] = json!({ "license": {}, "degree": {} });
    }
    if !analysis["verification_results"]["license"].is_object() {
        analysis["verification_results"]["license"] = json!({});
    }

    analysis["verification_results"]["license"]["pmdc_verification"] = json!(result);

    if result.is_verified() {
        analysis["status"] = json!("likely_valid");
        analysis["message"] = json!("PMDC verification successful. Application is pending final approval.");
    }

    analysis
}

/// Directory row for an approved application.
pub fn approved_doctor_row(application: &DoctorApplication) -> Value {
    json!({
        "user_id": application.user_id,
        "name": application.name,
        "email": application.email,
        "phone": application.phone,
        "specialization": application.specialization,
        "qualification": application.qualification,
        "experience": application.experience.round() as i64,
        "fee": application.fee,
        "profile": application.profile_photo.clone().unwrap_or_default(),
        "pmdc": application.pmdc,
        "verified": true,
        "verification_status": ApplicationStatus::Approved,
        "verification_details": application.ai_analysis_results
    })
}

fn registration_summary(application: &DoctorApplication) -> Value {
    json!({
        "id": application.id,
        "name": application.name,
        "email": application.email,
        "specialization": application.specialization,
        "submitted_at": application.submitted_at,
        "verification_status": application.verification_status,
        "pmdc": application.pmdc
    })
}

fn count_status(applications: &[DoctorApplication], status: ApplicationStatus) -> usize {
    applications.iter().filter(|a| a.verification_status == status).count()
}

/// `applications` newest first.
pub fn dashboard_stats(total_users: usize, total_doctors: usize, applications: &[DoctorApplication]) -> DashboardStats {
    DashboardStats {
        total_users,
        total_doctors,
        pending_verifications: count_status(applications, ApplicationStatus::Pending),
        pending_approval: count_status(applications, ApplicationStatus::PendingApproval),
        rejected_applications: count_status(applications, ApplicationStatus::Rejected),
        pmdc_verified_count: applications.iter().filter(|a| pmdc_verified(a) == Some(true)).count(),
        recent_doctor_registrations: applications
            .iter()
            .take(RECENT_REGISTRATIONS)
            .map(registration_summary)
            .collect(),
    }
}

/// `applications` newest first.
pub fn pmdc_stats(applications: &[DoctorApplication]) -> PmdcStats {
    let checked: Vec<&DoctorApplication> = applications
        .iter()
        .filter(|a| pmdc_result_of(a).is_some())
        .collect();

    let total = checked.len();
    let successful = checked.iter().filter(|a| pmdc_verified(a) == Some(true)).count();
    let rate = if total > 0 {
        successful as f64 / total as f64 * 100.0
    } else {
        0.0
    };

    PmdcStats {
        total_verifications: total,
        successful_verifications: successful,
        failed_verifications: total - successful,
        verification_rate: rate,
        recent_verifications: checked
            .iter()
            .take(RECENT_PMDC_CHECKS)
            .map(|a| json!({
                "id": a.id,
                "name": a.name,
                "email": a.email,
                "pmdc": a.pmdc,
                "verification_status": a.verification_status,
                "submitted_at": a.submitted_at,
                "pmdc_verification": pmdc_result_of(a)
            }))
            .collect(),
    }
}

pub struct AdminService {
    supabase: SupabaseClient,
    pmdc: PmdcClient,
}

impl AdminService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
            pmdc: PmdcClient::new(config),
        }
    }

    pub async fn profile(&self, admin_id: &str) -> Result<Account, VerificationError> {
        self.supabase
            .select_one("admins", &id_filter(admin_id))
            .await?
            .ok_or(VerificationError::AdminNotFound)
    }

    pub async fn dashboard(&self) -> Result<DashboardStats, VerificationError> {
        let patients = format!("select=id&role=eq.{}", ROLE_USER);
        let (users, doctors, applications) = futures::try_join!(
            self.supabase.select::<Value>("users", &patients),
            self.supabase.select::<Value>("doctors", "select=id"),
            self.supabase.select::<DoctorApplication>(APPLICATIONS, "order=submitted_at.desc"),
        )?;

        debug!("Dashboard over {} applications", applications.len());
        Ok(dashboard_stats(users.len(), doctors.len(), &applications))
    }

    pub async fn applications_with_status(&self, status: ApplicationStatus) -> Result<Vec<DoctorApplication>, VerificationError> {
        let query = format!("verification_status=eq.{}&order=submitted_at.desc", status);
        Ok(self.supabase.select(APPLICATIONS, &query).await?)
    }

    pub async fn get_application(&self, application_id: &str) -> Result<DoctorApplication, VerificationError> {
        self.supabase
            .select_one(APPLICATIONS, &id_filter(application_id))
            .await?
            .ok_or(VerificationError::ApplicationNotFound)
    }

    pub async fn review(&self, application_id: &str, request: &ReviewRequest) -> Result<DoctorApplication, VerificationError> {
        let status = match request.status.as_deref() {
            Some("approved") => ApplicationStatus::Approved,
            Some("rejected") => ApplicationStatus::Rejected,
            _ => {
                return Err(VerificationError::Validation(
                    "Valid status (approved or rejected) is required".to_string(),
                ))
            }
        };

        // A second approval would list the doctor twice.
        let current = self.get_application(application_id).await?;
        if status == ApplicationStatus::Approved && current.verification_status == ApplicationStatus::Approved {
            return Err(VerificationError::AlreadyApproved);
        }

        let application: DoctorApplication = self.supabase
            .update(APPLICATIONS, &id_filter(application_id), json!({
                "verification_status": status,
                "admin_notes": request.admin_notes.clone().unwrap_or_default(),
                "reviewed_at": Utc::now()
            }))
            .await?
            .ok_or(VerificationError::ApplicationNotFound)?;

        if status == ApplicationStatus::Approved {
            let doctor: Doctor = self.supabase.insert("doctors", approved_doctor_row(&application)).await?;
            info!("Application {} approved as doctor {}", application.id, doctor.id);
        } else {
            info!("Application {} rejected", application.id);
        }

        Ok(application)
    }

    pub async fn verify_pmdc(
        &self,
        application_id: &str,
        pmdc_number: Option<&str>,
    ) -> Result<(PmdcVerification, ApplicationStatus), VerificationError> {
        let pmdc_number = pmdc_number
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .ok_or_else(|| VerificationError::Validation("PMDC number is required".to_string()))?;

        let application = self.get_application(application_id).await?;
        let result = self.pmdc.verify(pmdc_number).await;

        let status = if result.is_verified() {
            ApplicationStatus::PendingApproval
        } else {
            application.verification_status
        };

        let analysis = attach_pmdc_result(application.ai_analysis_results, &result);

        self.supabase
            .update::<DoctorApplication>(APPLICATIONS, &id_filter(application_id), json!({
                "pmdc": pmdc_number,
                "verification_status": status,
                "ai_analysis_results": analysis
            }))
            .await?
            .ok_or(VerificationError::ApplicationNotFound)?;

        info!("PMDC check for application {}: verified={}", application_id, result.pmdc_verified);
        Ok((result, status))
    }

    pub async fn verified_doctors(&self) -> Result<Vec<Doctor>, VerificationError> {
        Ok(self.supabase.select("doctors", "order=created_at.desc").await?)
    }

    pub async fn users(&self) -> Result<Vec<Account>, VerificationError> {
        Ok(self.supabase
            .select("users", "select=id,name,email,role,created_at&order=created_at.desc")
            .await?)
    }

    pub async fn pmdc_overview(&self) -> Result<PmdcStats, VerificationError> {
        let applications: Vec<DoctorApplication> = self.supabase
            .select(APPLICATIONS, "order=submitted_at.desc")
            .await?;
        Ok(pmdc_stats(&applications))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::pmdc::{manual_review, registry_outcome};

    fn application(id: &str, status: &str, analysis: Value) -> DoctorApplication {
        serde_json::from_value(json!({
            "id": id,
            "name": "Dr. Bilal Ahmed",
            "email": "bilal@clinic.pk",
            "experience": 4.4,
            "fee": 1500,
            "profile_photo": "uploads/profiles/bilal.png",
            "verification_status": status,
            "ai_analysis_results": analysis
        }))
        .unwrap()
    }

    fn verified_result() -> PmdcVerification {
        registry_outcome(
            "54321-P",
            &json!({ "status": true, "data": [{ "Name": "BILAL AHMED", "Status": "ACTIVE" }] }),
            Utc::now(),
        )
    }

    #[test]
    fn attaching_to_missing_analysis_builds_skeleton() {
        let analysis = attach_pmdc_result(None, &verified_result());

        assert_eq!(analysis["status"], "likely_valid");
        assert_eq!(analysis["verification_results"]["license"]["pmdc_verification"]["pmdc_verified"], true);
        assert!(analysis["verification_results"]["degree"].is_object());
    }

    #[test]
    fn attaching_failed_result_keeps_existing_status() {
        let existing = json!({ "status": "pending_review", "verification_results": { "license": { "confidence": 0.6 } } });
        let analysis = attach_pmdc_result(Some(existing), &manual_review("54321-P", "timeout", Utc::now()));

        assert_eq!(analysis["status"], "pending_review");
        assert_eq!(analysis["verification_results"]["license"]["confidence"], 0.6);
        assert_eq!(analysis["verification_results"]["license"]["pmdc_verification"]["status"], "pending_review");
    }

    #[test]
    fn approved_row_copies_application() {
        let row = approved_doctor_row(&application("app-1", "approved", Value::Null));

        assert_eq!(row["verified"], true);
        assert_eq!(row["experience"], 4);
        assert_eq!(row["profile"], "uploads/profiles/bilal.png");
    }

    #[test]
    fn stats_over_applications() {
        let checked = attach_pmdc_result(None, &verified_result());
        let failed = attach_pmdc_result(None, &manual_review("1", "down", Utc::now()));
        let applications = vec![
            application("a1", "pending", checked),
            application("a2", "pending_approval", failed),
            application("a3", "rejected", Value::Null),
            application("a4", "pending", Value::Null),
            application("a5", "suspicious", Value::Null),
            application("a6", "pending", Value::Null),
        ];

        let dashboard = dashboard_stats(10, 3, &applications);
        assert_eq!(dashboard.pending_verifications, 3);
        assert_eq!(dashboard.pending_approval, 1);
        assert_eq!(dashboard.rejected_applications, 1);
        assert_eq!(dashboard.pmdc_verified_count, 1);
        assert_eq!(dashboard.recent_doctor_registrations.len(), 5);
        assert_eq!(dashboard.recent_doctor_registrations[0]["id"], "a1");

        let pmdc = pmdc_stats(&applications);
        assert_eq!(pmdc.total_verifications, 2);
        assert_eq!(pmdc.successful_verifications, 1);
        assert_eq!(pmdc.failed_verifications, 1);
        assert_eq!(pmdc.verification_rate, 50.0);
    }
}
