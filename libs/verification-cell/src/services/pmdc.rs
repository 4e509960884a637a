use std::time::Duration;

use anyhow::{anyhow, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::{header, Client};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, error, info, warn};

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::{PmdcStatus, PmdcVerification};

pub const MAX_ATTEMPTS: u32 = 3;
pub const CACHE_TTL_DAYS: i64 = 30;

const CACHE_TABLE: &str = "pmdc_verifications";
const REGISTRY_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/100.0.4896.127 Safari/537.36";

#[derive(Debug, Deserialize)]
struct CachedVerification {
    result: PmdcVerification,
}

pub fn missing_number(now: DateTime<Utc>) -> PmdcVerification {
    PmdcVerification {
        pmdc_verified: false,
        status: PmdcStatus::Rejected,
        message: Some("PMDC registration number is required".to_string()),
        doctor_name: None,
        father_name: None,
        license_status: None,
        registration_type: None,
        registration_date: None,
        valid_until: None,
        verification_source: "Validation".to_string(),
        verification_time: now,
        pmdc_number: None,
        error: None,
    }
}

pub fn manual_review(pmdc_number: &str, error: &str, now: DateTime<Utc>) -> PmdcVerification {
    PmdcVerification {
        pmdc_verified: false,
        status: PmdcStatus::PendingReview,
        message: Some(
            "PMDC verification could not be completed automatically. Manual review required."
                .to_string(),
        ),
        doctor_name: None,
        father_name: None,
        license_status: None,
        registration_type: None,
        registration_date: None,
        valid_until: None,
        verification_source: "System".to_string(),
        verification_time: now,
        pmdc_number: Some(pmdc_number.to_string()),
        error: Some(error.to_string()),
    }
}

fn text_field(record: &Value, key: &str) -> Option<String> {
    record[key].as_str().map(str::to_string)
}

fn license_status(record: &Value) -> &'static str {
    match record["Status"].as_str() {
        Some("ACTIVE") => "active",
        _ => "unknown",
    }
}

/// Interpret a registry response body: `{status: true, data: [record, ...]}`.
pub fn registry_outcome(pmdc_number: &str, body: &Value, now: DateTime<Utc>) -> PmdcVerification {
    let record = if body["status"].as_bool() == Some(true) {
        body["data"].as_array().and_then(|rows| rows.first())
    } else {
        None
    };

    match record {
        Some(record) => PmdcVerification {
            pmdc_verified: true,
            status: PmdcStatus::Verified,
            message: None,
            doctor_name: Some(
                text_field(record, "Name")
                    .filter(|n| !n.is_empty())
                    .unwrap_or_else(|| "Name not provided".to_string()),
            ),
            father_name: Some(text_field(record, "FatherName").unwrap_or_default()),
            license_status: Some(license_status(record).to_string()),
            registration_type: Some(text_field(record, "RegistrationType").unwrap_or_default()),
            registration_date: Some(text_field(record, "RegistrationDate").unwrap_or_default()),
            valid_until: Some(text_field(record, "ValidUpto").unwrap_or_default()),
            verification_source: "PMDC API".to_string(),
            verification_time: now,
            pmdc_number: Some(pmdc_number.to_string()),
            error: None,
        },
        None => PmdcVerification {
            pmdc_verified: false,
            status: PmdcStatus::Rejected,
            message: Some("PMDC registration number not found or invalid".to_string()),
            doctor_name: None,
            father_name: None,
            license_status: None,
            registration_type: None,
            registration_date: None,
            valid_until: None,
            verification_source: "PMDC API".to_string(),
            verification_time: now,
            pmdc_number: Some(pmdc_number.to_string()),
            error: None,
        },
    }
}

/// Registry lookups against the PMDC doctor-registration API with a store-backed cache.
pub struct PmdcClient {
    http_client: Client,
    api_url: String,
    supabase: SupabaseClient,
    retry_delay: Duration,
}

impl PmdcClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            http_client: Client::new(),
            api_url: config.pmdc_api_url.clone(),
            supabase: SupabaseClient::new(config),
            retry_delay: Duration::from_millis(config.pmdc_retry_delay_ms),
        }
    }

    pub fn with_retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }

    /// Never fails: registry trouble degrades to a manual-review result.
    pub async fn verify(&self, pmdc_number: &str) -> PmdcVerification {
        let pmdc_number = pmdc_number.trim();
        if pmdc_number.is_empty() {
            warn!("Empty PMDC number provided");
            return missing_number(Utc::now());
        }

        if let Some(cached) = self.cached(pmdc_number).await {
            debug!("Using cached verification for PMDC #{}", pmdc_number);
            return cached;
        }

        let mut attempt = 0;
        loop {
            attempt += 1;
            debug!("Registry verification attempt {} for PMDC #{}", attempt, pmdc_number);

            match self.query_registry(pmdc_number).await {
                Ok(result) => {
                    info!(
                        "PMDC #{} registry outcome: verified={}",
                        pmdc_number, result.pmdc_verified
                    );
                    self.store(&result).await;
                    return result;
                }
                Err(e) => {
                    error!("PMDC registry attempt {} failed: {}", attempt, e);
                    if attempt >= MAX_ATTEMPTS {
                        warn!("Maximum registry retries ({}) reached, falling back to manual review", MAX_ATTEMPTS);
                        return manual_review(pmdc_number, &e.to_string(), Utc::now());
                    }
                    tokio::time::sleep(self.retry_delay * attempt).await;
                }
            }
        }
    }

    async fn query_registry(&self, pmdc_number: &str) -> Result<PmdcVerification> {
        let response = self.http_client
            .post(&self.api_url)
            .header(header::USER_AGENT, REGISTRY_USER_AGENT)
            .form(&[("RegistrationNo", pmdc_number), ("Name", ""), ("FatherName", "")])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(anyhow!("Registry request failed with status: {}", status));
        }

        let body: Value = response.json().await?;
        Ok(registry_outcome(pmdc_number, &body, Utc::now()))
    }

    async fn cached(&self, pmdc_number: &str) -> Option<PmdcVerification> {
        let cutoff = (Utc::now() - chrono::Duration::days(CACHE_TTL_DAYS))
            .to_rfc3339_opts(SecondsFormat::Secs, true);
        let query = format!(
            "pmdc_number=eq.{}&verified_at=gte.{}&order=verified_at.desc&limit=1",
            urlencoding::encode(pmdc_number),
            urlencoding::encode(&cutoff)
        );

        match self.supabase.select_one::<CachedVerification>(CACHE_TABLE, &query).await {
            Ok(row) => row.map(|r| r.result),
            Err(e) => {
                warn!("PMDC cache lookup failed: {}", e);
                None
            }
        }
    }

    async fn store(&self, result: &PmdcVerification) {
        let row = json!({
            "pmdc_number": result.pmdc_number,
            "result": result,
            "verified_at": result.verification_time,
        });

        if let Err(e) = self.supabase.insert::<Value>(CACHE_TABLE, row).await {
            warn!("Failed to cache PMDC verification: {}", e);
        }
    }
}
