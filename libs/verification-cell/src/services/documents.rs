use std::time::Duration;

use anyhow::{anyhow, Result};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use reqwest::Client;
use serde_json::{json, Value};
use tracing::{debug, warn};

use shared_config::AppConfig;

use crate::models::{DocumentKind, RegistrationRequest, VerificationError};
use crate::services::scoring::fallback_result;

pub const MAX_DOCUMENT_BYTES: usize = 10 * 1024 * 1024;

const VERIFY_PATH: &str = "/api/verify-doctor";
const VERIFY_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug)]
pub struct DecodedDocument {
    pub bytes: Vec<u8>,
    pub content_type: String,
    pub extension: String,
}

/// Decode a data URL (or bare base64 PDF) into bytes. Only images and PDFs are accepted.
pub fn decode_document(payload: &str) -> Result<DecodedDocument, VerificationError> {
    let invalid_type = || {
        VerificationError::Validation(
            "Invalid file type. Only images and PDF files are allowed.".to_string(),
        )
    };

    let (content_type, data) = match payload.trim().strip_prefix("data:") {
        Some(rest) => {
            let (meta, data) = rest
                .split_once(',')
                .ok_or_else(|| VerificationError::Validation("Malformed data URL".to_string()))?;
            (meta.strip_suffix(";base64").unwrap_or(meta).to_string(), data)
        }
        None => ("application/pdf".to_string(), payload.trim()),
    };

    if !(content_type.starts_with("image/") || content_type == "application/pdf") {
        return Err(invalid_type());
    }

    let bytes = BASE64
        .decode(data.trim())
        .map_err(|_| VerificationError::Validation("Document is not valid base64".to_string()))?;

    if bytes.is_empty() {
        return Err(VerificationError::Validation("Required documents are missing".to_string()));
    }
    if bytes.len() > MAX_DOCUMENT_BYTES {
        return Err(VerificationError::Validation(
            "File size too large. Maximum file size is 10MB.".to_string(),
        ));
    }

    let extension = match content_type.as_str() {
        "application/pdf" => "pdf".to_string(),
        "image/jpeg" => "jpg".to_string(),
        other => other.trim_start_matches("image/").to_string(),
    };

    Ok(DecodedDocument { bytes, content_type, extension })
}

pub fn doctor_data(request: &RegistrationRequest) -> Value {
    json!({
        "name": request.name,
        "email": request.email,
        "specialization": request.specialization,
        "phone": request.phone
    })
}

/// Response served when the verification service cannot be reached.
pub fn fallback_check(request: &RegistrationRequest) -> Value {
    json!({
        "success": true,
        "doctor_data": doctor_data(request),
        "verification_results": {
            "license": fallback_result(DocumentKind::License),
            "degree": fallback_result(DocumentKind::Degree)
        },
        "status": "pending_review",
        "message": "Documents have been received and will be reviewed by our team."
    })
}

/// Client for the external document-verification service.
pub struct DocumentVerificationClient {
    http_client: Client,
    base_url: String,
}

impl DocumentVerificationClient {
    pub fn new(config: &AppConfig) -> Self {
        let http_client = Client::builder()
            .timeout(VERIFY_TIMEOUT)
            .build()
            .unwrap_or_else(|e| {
                warn!("Falling back to default HTTP client: {}", e);
                Client::new()
            });

        Self {
            http_client,
            base_url: config.document_verification_url.trim_end_matches('/').to_string(),
        }
    }

    pub async fn verify_doctor(&self, request: &RegistrationRequest) -> Result<Value> {
        let url = format!("{}{}", self.base_url, VERIFY_PATH);
        debug!("Forwarding documents to verification service at {}", url);

        let payload = json!({
            "name": request.name,
            "email": request.email,
            "specialization": request.specialization,
            "phone": request.phone,
            "pmdc": request.pmdc,
            "license": request.license,
            "degree": request.degree,
            "profile_photo": request.profile_photo
        });

        let response = self.http_client.post(&url).json(&payload).send().await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(anyhow!("Verification service error ({}): {}", status, error_text));
        }

        Ok(response.json::<Value>().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn decodes_image_data_url() {
        let doc = decode_document("data:image/jpeg;base64,aGVsbG8=").unwrap();
        assert_eq!(doc.bytes, b"hello");
        assert_eq!(doc.content_type, "image/jpeg");
        assert_eq!(doc.extension, "jpg");
    }

    #[test]
    fn bare_base64_is_treated_as_pdf() {
        let doc = decode_document("JVBERi0xLjQ=").unwrap();
        assert_eq!(doc.content_type, "application/pdf");
        assert_eq!(doc.extension, "pdf");
    }

    #[test]
    fn rejects_other_types_and_bad_payloads() {
        assert_matches!(
            decode_document("data:text/plain;base64,aGVsbG8="),
            Err(VerificationError::Validation(msg)) if msg.starts_with("Invalid file type")
        );
        assert_matches!(decode_document("data:image/png;base64"), Err(VerificationError::Validation(_)));
        assert_matches!(decode_document("data:image/png;base64,***"), Err(VerificationError::Validation(_)));
    }

    #[test]
    fn fallback_shape() {
        let request = RegistrationRequest {
            name: "Dr. Bilal Ahmed".to_string(),
            ..RegistrationRequest::default()
        };
        let fallback = fallback_check(&request);

        assert_eq!(fallback["status"], "pending_review");
        assert_eq!(fallback["doctor_data"]["name"], "Dr. Bilal Ahmed");
        assert_eq!(fallback["verification_results"]["license"]["method"], "rule-based");
        assert_eq!(fallback["verification_results"]["degree"]["confidence"], 0.85);
    }
}
