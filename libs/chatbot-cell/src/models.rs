use serde::{Deserialize, Serialize};
use thiserror::Error;

use doctor_cell::models::Doctor;
use shared_models::error::AppError;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SymptomRequest {
    #[serde(default)]
    pub symptoms: Option<String>,
}

impl SymptomRequest {
    pub fn symptoms(&self) -> Result<&str, ChatbotError> {
        self.symptoms
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or(ChatbotError::MissingSymptoms)
    }
}

/// Outcome of the keyword triage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymptomAnalysis {
    pub response: String,
    pub specialist: Option<String>,
    #[serde(default)]
    pub needs_more_info: bool,
}

impl SymptomAnalysis {
    /// Specialist worth searching the directory for.
    pub fn referral(&self) -> Option<&str> {
        if self.needs_more_info {
            None
        } else {
            self.specialist.as_deref()
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatReply {
    pub response: String,
    pub specialist: String,
    pub analysis: SymptomAnalysis,
    pub recommended_doctors: Vec<Doctor>,
}

#[derive(Error, Debug)]
pub enum ChatbotError {
    #[error("Please add correct symptoms")]
    MissingSymptoms,
}

impl From<ChatbotError> for AppError {
    fn from(e: ChatbotError) -> Self {
        match e {
            ChatbotError::MissingSymptoms => AppError::BadRequest(e.to_string()),
        }
    }
}
