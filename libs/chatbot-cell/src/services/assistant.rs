use std::sync::Arc;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::{header, Client};
use serde_json::{json, Value};
use tracing::{debug, error, info, warn};

use doctor_cell::services::doctor::DoctorService;
use shared_config::AppConfig;

use crate::models::ChatReply;
use crate::services::triage::{analyze_symptoms, extract_specialist};

pub const FALLBACK_RESPONSE: &str = "I'm having trouble analyzing your symptoms right now. \
Based on what you've shared, I recommend consulting with a General Physician who can properly evaluate your condition. \
If your symptoms are severe, please seek immediate medical attention.";

const SYSTEM_PROMPT: &str = "You are an AI-powered medical assistant.";
const TEMPERATURE: f64 = 0.2;

pub fn user_prompt(symptoms: &str) -> String {
    format!(
        "Given the symptoms: {symptoms}, your task is to:\n\
         1. Predict the most likely disease.\n\
         2. Suggest the appropriate type of doctor to visit.\n\n\
         Format your response as follows:\n\
         Disease: [Predicted Disease]\n\
         Doctor: [Doctor Specialization]\n\n\
         We have the following doctors:\n\
         1. Cardiologist\n\
         2. Neurologist\n\
         3. Dermatologist\n\
         4. Gastroenterologist\n\
         5. Orthopedic Surgeon\n\
         6. Psychiatrist\n\
         7. Ophthalmologist\n\
         8. Dentist\n\
         9. General Physician"
    )
}

/// A chat-completion backend.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn complete(&self, system: &str, user: &str) -> Result<String>;
}

/// OpenAI-compatible `/chat/completions` client (Groq by default).
pub struct GroqProvider {
    http_client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl GroqProvider {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            http_client: Client::new(),
            api_key: config.groq_api_key.clone(),
            base_url: config.groq_base_url.trim_end_matches('/').to_string(),
            model: config.groq_model.clone(),
        }
    }
}

#[async_trait]
impl CompletionProvider for GroqProvider {
    async fn complete(&self, system: &str, user: &str) -> Result<String> {
        let body = json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": system },
                { "role": "user", "content": user }
            ],
            "temperature": TEMPERATURE
        });

        let response = self.http_client
            .post(format!("{}/chat/completions", self.base_url))
            .header(header::AUTHORIZATION, format!("Bearer {}", self.api_key))
            .header(header::CONTENT_TYPE, "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(anyhow!("Completion API error ({}): {}", status, error_text));
        }

        let completion: Value = response.json().await?;
        completion["choices"][0]["message"]["content"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| anyhow!("Invalid completion response format"))
    }
}

pub struct ChatbotService {
    provider: Option<Arc<dyn CompletionProvider>>,
    doctors: DoctorService,
}

impl ChatbotService {
    /// Without a configured key the assistant always answers with the fallback text.
    pub fn new(config: &AppConfig) -> Self {
        let provider: Option<Arc<dyn CompletionProvider>> = if config.is_chatbot_configured() {
            Some(Arc::new(GroqProvider::new(config)))
        } else {
            warn!("Chatbot API key is not configured; using fallback responses");
            None
        };

        Self {
            provider,
            doctors: DoctorService::new(config),
        }
    }

    pub fn with_provider(config: &AppConfig, provider: Arc<dyn CompletionProvider>) -> Self {
        Self {
            provider: Some(provider),
            doctors: DoctorService::new(config),
        }
    }

    /// Never fails: provider trouble yields the fallback recommendation.
    pub async fn generate_response(&self, symptoms: &str) -> (String, bool) {
        let Some(provider) = &self.provider else {
            return (FALLBACK_RESPONSE.to_string(), false);
        };

        debug!("Sending symptoms to completion provider");
        match provider.complete(SYSTEM_PROMPT, &user_prompt(symptoms)).await {
            Ok(reply) => (reply, true),
            Err(e) => {
                error!("Error generating chatbot response: {}", e);
                (FALLBACK_RESPONSE.to_string(), false)
            }
        }
    }

    pub async fn chat(&self, symptoms: &str) -> ChatReply {
        let analysis = analyze_symptoms(symptoms);
        let (response, from_provider) = self.generate_response(symptoms).await;

        let specialist = if from_provider {
            extract_specialist(&response).to_string()
        } else {
            analysis.specialist.clone().unwrap_or_else(|| extract_specialist(&response).to_string())
        };

        let recommended_doctors = match analysis.referral() {
            Some(referral) => match self.doctors.find_by_specialization(referral).await {
                Ok(doctors) => doctors,
                Err(e) => {
                    warn!("Doctor lookup for {} failed: {}", referral, e);
                    Vec::new()
                }
            },
            None => Vec::new(),
        };

        info!(
            "Chat triage: {} ({} doctors recommended)",
            analysis.specialist.as_deref().unwrap_or("needs more info"),
            recommended_doctors.len()
        );

        ChatReply {
            response,
            specialist,
            analysis,
            recommended_doctors,
        }
    }
}
