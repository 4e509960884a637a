use std::env;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub supabase_url: String,
    pub supabase_service_key: String,
    pub jwt_secret: String,
    pub jwt_expiry_hours: i64,
    pub groq_api_key: String,
    pub groq_base_url: String,
    pub groq_model: String,
    pub document_verification_url: String,
    pub pmdc_api_url: String,
    pub pmdc_retry_delay_ms: u64,
    pub environment: String,
    pub port: u16,
}

fn required(name: &str) -> String {
    env::var(name).unwrap_or_else(|_| {
        warn!("{} not set, using empty value", name);
        String::new()
    })
}

fn with_default(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| {
        warn!("{} not set, using default", name);
        default.to_string()
    })
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            supabase_url: required("SUPABASE_URL"),
            supabase_service_key: required("SUPABASE_SERVICE_KEY"),
            jwt_secret: required("JWT_SECRET"),
            jwt_expiry_hours: with_default("JWT_EXPIRY_HOURS", "24")
                .parse()
                .unwrap_or_else(|_| {
                    warn!("JWT_EXPIRY_HOURS is not a number, using 24");
                    24
                }),
            groq_api_key: env::var("GROQ_API_KEY").unwrap_or_else(|_| {
                warn!("GROQ_API_KEY not set, chatbot will use fallback responses");
                String::new()
            }),
            groq_base_url: with_default("GROQ_BASE_URL", "https://api.groq.com/openai/v1"),
            groq_model: with_default("GROQ_MODEL", "llama3-8b-8192"),
            document_verification_url: with_default("DOC_VERIFICATION_URL", "http://localhost:5001"),
            pmdc_api_url: with_default(
                "PMDC_API_URL",
                "https://hospitals-inspections.pmdc.pk/api/DRC/GetData",
            ),
            pmdc_retry_delay_ms: env::var("PMDC_RETRY_DELAY_MS")
                .ok()
                .and_then(|ms| ms.parse().ok())
                .unwrap_or(2000),
            environment: env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(5000),
        };

        if !config.is_configured() {
            warn!("Application not fully configured - missing environment variables");
        }

        config
    }

    /// Configuration pointing every external dependency at `base_url`.
    /// Used by tests that stand up a single mock server.
    pub fn for_base_url(base_url: &str, jwt_secret: &str) -> Self {
        Self {
            supabase_url: base_url.to_string(),
            supabase_service_key: "test-service-key".to_string(),
            jwt_secret: jwt_secret.to_string(),
            jwt_expiry_hours: 24,
            groq_api_key: String::new(),
            groq_base_url: format!("{}/openai/v1", base_url),
            groq_model: "llama3-8b-8192".to_string(),
            document_verification_url: base_url.to_string(),
            pmdc_api_url: format!("{}/api/DRC/GetData", base_url),
            pmdc_retry_delay_ms: 0,
            environment: "test".to_string(),
            port: 0,
        }
    }

    pub fn is_configured(&self) -> bool {
        !self.supabase_url.is_empty()
            && !self.supabase_service_key.is_empty()
            && !self.jwt_secret.is_empty()
    }

    pub fn is_chatbot_configured(&self) -> bool {
        !self.groq_api_key.is_empty() && !self.groq_base_url.is_empty()
    }
}
