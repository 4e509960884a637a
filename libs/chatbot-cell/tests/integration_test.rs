use std::sync::Arc;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use tower::ServiceExt;
use serde_json::{json, Value};
use wiremock::{MockServer, Mock, ResponseTemplate};
use wiremock::matchers::{body_partial_json, header, method, path, query_param};

use chatbot_cell::router::chatbot_routes;
use chatbot_cell::services::assistant::{ChatbotService, CompletionProvider, FALLBACK_RESPONSE};
use shared_config::AppConfig;
use shared_utils::test_utils::{MockStoreResponses, TestConfig};

fn configured(server: &MockServer) -> AppConfig {
    let mut config = TestConfig::with_base_url(&server.uri()).to_app_config();
    config.groq_api_key = "test-groq-key".to_string();
    config
}

fn post_symptoms(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&body).unwrap()
}

async fn mount_cardiologists(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/rest/v1/doctors"))
        .and(query_param("specialization", "ilike.*Cardiologist*"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockStoreResponses::doctor_row("d-1", Some("u-1"))
        ])))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_chat_uses_completion_provider() {
    let server = MockServer::start().await;
    mount_cardiologists(&server).await;

    Mock::given(method("POST"))
        .and(path("/openai/v1/chat/completions"))
        .and(header("authorization", "Bearer test-groq-key"))
        .and(body_partial_json(json!({ "model": "llama3-8b-8192", "temperature": 0.2 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{ "message": { "role": "assistant", "content": "Disease: Angina\nDoctor: Cardiologist" } }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let app = chatbot_routes(Arc::new(configured(&server)));
    let response = app
        .oneshot(post_symptoms("/chat", json!({ "symptoms": "Chest pain and shortness of breath" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["response"], "Disease: Angina\nDoctor: Cardiologist");
    assert_eq!(body["specialist"], "Cardiologist");
    assert_eq!(body["analysis"]["specialist"], "Cardiologist");
    assert_eq!(body["recommended_doctors"][0]["id"], "d-1");
}

#[tokio::test]
async fn test_chat_falls_back_when_provider_fails() {
    let server = MockServer::start().await;
    mount_cardiologists(&server).await;

    Mock::given(method("POST"))
        .and(path("/openai/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream down"))
        .mount(&server)
        .await;

    let app = chatbot_routes(Arc::new(configured(&server)));
    let response = app
        .oneshot(post_symptoms("/chat", json!({ "symptoms": "Irregular heartbeat at night" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["response"], FALLBACK_RESPONSE);
    assert_eq!(body["specialist"], "Cardiologist");
    assert_eq!(body["recommended_doctors"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_chat_without_key_skips_provider() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/openai/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/doctors"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let app = chatbot_routes(TestConfig::with_base_url(&server.uri()).to_arc());
    let response = app
        .oneshot(post_symptoms("/chat", json!({ "symptoms": "Feeling feverish for three days" })))
        .await
        .unwrap();

    let body = body_json(response).await;
    assert_eq!(body["response"], FALLBACK_RESPONSE);
    assert_eq!(body["analysis"]["specialist"], "General Physician");
    assert_eq!(body["recommended_doctors"], json!([]));
}

#[tokio::test]
async fn test_chat_vague_symptoms_recommend_nobody() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/doctors"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let app = chatbot_routes(TestConfig::with_base_url(&server.uri()).to_arc());
    let response = app
        .oneshot(post_symptoms("/chat", json!({ "symptoms": "hello" })))
        .await
        .unwrap();

    let body = body_json(response).await;
    assert_eq!(body["analysis"]["needsMoreInfo"], true);
    assert_eq!(body["recommended_doctors"], json!([]));
}

#[tokio::test]
async fn test_chat_requires_symptoms() {
    let server = MockServer::start().await;
    let app = chatbot_routes(TestConfig::with_base_url(&server.uri()).to_arc());

    let response = app
        .oneshot(post_symptoms("/chat", json!({ "symptoms": "  " })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "Please add correct symptoms");
}

#[tokio::test]
async fn test_analyze_is_rule_based() {
    let server = MockServer::start().await;
    let app = chatbot_routes(TestConfig::with_base_url(&server.uri()).to_arc());

    let response = app
        .oneshot(post_symptoms("/analyze", json!({ "symptoms": "Toothache on the left side" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["analysis"]["specialist"], "Dentist");
    assert_eq!(body["analysis"]["needsMoreInfo"], false);
}

struct CannedProvider(Result<&'static str, &'static str>);

#[async_trait]
impl CompletionProvider for CannedProvider {
    async fn complete(&self, _system: &str, user: &str) -> Result<String> {
        assert!(user.contains("Dermatologist"));
        self.0.map(str::to_string).map_err(|e| anyhow!(e))
    }
}

#[tokio::test]
async fn test_service_prefers_provider_specialist() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/doctors"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let config = TestConfig::with_base_url(&server.uri()).to_app_config();
    let service = ChatbotService::with_provider(
        &config,
        Arc::new(CannedProvider(Ok("Disease: Eczema\nDoctor: Dermatologist"))),
    );

    // Triage says Neurologist, the assistant says Dermatologist.
    let reply = service.chat("Numbness with a dry patch on my hand").await;
    assert_eq!(reply.specialist, "Dermatologist");
    assert_eq!(reply.analysis.specialist.as_deref(), Some("Neurologist"));
}

#[tokio::test]
async fn test_service_provider_error_uses_fallback() {
    let server = MockServer::start().await;
    let config = TestConfig::with_base_url(&server.uri()).to_app_config();
    let service = ChatbotService::with_provider(&config, Arc::new(CannedProvider(Err("rate limited"))));

    let (reply, from_provider) = service.generate_response("Rash spreading on my back").await;
    assert_eq!(reply, FALLBACK_RESPONSE);
    assert!(!from_provider);
}
