use std::sync::Arc;

use axum::{
    extract::{Extension, Json, State},
    http::HeaderMap,
};
use headers::{authorization::Bearer, Authorization, HeaderMapExt};
use serde_json::{json, Value};
use tracing::debug;

use shared_config::AppConfig;
use shared_models::auth::{TokenResponse, User};
use shared_models::error::AppError;
use shared_utils::jwt;

use crate::models::{LoginRequest, LoginResponse};
use crate::services::login::LoginService;

fn bearer_from(headers: &HeaderMap) -> Result<String, AppError> {
    headers
        .typed_get::<Authorization<Bearer>>()
        .map(|Authorization(bearer)| bearer.token().to_string())
        .ok_or_else(|| AppError::Auth("Please authenticate using a valid token".to_string()))
}

pub async fn status() -> Json<Value> {
    Json(json!({ "message": "Authentication API is working!" }))
}

#[axum::debug_handler]
pub async fn login(
    State(config): State<Arc<AppConfig>>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    debug!("Login request for role {:?}", request.role);

    let response = LoginService::new(&config).login(&request).await?;
    Ok(Json(response))
}

#[axum::debug_handler]
pub async fn get_user(
    State(config): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let record = LoginService::new(&config).current_user(&user).await?;

    Ok(Json(json!({
        "success": true,
        "user": record
    })))
}

pub async fn validate_token(
    State(config): State<Arc<AppConfig>>,
    headers: HeaderMap,
) -> Result<Json<TokenResponse>, AppError> {
    let token = bearer_from(&headers)?;

    let user = jwt::validate_token(&token, &config.jwt_secret).map_err(AppError::Auth)?;

    Ok(Json(TokenResponse {
        valid: true,
        user_id: user.id,
        email: user.email,
        role: user.role,
    }))
}

pub async fn verify_token(
    State(config): State<Arc<AppConfig>>,
    headers: HeaderMap,
) -> Json<Value> {
    let valid = bearer_from(&headers)
        .map(|token| jwt::validate_token(&token, &config.jwt_secret).is_ok())
        .unwrap_or(false);

    Json(json!({ "valid": valid }))
}
