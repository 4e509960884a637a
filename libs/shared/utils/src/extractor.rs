use std::sync::Arc;

use axum::{
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
    body::Body,
};

use shared_models::auth::{User, ROLE_ADMIN};
use shared_models::error::AppError;
use shared_config::AppConfig;

use crate::jwt::validate_token;

/// Pull the bearer token out of an `Authorization` header value.
pub fn bearer_token(header_value: Option<&str>) -> Result<&str, AppError> {
    let auth_value = header_value
        .ok_or_else(|| AppError::Auth("Please authenticate using a valid token".to_string()))?;

    auth_value
        .strip_prefix("Bearer ")
        .filter(|token| !token.is_empty())
        .ok_or_else(|| AppError::Auth("Invalid authorization header format".to_string()))
}

pub async fn auth_middleware(
    State(config): State<Arc<AppConfig>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let header_value = request
        .headers()
        .get("Authorization")
        .map(|value| value.to_str()
            .map_err(|_| AppError::Auth("Invalid authorization header format".to_string())))
        .transpose()?;

    let token = bearer_token(header_value)?;

    let user = validate_token(token, &config.jwt_secret)
        .map_err(|e| {
            tracing::debug!("Token rejected: {}", e);
            AppError::Auth("Please authenticate using a valid token".to_string())
        })?;

    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}

pub async fn extract_user<B>(request: &Request<B>) -> Result<User, AppError> {
    request
        .extensions()
        .get::<User>()
        .cloned()
        .ok_or_else(|| AppError::Auth("User not found in request extensions".to_string()))
}

pub fn require_admin(user: &User) -> Result<(), AppError> {
    if user.role.is_none() {
        return Err(AppError::Forbidden("Access denied. Invalid user data.".to_string()));
    }
    if !user.has_role(ROLE_ADMIN) {
        return Err(AppError::Forbidden("Access denied. Admin privileges required.".to_string()));
    }
    Ok(())
}

/// Allow the request when the caller holds any of `roles`.
pub fn require_role(user: &User, roles: &[&str], denied_message: &str) -> Result<(), AppError> {
    if roles.iter().any(|role| user.has_role(role)) {
        Ok(())
    } else {
        Err(AppError::Forbidden(denied_message.to_string()))
    }
}
