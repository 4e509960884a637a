use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use hmac::{Hmac, Mac};
use serde_json::json;
use sha2::Sha256;
use chrono::{Duration, TimeZone, Utc};
use tracing::{debug, instrument};
use shared_models::auth::{JwtClaims, JwtHeader, User};

type HmacSha256 = Hmac<Sha256>;

fn sign(signing_input: &str, jwt_secret: &str) -> Result<String, String> {
    let mut mac = HmacSha256::new_from_slice(jwt_secret.as_bytes())
        .map_err(|_| "Failed to create HMAC".to_string())?;
    mac.update(signing_input.as_bytes());
    Ok(URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes()))
}

/// Issue an HS256 token for `user_id` valid for `ttl_hours`.
#[instrument(skip(jwt_secret))]
pub fn issue_token(
    user_id: &str,
    email: Option<&str>,
    role: &str,
    jwt_secret: &str,
    ttl_hours: i64,
) -> Result<String, String> {
    if jwt_secret.is_empty() {
        return Err("JWT secret is not set".to_string());
    }

    let now = Utc::now();
    let exp = now + Duration::hours(ttl_hours);

    let header = JwtHeader { alg: "HS256".to_string(), typ: "JWT".to_string() };
    let claims = json!({
        "sub": user_id,
        "email": email,
        "role": role,
        "iat": now.timestamp(),
        "exp": exp.timestamp()
    });

    let header = serde_json::to_string(&header).map_err(|e| e.to_string())?;

    let signing_input = format!(
        "{}.{}",
        URL_SAFE_NO_PAD.encode(header),
        URL_SAFE_NO_PAD.encode(claims.to_string())
    );
    let signature = sign(&signing_input, jwt_secret)?;

    Ok(format!("{}.{}", signing_input, signature))
}

#[instrument(skip(token, jwt_secret))]
pub fn validate_token(token: &str, jwt_secret: &str) -> Result<User, String> {
    if jwt_secret.is_empty() {
        return Err("JWT secret is not set".to_string());
    }

    // Split token into parts
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        return Err("Invalid token format".to_string());
    }

    let header_b64 = parts[0];
    let claims_b64 = parts[1];
    let signature_b64 = parts[2];

    let signature = match URL_SAFE_NO_PAD.decode(signature_b64) {
        Ok(sig) => sig,
        Err(e) => {
            debug!("Failed to decode signature: {}", e);
            return Err("Invalid signature encoding".to_string());
        }
    };

    let mut mac = HmacSha256::new_from_slice(jwt_secret.as_bytes())
        .map_err(|_| "Failed to create HMAC".to_string())?;
    mac.update(format!("{}.{}", header_b64, claims_b64).as_bytes());

    if mac.verify_slice(&signature).is_err() {
        debug!("Token signature verification failed");
        return Err("Invalid token signature".to_string());
    }

    let claims_json = URL_SAFE_NO_PAD.decode(claims_b64)
        .ok()
        .and_then(|bytes| String::from_utf8(bytes).ok())
        .ok_or_else(|| "Invalid claims encoding".to_string())?;

    let claims: JwtClaims = match serde_json::from_str(&claims_json) {
        Ok(c) => c,
        Err(e) => {
            debug!("Failed to parse claims: {}", e);
            return Err("Invalid claims format".to_string());
        },
    };

    if let Some(exp) = claims.exp {
        let now = Utc::now().timestamp() as u64;
        if exp < now {
            debug!("Token expired at {} (now: {})", exp, now);
            return Err("Token expired".to_string());
        }
    }

    let created_at = claims.iat
        .and_then(|timestamp| Utc.timestamp_opt(timestamp as i64, 0).single());

    let user = User {
        id: claims.sub,
        email: claims.email,
        role: claims.role,
        created_at,
    };

    debug!("Token validated successfully for user: {}", user.id);
    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "unit-test-secret";

    #[test]
    fn issued_token_validates() {
        let token = issue_token("user-1", Some("a@b.com"), "doctor", SECRET, 1).unwrap();
        let user = validate_token(&token, SECRET).unwrap();

        assert_eq!(user.id, "user-1");
        assert_eq!(user.email.as_deref(), Some("a@b.com"));
        assert!(user.is_doctor());
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = issue_token("user-1", None, "admin", SECRET, 1).unwrap();
        assert_eq!(validate_token(&token, "other").unwrap_err(), "Invalid token signature");
    }

    #[test]
    fn expired_token_is_rejected() {
        let token = issue_token("user-1", None, "admin", SECRET, -1).unwrap();
        assert_eq!(validate_token(&token, SECRET).unwrap_err(), "Token expired");
    }

    #[test]
    fn malformed_token_is_rejected() {
        assert_eq!(validate_token("abc", SECRET).unwrap_err(), "Invalid token format");
        assert!(issue_token("u", None, "user", "", 1).is_err());
    }
}
