use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use tower::ServiceExt;
use serde_json::{json, Value};
use wiremock::{MockServer, Mock, ResponseTemplate};
use wiremock::matchers::{method, path, query_param};

use auth_cell::router::auth_routes;
use auth_cell::services::password::PasswordService;
use shared_utils::test_utils::{TestConfig, TestUser, JwtTestUtils, MockStoreResponses, TEST_JWT_SECRET};
use shared_utils::jwt::validate_token;

const PASSWORD: &str = "clinic-pass-42";

fn app(server: &MockServer) -> Router {
    auth_routes(TestConfig::with_base_url(&server.uri()).to_arc())
}

async fn body_json(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&body).unwrap()
}

fn login_request(body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/login")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn mount_rows(server: &MockServer, table: &str, key: &str, value: &str, rows: Value) {
    Mock::given(method("GET"))
        .and(path(format!("/rest/v1/{}", table)))
        .and(query_param(key, format!("eq.{}", value)))
        .respond_with(ResponseTemplate::new(200).set_body_json(rows))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_status_route() {
    let server = MockServer::start().await;

    let response = app(&server)
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["message"], "Authentication API is working!");
}

#[tokio::test]
async fn test_admin_login_issues_admin_token() {
    let server = MockServer::start().await;
    let hash = PasswordService::hash_password(PASSWORD).unwrap();

    mount_rows(&server, "admins", "email", "admin@healthlink.pk",
        json!([MockStoreResponses::admin_row("adm-1", "admin@healthlink.pk", &hash)])).await;

    let response = app(&server)
        .oneshot(login_request(json!({
            "email": "admin@healthlink.pk",
            "password": PASSWORD,
            "role": "admin"
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["user"]["role"], "admin");
    assert_eq!(body["user"]["name"], "Site Admin");

    let user = validate_token(body["authToken"].as_str().unwrap(), TEST_JWT_SECRET).unwrap();
    assert_eq!(user.id, "adm-1");
    assert!(user.is_admin());
}

#[tokio::test]
async fn test_admin_login_wrong_password_is_unauthorized() {
    let server = MockServer::start().await;
    let hash = PasswordService::hash_password(PASSWORD).unwrap();

    mount_rows(&server, "admins", "email", "admin@healthlink.pk",
        json!([MockStoreResponses::admin_row("adm-1", "admin@healthlink.pk", &hash)])).await;

    let response = app(&server)
        .oneshot(login_request(json!({
            "email": "admin@healthlink.pk",
            "password": "guess",
            "role": "admin"
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["error"], "Invalid admin credentials");
}

#[tokio::test]
async fn test_verified_doctor_login() {
    let server = MockServer::start().await;
    let hash = PasswordService::hash_password(PASSWORD).unwrap();

    mount_rows(&server, "users", "email", "ayesha@clinic.pk",
        json!([MockStoreResponses::user_row("u-7", "ayesha@clinic.pk", "doctor", &hash)])).await;
    mount_rows(&server, "doctors", "email", "ayesha@clinic.pk",
        json!([MockStoreResponses::doctor_row("d1", Some("u-7"))])).await;

    let response = app(&server)
        .oneshot(login_request(json!({
            "email": "ayesha@clinic.pk",
            "password": PASSWORD,
            "role": "doctor"
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["verification_status"], "approved");
    assert_eq!(body["doctor_id"], "d1");
    assert_eq!(body["user_id"], "u-7");

    let user = validate_token(body["authToken"].as_str().unwrap(), TEST_JWT_SECRET).unwrap();
    assert_eq!(user.id, "u-7");
    assert!(user.is_doctor());
}

#[tokio::test]
async fn test_pending_doctor_login_reports_application_status() {
    let server = MockServer::start().await;
    let hash = PasswordService::hash_password(PASSWORD).unwrap();

    mount_rows(&server, "users", "email", "bilal@clinic.pk",
        json!([MockStoreResponses::user_row("u-9", "bilal@clinic.pk", "doctor", &hash)])).await;
    mount_rows(&server, "doctors", "email", "bilal@clinic.pk", json!([])).await;
    mount_rows(&server, "unverified_doctors", "email", "bilal@clinic.pk",
        json!([MockStoreResponses::application_row("app-3", "u-9", "pending_approval")])).await;

    let response = app(&server)
        .oneshot(login_request(json!({
            "email": "bilal@clinic.pk",
            "password": PASSWORD,
            "role": "doctor"
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["verification_status"], "pending_approval");
    assert_eq!(body["doctor_id"], "app-3");
}

#[tokio::test]
async fn test_rejected_doctor_cannot_login() {
    let server = MockServer::start().await;
    let hash = PasswordService::hash_password(PASSWORD).unwrap();

    mount_rows(&server, "users", "email", "bilal@clinic.pk",
        json!([MockStoreResponses::user_row("u-9", "bilal@clinic.pk", "doctor", &hash)])).await;
    mount_rows(&server, "doctors", "email", "bilal@clinic.pk", json!([])).await;
    mount_rows(&server, "unverified_doctors", "email", "bilal@clinic.pk",
        json!([MockStoreResponses::application_row("app-3", "u-9", "rejected")])).await;

    let response = app(&server)
        .oneshot(login_request(json!({
            "email": "bilal@clinic.pk",
            "password": PASSWORD,
            "role": "doctor"
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_json(response).await["error"], "Your application has been rejected");
}

#[tokio::test]
async fn test_patient_account_is_not_a_doctor() {
    let server = MockServer::start().await;
    let hash = PasswordService::hash_password(PASSWORD).unwrap();

    mount_rows(&server, "users", "email", "ali@example.com",
        json!([MockStoreResponses::user_row("u-1", "ali@example.com", "user", &hash)])).await;

    let response = app(&server)
        .oneshot(login_request(json!({
            "email": "ali@example.com",
            "password": PASSWORD,
            "role": "doctor"
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "You're not registered as a doctor");
}

#[tokio::test]
async fn test_login_rejects_unknown_role_and_bad_email() {
    let server = MockServer::start().await;

    let response = app(&server)
        .oneshot(login_request(json!({
            "email": "ali@example.com",
            "password": PASSWORD,
            "role": "nurse"
        })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "Invalid role specified");

    let response = app(&server)
        .oneshot(login_request(json!({
            "email": "ali-at-example",
            "password": PASSWORD,
            "role": "admin"
        })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_getuser_requires_token() {
    let server = MockServer::start().await;

    let request = Request::builder()
        .method("POST")
        .uri("/getuser")
        .body(Body::empty())
        .unwrap();

    let response = app(&server).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_getuser_for_pending_doctor() {
    let server = MockServer::start().await;
    let doctor = TestUser::doctor("bilal@clinic.pk").with_id("u-9");

    mount_rows(&server, "users", "id", "u-9",
        json!([MockStoreResponses::user_row("u-9", "bilal@clinic.pk", "doctor", "$argon2id$stored")])).await;
    mount_rows(&server, "doctors", "email", "bilal@clinic.pk", json!([])).await;
    mount_rows(&server, "unverified_doctors", "email", "bilal@clinic.pk",
        json!([MockStoreResponses::application_row("app-3", "u-9", "pending")])).await;

    let request = Request::builder()
        .method("POST")
        .uri("/getuser")
        .header("Authorization", JwtTestUtils::bearer(&doctor))
        .body(Body::empty())
        .unwrap();

    let response = app(&server).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["user"]["verification_status"], "pending");
    assert_eq!(body["user"]["doctor_profile"]["id"], "app-3");
    assert!(body["user"].get("password").is_none());
}
