use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use tower::ServiceExt;
use serde_json::{json, Value};
use wiremock::{MockServer, Mock, ResponseTemplate};
use wiremock::matchers::{body_partial_json, method, path, query_param};

use appointment_cell::router::appointment_routes;
use shared_utils::test_utils::{TestConfig, TestUser, JwtTestUtils, MockStoreResponses};

fn create_test_app(server: &MockServer) -> Router {
    appointment_routes(TestConfig::with_base_url(&server.uri()).to_arc())
}

async fn body_json(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&body).unwrap()
}

async fn mount_doctor(server: &MockServer, doctor: Value) {
    Mock::given(method("GET"))
        .and(path("/rest/v1/doctors"))
        .and(query_param("id", "eq.d1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([doctor])))
        .mount(server)
        .await;
}

async fn mount_bookings(server: &MockServer, date: &str, bookings: Value) {
    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("doctor_id", "eq.d1"))
        .and(query_param("appointment_date", format!("eq.{}", date)))
        .and(query_param("status", "neq.cancelled"))
        .respond_with(ResponseTemplate::new(200).set_body_json(bookings))
        .mount(server)
        .await;
}

fn booking_body(time: &str) -> String {
    json!({
        "doctor_id": "d1",
        "appointmentDate": "2026-01-05",
        "appointmentTime": time,
        "reason": "Chest pain",
        "patient_name": "Ali Raza",
        "patient_email": "ali@example.com"
    })
    .to_string()
}

fn post_booking(time: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/book")
        .header("content-type", "application/json")
        .body(Body::from(booking_body(time)))
        .unwrap()
}

#[tokio::test]
async fn test_available_slots_excludes_bookings() {
    let server = MockServer::start().await;
    mount_doctor(&server, MockStoreResponses::doctor_row("d1", None)).await;
    mount_bookings(&server, "2026-01-05", json!([
        MockStoreResponses::appointment_row("a1", "d1", "2026-01-05", "10:00 AM", "scheduled"),
        MockStoreResponses::appointment_row("a2", "d1", "2026-01-05", "05:00 PM", "completed")
    ])).await;

    let request = Request::builder()
        .uri("/available-slots/d1/2026-01-05")
        .body(Body::empty())
        .unwrap();

    let response = create_test_app(&server).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json_response = body_json(response).await;
    assert_eq!(json_response["data"]["morningSlots"], json!(["9:00 AM", "11:00 AM"]));
    assert_eq!(json_response["data"]["eveningSlots"], json!(["6:00 PM"]));
}

#[tokio::test]
async fn test_available_slots_on_day_off() {
    let server = MockServer::start().await;
    mount_doctor(&server, MockStoreResponses::doctor_row("d1", None)).await;
    mount_bookings(&server, "2026-01-04", json!([])).await;

    let request = Request::builder()
        .uri("/available-slots/d1/2026-01-04")
        .body(Body::empty())
        .unwrap();

    let response = create_test_app(&server).oneshot(request).await.unwrap();
    let json_response = body_json(response).await;
    assert_eq!(json_response["data"], json!({ "morningSlots": [], "eveningSlots": [] }));
}

#[tokio::test]
async fn test_available_slots_without_stored_availability() {
    let server = MockServer::start().await;
    let mut doctor = MockStoreResponses::doctor_row("d1", None);
    doctor["availability"] = Value::Null;
    mount_doctor(&server, doctor).await;

    let request = Request::builder()
        .uri("/available-slots/d1/2026-01-05")
        .body(Body::empty())
        .unwrap();

    let response = create_test_app(&server).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json_response = body_json(response).await;
    assert_eq!(json_response["data"]["morningSlots"], json!([]));
}

#[tokio::test]
async fn test_available_slots_bad_date() {
    let server = MockServer::start().await;

    let request = Request::builder()
        .uri("/available-slots/d1/not-a-date")
        .body(Body::empty())
        .unwrap();

    let response = create_test_app(&server).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "Invalid date format");
}

#[tokio::test]
async fn test_book_appointment() {
    let server = MockServer::start().await;
    mount_doctor(&server, MockStoreResponses::doctor_row("d1", None)).await;
    mount_bookings(&server, "2026-01-05", json!([])).await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/appointments"))
        .and(body_partial_json(json!({
            "doctor_id": "d1",
            "appointment_time": "9:00 AM",
            "appointment_date": "2026-01-05",
            "status": "scheduled",
            "patient_phone": ""
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            MockStoreResponses::appointment_row("a1", "d1", "2026-01-05", "9:00 AM", "scheduled")
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let response = create_test_app(&server).oneshot(post_booking("09:00 AM")).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let json_response = body_json(response).await;
    assert_eq!(json_response["message"], "Appointment booked successfully");
    assert_eq!(json_response["data"]["id"], "a1");
}

#[tokio::test]
async fn test_double_booking_is_conflict() {
    let server = MockServer::start().await;
    mount_doctor(&server, MockStoreResponses::doctor_row("d1", None)).await;
    mount_bookings(&server, "2026-01-05", json!([
        MockStoreResponses::appointment_row("a1", "d1", "2026-01-05", "9:00 AM", "scheduled")
    ])).await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let response = create_test_app(&server).oneshot(post_booking("09:00 AM")).await.unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(response).await["error"], "This time slot is no longer available");
}

#[tokio::test]
async fn test_slot_claimed_during_booking_is_conflict() {
    let server = MockServer::start().await;
    mount_doctor(&server, MockStoreResponses::doctor_row("d1", None)).await;
    mount_bookings(&server, "2026-01-05", json!([])).await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "code": "23505",
            "message": "duplicate key value violates unique constraint \"appointments_live_slot_key\""
        })))
        .expect(1)
        .mount(&server)
        .await;

    let response = create_test_app(&server).oneshot(post_booking("09:00 AM")).await.unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(response).await["error"], "This time slot is no longer available");
}

#[tokio::test]
async fn test_book_with_unknown_doctor() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/doctors"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let response = create_test_app(&server).oneshot(post_booking("9:00 AM")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_check_slot() {
    let server = MockServer::start().await;
    mount_bookings(&server, "2026-01-05", json!([
        MockStoreResponses::appointment_row("a1", "d1", "2026-01-05", "9:00 AM", "scheduled")
    ])).await;

    let taken = Request::builder()
        .uri("/check-slot/d1/2026-01-05/9%3A00%20AM")
        .body(Body::empty())
        .unwrap();
    let response = create_test_app(&server).oneshot(taken).await.unwrap();
    assert_eq!(body_json(response).await["available"], false);

    let free = Request::builder()
        .uri("/check-slot/d1/2026-01-05/10%3A00%20AM")
        .body(Body::empty())
        .unwrap();
    let response = create_test_app(&server).oneshot(free).await.unwrap();
    assert_eq!(body_json(response).await["available"], true);
}

#[tokio::test]
async fn test_patient_listing_requires_email() {
    let server = MockServer::start().await;

    let request = Request::builder().uri("/patient").body(Body::empty()).unwrap();
    let response = create_test_app(&server).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "Patient email is required");
}

#[tokio::test]
async fn test_patient_listing_populates_doctor() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("patient_email", "eq.ali@example.com"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockStoreResponses::appointment_row("a2", "d1", "2026-01-06", "9:00 AM", "scheduled"),
            MockStoreResponses::appointment_row("a1", "d1", "2026-01-05", "5:00 PM", "scheduled")
        ])))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/doctors"))
        .and(query_param("select", "id,name,specialization,profile"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": "d1", "name": "Dr. Ayesha Khan", "specialization": "Cardiologist", "profile": "p.png" }
        ])))
        .mount(&server)
        .await;

    let request = Request::builder()
        .uri("/patient?patient_email=ali%40example.com")
        .body(Body::empty())
        .unwrap();

    let response = create_test_app(&server).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json_response = body_json(response).await;
    assert_eq!(json_response["count"], 2);
    assert_eq!(json_response["data"][0]["id"], "a1");
    assert_eq!(json_response["data"][0]["doctor"]["name"], "Dr. Ayesha Khan");
}

#[tokio::test]
async fn test_doctor_listing_requires_staff() {
    let server = MockServer::start().await;

    let anonymous = Request::builder().uri("/doctor/d1").body(Body::empty()).unwrap();
    let response = create_test_app(&server).oneshot(anonymous).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let patient = TestUser::patient("ali@example.com");
    let as_patient = Request::builder()
        .uri("/doctor/d1")
        .header("authorization", JwtTestUtils::bearer(&patient))
        .body(Body::empty())
        .unwrap();
    let response = create_test_app(&server).oneshot(as_patient).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_update_status() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("id", "eq.a1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockStoreResponses::appointment_row("a1", "d1", "2026-01-05", "9:00 AM", "scheduled")
        ])))
        .mount(&server)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/appointments"))
        .and(body_partial_json(json!({ "status": "no-show" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockStoreResponses::appointment_row("a1", "d1", "2026-01-05", "9:00 AM", "no-show")
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let doctor = TestUser::doctor("doc@example.com");
    let request = Request::builder()
        .method("PUT")
        .uri("/a1/status")
        .header("authorization", JwtTestUtils::bearer(&doctor))
        .header("content-type", "application/json")
        .body(Body::from(json!({ "status": "no-show" }).to_string()))
        .unwrap();

    let response = create_test_app(&server).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["message"], "Appointment status updated to no-show");
}

#[tokio::test]
async fn test_update_status_rejects_unknown_status() {
    let server = MockServer::start().await;
    let admin = TestUser::admin("admin@example.com");

    let request = Request::builder()
        .method("PUT")
        .uri("/a1/status")
        .header("authorization", JwtTestUtils::bearer(&admin))
        .header("content-type", "application/json")
        .body(Body::from(json!({ "status": "confirmed" }).to_string()))
        .unwrap();

    let response = create_test_app(&server).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_confirmation_as_text_attachment() {
    let server = MockServer::start().await;
    mount_doctor(&server, MockStoreResponses::doctor_row("d1", None)).await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("id", "eq.a1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockStoreResponses::appointment_row("a1", "d1", "2026-01-05", "9:00 AM", "scheduled")
        ])))
        .mount(&server)
        .await;

    let request = Request::builder()
        .uri("/a1/confirmation?format=text")
        .body(Body::empty())
        .unwrap();

    let response = create_test_app(&server).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=HealthLink_Appointment_Ali_Raza.txt"
    );

    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let text = String::from_utf8(body.to_vec()).unwrap();
    assert!(text.contains("Date:   Monday, January 5, 2026"));
    assert!(text.contains("Doctor:    Dr. Ayesha Khan"));
}

#[tokio::test]
async fn test_confirmation_as_json() {
    let server = MockServer::start().await;
    mount_doctor(&server, MockStoreResponses::doctor_row("d1", None)).await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockStoreResponses::appointment_row("a1", "d1", "2026-01-05", "9:00 AM", "scheduled")
        ])))
        .mount(&server)
        .await;

    let request = Request::builder().uri("/a1/confirmation").body(Body::empty()).unwrap();
    let response = create_test_app(&server).oneshot(request).await.unwrap();

    let json_response = body_json(response).await;
    assert_eq!(json_response["data"]["doctor_specialty"], "Cardiologist");
    assert_eq!(json_response["data"]["fee"], 2500.0);
    assert_eq!(json_response["data"]["reference"], "APA1");
}
