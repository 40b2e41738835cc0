// rest_api/tests/api.rs

use std::fs;
use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header::CONTENT_TYPE, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use rx_lib::SledPrescriptionStorage;
use rx_rest_api::{build_router, AppState};

fn app() -> Router {
    let storage = SledPrescriptionStorage::temporary().unwrap();
    build_router(AppState::new(Arc::new(storage)), None)
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => request
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string())),
        None => request.body(Body::empty()),
    }
    .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };
    (status, value)
}

fn body(first: &str, last: &str, ssn: &str) -> Value {
    json!({
        "first_name": first,
        "last_name": last,
        "amount": 12.5,
        "patient_name": "Jane Doe",
        "patient_ssn": ssn,
        "prescription_name": "Lisinopril",
    })
}

#[tokio::test]
async fn create_returns_201_with_expanded_doctor() {
    let app = app();
    let (status, json) = send(&app, Method::POST, "/api/prescriptions", Some(body("Gregory", "House", "123-45-6789"))).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["success"], true);
    assert_eq!(json["data"]["prescription_name"], "Lisinopril");
    assert_eq!(json["data"]["amount"], 12.5);
    assert_eq!(json["data"]["doctor_id"]["first_name"], "Gregory");
    assert_eq!(json["data"]["doctor_id"]["last_name"], "House");
    assert!(json["data"]["_id"].is_string());
    assert!(json["data"]["order_time"].is_string());
}

#[tokio::test]
async fn duplicate_and_malformed_ssns_are_400() {
    let app = app();
    send(&app, Method::POST, "/api/prescriptions", Some(body("Gregory", "House", "123-45-6789"))).await;

    let (status, json) = send(&app, Method::POST, "/api/prescriptions", Some(body("Gregory", "House", "123-45-6789"))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["success"], false);
    assert_eq!(json["message"], "A prescription with this SSN already exists");

    let (status, json) = send(&app, Method::POST, "/api/prescriptions", Some(body("Gregory", "House", "123456789"))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], "Invalid SSN format. Please use XXX-XX-XXXX format.");
}

#[tokio::test]
async fn schema_violations_are_joined_into_one_message() {
    let app = app();
    let (status, json) = send(
        &app,
        Method::POST,
        "/api/prescriptions",
        Some(json!({"first_name": "Gregory", "last_name": "House", "amount": "", "patient_ssn": "123-45-6789"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        json["message"],
        "prescription_name is required, amount is required, patient_name is required"
    );
}

#[tokio::test]
async fn malformed_json_uses_the_error_envelope() {
    let app = app();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/prescriptions")
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(json["success"], false);
    assert!(json["message"].is_string());
}

#[tokio::test]
async fn update_rules_for_ssn_and_missing_ids() {
    let app = app();
    let (_, first) = send(&app, Method::POST, "/api/prescriptions", Some(body("Eric", "Foreman", "111-11-1111"))).await;
    send(&app, Method::POST, "/api/prescriptions", Some(body("Eric", "Foreman", "222-22-2222"))).await;
    let id = first["data"]["_id"].as_str().unwrap().to_string();
    let uri = format!("/api/prescriptions/{}", id);

    let mut own = body("Remy", "Hadley", "111-11-1111");
    own["amount"] = json!("30");
    let (status, json) = send(&app, Method::PUT, &uri, Some(own)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["amount"], 30.0);
    assert_eq!(json["data"]["doctor_id"]["first_name"], "Remy");

    let (status, json) = send(&app, Method::PUT, &uri, Some(body("Eric", "Foreman", "222-22-2222"))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], "A prescription with this SSN already exists");

    let missing = format!("/api/prescriptions/{}", uuid_like());
    let (status, json) = send(&app, Method::PUT, &missing, Some(body("Eric", "Foreman", "333-33-3333"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["message"], "Prescription not found");
}

fn uuid_like() -> &'static str {
    "7b0c1f7e-2a4b-4c1e-9d3f-5e6a7b8c9d0e"
}

#[tokio::test]
async fn delete_then_delete_again() {
    let app = app();
    let (_, created) = send(&app, Method::POST, "/api/prescriptions", Some(body("Eric", "Foreman", "111-11-1111"))).await;
    let uri = format!("/api/prescriptions/{}", created["data"]["_id"].as_str().unwrap());

    let (status, json) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, json!({"success": true, "message": "Prescription deleted successfully"}));

    let (status, json) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["success"], false);

    let (status, _) = send(&app, Method::DELETE, "/api/prescriptions/garbage", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn lists_expand_references() {
    let app = app();
    send(&app, Method::POST, "/api/prescriptions", Some(body("Lisa", "Cuddy", "111-11-1111"))).await;
    send(&app, Method::POST, "/api/prescriptions", Some(body("Lisa", "Cuddy", "222-22-2222"))).await;

    let (status, json) = send(&app, Method::GET, "/api/prescriptions", None).await;
    assert_eq!(status, StatusCode::OK);
    let data = json["data"].as_array().unwrap();
    assert_eq!(data.len(), 2);
    assert_eq!(data[0]["doctor_id"]["last_name"], "Cuddy");

    let (status, json) = send(&app, Method::GET, "/api/doctors", None).await;
    assert_eq!(status, StatusCode::OK);
    let doctors = json["data"].as_array().unwrap();
    assert_eq!(doctors.len(), 1);
    assert_eq!(doctors[0]["first_name"], "Lisa");
    assert_eq!(doctors[0]["prescriptions"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn report_and_filters() {
    let app = app();
    send(&app, Method::POST, "/api/prescriptions", Some(body("Lisa", "Cuddy", "111-11-1111"))).await;
    let mut other = body("James", "Wilson", "222-22-2222");
    other["prescription_name"] = json!("Morphine");
    other["amount"] = json!(7.5);
    send(&app, Method::POST, "/api/prescriptions", Some(other)).await;

    let (status, json) = send(&app, Method::POST, "/api/reports", Some(json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    assert_eq!(json["stats"]["totalPrescriptions"], 2);
    assert_eq!(json["stats"]["totalAmount"], 20.0);
    assert_eq!(json["stats"]["averageAmount"], 10.0);
    assert_eq!(json["stats"]["prescriptionsByDoctor"]["James Wilson"], 1);
    assert_eq!(json["stats"]["prescriptionsByName"]["Lisinopril"], 1);

    let (_, json) = send(&app, Method::POST, "/api/reports", Some(json!({"prescription_name": "morph"}))).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);
    assert_eq!(json["data"][0]["prescription_name"], "Morphine");

    let (status, json) = send(&app, Method::POST, "/api/reports", Some(json!({"startDate": "yesterday-ish"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["success"], false);

    let (status, json) = send(&app, Method::GET, "/api/report-filters", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["prescriptionNames"], json!(["Lisinopril", "Morphine"]));
    let doctors = json["data"]["doctors"].as_array().unwrap();
    assert_eq!(doctors[0]["last_name"], "Cuddy");
    assert_eq!(doctors[0]["prescriptionCount"], 1);
    assert_eq!(doctors[1]["last_name"], "Wilson");
}

#[tokio::test]
async fn health_reports_storage_type() {
    let (status, json) = send(&app(), Method::GET, "/api/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert_eq!(json["storage"], "Sled");
}

#[tokio::test]
async fn static_front_end_falls_back_to_index() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("index.html"), "<html>rx</html>").unwrap();
    fs::write(dir.path().join("app.js"), "console.log('rx')").unwrap();

    let storage = SledPrescriptionStorage::temporary().unwrap();
    let app = build_router(AppState::new(Arc::new(storage)), Some(dir.path()));

    let (status, json) = send(&app, Method::GET, "/app.js", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, Value::String("console.log('rx')".into()));

    let (status, json) = send(&app, Method::GET, "/reports/monthly", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, Value::String("<html>rx</html>".into()));

    let (status, _) = send(&app, Method::GET, "/api/prescriptions", None).await;
    assert_eq!(status, StatusCode::OK);
}
