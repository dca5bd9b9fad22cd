//! End-to-end tests through the router.

use axum::body::{to_bytes, Body};
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use patient_records_core::PatientRegistry;
use patient_records_server::{build_router, AppState, ServerConfig};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

fn app() -> Router {
    build_router(
        &ServerConfig::default(),
        AppState::with_rule_model(PatientRegistry::in_memory()),
    )
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

fn patient(id: &str, weight: f64) -> Value {
    json!({
        "id": id,
        "name": "Ravi Kumar",
        "city": "Delhi",
        "age": 30,
        "gender": "male",
        "height": 1.75,
        "weight": weight
    })
}

#[tokio::test]
async fn test_informational_routes() {
    let app = app();

    let (status, body) = send(&app, Method::GET, "/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["message"].is_string());

    let (status, body) = send(&app, Method::GET, "/about", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["message"].is_string());

    let (status, body) = send(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok"}));
}

#[tokio::test]
async fn test_create_view_edit_delete() {
    let app = app();

    let (status, body) = send(&app, Method::POST, "/create", Some(patient("P001", 70.0))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["patient"]["bmi"], 22.86);
    assert_eq!(body["patient"]["verdict"], "Normal");

    let (status, body) = send(&app, Method::GET, "/patient/P001", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Ravi Kumar");
    assert_eq!(body["city_tier"], 1);

    let (status, body) = send(
        &app,
        Method::PUT,
        "/edit_patient/P001",
        Some(json!({"weight": 80})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["patient"]["bmi"], 26.12);
    assert_eq!(body["patient"]["verdict"], "Overweight");

    let (status, body) = send(&app, Method::GET, "/view", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["P001"]["weight"], 80.0);

    let (status, _) = send(&app, Method::DELETE, "/delete_patient/P001", None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, Method::GET, "/patient/P001", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["kind"], "not_found");
}

#[tokio::test]
async fn test_error_statuses() {
    let app = app();
    send(&app, Method::POST, "/create", Some(patient("P001", 70.0))).await;

    let (status, body) = send(&app, Method::POST, "/create", Some(patient("P001", 70.0))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "conflict");

    let (status, body) = send(
        &app,
        Method::POST,
        "/create",
        Some(json!({"id": "P002", "name": "X", "age": 200})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["kind"], "validation");
    assert!(body["issues"].as_array().unwrap().len() >= 4);

    let (status, body) = send(
        &app,
        Method::PUT,
        "/edit_patient/P001",
        Some(json!({"age": 70})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["kind"], "business_rule");
    assert_eq!(body["rule"], "emergency_contact_required");

    let (status, _) = send(&app, Method::PUT, "/edit_patient/P404", Some(json!({"age": 40}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, Method::DELETE, "/delete_patient/P404", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_malformed_body_is_rejected() {
    let app = app();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/create")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_sort() {
    let app = app();
    for (id, weight) in [("P001", 90.0), ("P002", 55.0), ("P003", 70.0)] {
        send(&app, Method::POST, "/create", Some(patient(id, weight))).await;
    }

    let (status, body) = send(&app, Method::GET, "/sort?sort_by=weight&order=desc", None).await;
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<_> = body["sorted"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(ids, vec!["P001", "P003", "P002"]);

    let (status, body) = send(&app, Method::GET, "/sort?sort_by=bmi", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["sorted"][0]["id"], "P002");

    let (status, body) = send(&app, Method::GET, "/sort?sort_by=age", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "invalid_argument");

    let (status, _) = send(&app, Method::GET, "/sort", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_signup_and_login() {
    let app = app();
    let form = json!({
        "name": "Sara Ali",
        "email": "sara@example.com",
        "password": "s3cretpw",
        "city": "Karachi",
        "age": 27,
        "gender": "female",
        "height": 1.62,
        "weight": 55
    });

    let (status, body) = send(&app, Method::POST, "/signup", Some(form.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["patient_id"], "P001");
    assert_eq!(body["patient_record"]["name"], "Sara Ali");
    assert!(body["patient_record"].get("password").is_none());

    let (status, body) = send(&app, Method::POST, "/signup", Some(form)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Email already registered");

    let (status, body) = send(
        &app,
        Method::POST,
        "/login",
        Some(json!({"email": "sara@example.com", "password": "s3cretpw"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["patient_id"], "P001");
    assert_eq!(body["name"], "Sara Ali");

    let (status, body) = send(
        &app,
        Method::POST,
        "/login",
        Some(json!({"email": "sara@example.com", "password": "wrong-one"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid email or password");
}

#[tokio::test]
async fn test_predict() {
    let app = app();

    let (status, body) = send(
        &app,
        Method::POST,
        "/predict",
        Some(json!({
            "age": 30,
            "weight": 70,
            "height": 1.75,
            "income_lpa": 8,
            "smoker": false,
            "city": "Mumbai",
            "occupation": "private_job"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["insurance_premium_category"], "Low");

    let (status, body) = send(
        &app,
        Method::POST,
        "/predict",
        Some(json!({"age": 30, "height": 3.0, "occupation": "pilot"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["kind"], "validation");
}

#[tokio::test]
async fn test_json_backend_persists() {
    let dir = TempDir::new().unwrap();
    let config = ServerConfig {
        data_dir: dir.path().to_path_buf(),
        ..Default::default()
    };

    let app = build_router(
        &config,
        AppState::with_rule_model(config.open_registry().unwrap()),
    );
    let (status, _) = send(&app, Method::POST, "/create", Some(patient("P001", 70.0))).await;
    assert_eq!(status, StatusCode::CREATED);

    let reopened = build_router(
        &config,
        AppState::with_rule_model(config.open_registry().unwrap()),
    );
    let (status, body) = send(&reopened, Method::GET, "/patient/P001", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["bmi"], 22.86);
    assert!(dir.path().join("patient.json").exists());
}
