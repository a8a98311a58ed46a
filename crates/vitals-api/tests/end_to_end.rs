//! Full-stack tests: real schema verifier, real JSON file, real scorecard.

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

use vitals_api::{PatientApi, PremiumApi};
use vitals_config::ServiceConfig;
use vitals_core::{ConsistencyMode, PatientService};
use vitals_premium::ScorecardModel;
use vitals_store::JsonFileStore;
use vitals_verify::SchemaVerifier;

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string())),
        None => builder.body(Body::empty()),
    }
    .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn patient_app(dir: &TempDir, mode: ConsistencyMode) -> Router {
    let store = JsonFileStore::open_or_create(dir.path().join("patients.json")).unwrap();
    PatientApi::new(
        PatientService::new(Box::new(store), mode),
        Box::new(SchemaVerifier::new().unwrap()),
        "Outpatient records",
    )
    .router()
}

fn body(id: &str, gender: &str) -> Value {
    json!({
        "id": id, "name": "Meera Iyer", "city": "Chennai", "age": 45,
        "gender": gender, "height": 1.6, "weight": 58.0
    })
}

#[tokio::test]
async fn patient_lifecycle_persists_to_disk() {
    let dir = TempDir::new().unwrap();
    let app = patient_app(&dir, ConsistencyMode::Optimistic);

    let (status, _) = send(&app, Method::POST, "/create", Some(body("P001", "others"))).await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, _) = send(
        &app,
        Method::PUT,
        "/edit/P001",
        Some(json!({ "city": "Madurai", "bmi": 99.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let raw = std::fs::read_to_string(dir.path().join("patients.json")).unwrap();
    let on_disk: Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(on_disk["P001"]["city"], json!("Madurai"));
    assert_eq!(on_disk["P001"]["bmi"], json!(22.66));
    assert_eq!(on_disk["P001"]["verdict"], json!("Normal weight"));

    // A second router over the same file sees the same data.
    let reopened = patient_app(&dir, ConsistencyMode::LastWriteWins);
    let (status, fetched) = send(&reopened, Method::GET, "/patient/P001", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["gender"], json!("others"));

    let (status, _) = send(&reopened, Method::DELETE, "/delete/P001", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(send(&app, Method::GET, "/view", None).await.1, json!({}));
}

#[tokio::test]
async fn schema_violations_are_all_reported() {
    let dir = TempDir::new().unwrap();
    let app = patient_app(&dir, ConsistencyMode::Serialized);

    let mut bad = body("P001", "robot");
    bad["age"] = json!(0);
    bad["weight"] = json!(-3);
    let (status, response) = send(&app, Method::POST, "/create", Some(bad)).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let mut fields: Vec<&str> = response["detail"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v["field"].as_str().unwrap())
        .collect();
    fields.sort();
    assert_eq!(fields, vec!["age", "gender", "weight"]);
}

#[tokio::test]
async fn update_rejects_null_and_others_gender() {
    let dir = TempDir::new().unwrap();
    let app = patient_app(&dir, ConsistencyMode::Serialized);
    send(&app, Method::POST, "/create", Some(body("P001", "female"))).await;

    let (status, null_name) =
        send(&app, Method::PUT, "/edit/P001", Some(json!({ "name": null }))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(null_name["detail"][0]["field"], json!("name"));

    let (status, _) =
        send(&app, Method::PUT, "/edit/P001", Some(json!({ "gender": "others" }))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    assert_eq!(
        send(&app, Method::GET, "/patient/P001", None).await.1["name"],
        json!("Meera Iyer")
    );
}

#[tokio::test]
async fn missing_patient_file_is_500_without_create() {
    let dir = TempDir::new().unwrap();
    let store = JsonFileStore::open(dir.path().join("absent.json"));
    let app = PatientApi::new(
        PatientService::new(Box::new(store), ConsistencyMode::LastWriteWins),
        Box::new(SchemaVerifier::new().unwrap()),
        "",
    )
    .router();
    let (status, _) = send(&app, Method::GET, "/view", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn premium_prediction_with_sample_config() {
    let config = ServiceConfig::from_toml_str(include_str!("../../../config/vitals.toml")).unwrap();
    let app = PremiumApi::from_config(
        Box::new(ScorecardModel::new(config.premium.model_version.clone())),
        Box::new(SchemaVerifier::new().unwrap()),
        &config.premium,
    )
    .router();

    let (_, health) = send(&app, Method::GET, "/health", None).await;
    assert_eq!(health["status"], json!("healthy"));
    assert_eq!(health["version"], json!(config.premium.model_version));

    let (status, response) = send(
        &app,
        Method::POST,
        "/predict",
        Some(json!({
            "age": 67, "weight": 98.0, "height": 1.7, "income_lpa": 30.0,
            "smoker": true, "city": "delhi", "occupation": "retired"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let prediction = &response["response"];
    assert_eq!(prediction["predicted_category"], json!("High"));
    assert!(prediction["confidence"].as_f64().unwrap() > 0.5);

    let (status, _) = send(
        &app,
        Method::POST,
        "/predict",
        Some(json!({ "age": 30, "smoker": "sometimes" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}
