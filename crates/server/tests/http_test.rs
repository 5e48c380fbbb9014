//! Router-level tests exercising the HTTP surface end to end.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use vitaledge_core::PipelineConfig;
use vitaledge_pipeline::EdgeProcessor;
use vitaledge_server::{build_router, AppState};

fn app() -> Router {
    let config = PipelineConfig::from_json_str(include_str!("../../../config/vitaledge.json"))
        .expect("sample config parses");
    let processor = EdgeProcessor::from_config(&config);
    build_router(Arc::new(AppState::new(processor)))
}

async fn call(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn spo2(id: &str, value: f64, timestamp: &str) -> Value {
    json!({
        "measurement_id": id,
        "patient_id": "p-1",
        "measurement_type": "SPO2",
        "value": value,
        "timestamp": timestamp,
    })
}

#[tokio::test]
async fn health_returns_ok() {
    let app = app();
    let (status, body) = call(&app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn ingest_accepts_a_clean_measurement() {
    let app = app();
    let (status, body) = call(
        &app,
        post_json("/ingest", spo2("m-1", 97.0, "2025-06-14T12:00:00Z")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["measurement"]["measurement_id"], "m-1");
}

#[tokio::test]
async fn ingest_rejects_unparseable_timestamp() {
    let app = app();
    let (status, body) = call(
        &app,
        post_json("/ingest", spo2("m-1", 97.0, "not-a-time")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "discarded");
    assert_eq!(body["reason"], "invalid timestamp");
}

#[tokio::test]
async fn ingest_reports_alerts() {
    let app = app();
    let (_, body) = call(
        &app,
        post_json("/ingest", spo2("m-1", 85.0, "2025-06-14T12:00:00Z")),
    )
    .await;
    assert_eq!(body["status"], "alert");
    assert_eq!(body["alert"]["anomaly"]["anomaly_type"], "THRESHOLD_LOW");
    assert_eq!(body["alert"]["severity"], "HIGH");
}

#[tokio::test]
async fn status_reports_pipeline_state() {
    let app = app();
    let (status, body) = call(&app, get("/status")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["online"], true);
    assert_eq!(body["cached_events"], 0);
}

#[tokio::test]
async fn offline_ingest_flush_round_trip() {
    let app = app();

    let (_, body) = call(&app, post_json("/connectivity", json!({"online": false}))).await;
    assert_eq!(body["online"], false);

    // Flushing while still offline is a distinct status.
    let (_, body) = call(&app, post_json("/flush", Value::Null)).await;
    assert_eq!(body["status"], "offline");
    assert!(body["flushed"].is_null());

    // An alert-worthy measurement is cached, not lost.
    let (_, body) = call(
        &app,
        post_json("/ingest", spo2("m-1", 85.0, "2025-06-14T12:00:00Z")),
    )
    .await;
    assert_eq!(body["status"], "alert");

    let (_, body) = call(&app, get("/status")).await;
    assert_eq!(body["cached_events"], 2);

    let (_, body) = call(&app, post_json("/connectivity", json!({"online": true}))).await;
    assert_eq!(body["online"], true);

    let (_, body) = call(&app, post_json("/flush", Value::Null)).await;
    assert_eq!(body["status"], "flushed");
    assert_eq!(body["flushed"]["measurements"].as_array().unwrap().len(), 1);
    assert_eq!(body["flushed"]["alerts"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn patient_history_is_most_recent_first() {
    let app = app();
    call(
        &app,
        post_json("/ingest", spo2("m-1", 97.0, "2025-06-14T12:00:00Z")),
    )
    .await;
    call(
        &app,
        post_json("/ingest", spo2("m-2", 96.0, "2025-06-14T12:00:10Z")),
    )
    .await;

    let (status, body) = call(&app, get("/patients/p-1/history?limit=1")).await;
    assert_eq!(status, StatusCode::OK);
    let records = body.as_array().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["kind"], "MEASUREMENT");
    assert_eq!(records[0]["measurement"]["measurement_id"], "m-2");
}
