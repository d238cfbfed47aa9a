#![allow(dead_code)]

use anyhow::Result;
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use bantay_server::app;
use bantay_server::config::ServerConfig;
use bantay_server::state::AppState;
use bantay_storage::ConsoleStore;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::TempDir;
use tower::util::ServiceExt;

pub struct TestContext {
    pub temp_dir: TempDir,
    pub state: AppState,
    pub app: axum::Router,
}

pub fn build_test_context() -> Result<TestContext> {
    bantay_common::id::init(1, 1);

    let temp_dir = tempfile::tempdir()?;
    let store = Arc::new(ConsoleStore::open(temp_dir.path())?);

    let config = ServerConfig {
        http_port: 8080,
        data_dir: temp_dir.path().to_string_lossy().to_string(),
        cors_allowed_origins: Vec::new(),
        pagination: Default::default(),
    };

    let state = AppState::new(store, config);
    let app = app::build_http_app(state.clone());
    Ok(TestContext {
        temp_dir,
        state,
        app,
    })
}

async fn send(app: &axum::Router, req: Request<Body>) -> (StatusCode, Value, Option<String>) {
    let resp = app
        .clone()
        .oneshot(req)
        .await
        .expect("request should be handled");
    let status = resp.status();
    let trace_id = resp
        .headers()
        .get("x-trace-id")
        .and_then(|h| h.to_str().ok())
        .map(|s| s.to_string());
    let bytes = to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("body should read");
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice::<Value>(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).to_string()))
    };
    (status, json, trace_id)
}

pub async fn request_json(
    app: &axum::Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value, Option<String>) {
    let req_body = body.unwrap_or(Value::Null).to_string();
    let req = Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", "application/json")
        .body(Body::from(req_body))
        .expect("request should build");
    send(app, req).await
}

pub async fn request_no_body(
    app: &axum::Router,
    method: &str,
    uri: &str,
) -> (StatusCode, Value, Option<String>) {
    let req = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .expect("request should build");
    send(app, req).await
}

const BOUNDARY: &str = "bantay-test-boundary";

/// Sends one file part named `field` as `multipart/form-data`.
pub async fn request_multipart(
    app: &axum::Router,
    uri: &str,
    field: &str,
    file_name: &str,
    content_type: &str,
    data: &[u8],
) -> (StatusCode, Value, Option<String>) {
    let mut body = Vec::with_capacity(data.len() + 256);
    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(format!("Content-Type: {content_type}\r\n\r\n").as_bytes());
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    let req = Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            "Content-Type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .expect("request should build");
    send(app, req).await
}

pub fn confirm() -> Option<Value> {
    Some(json!({"confirm": true}))
}

pub fn assert_ok_envelope(json: &Value) {
    assert_eq!(json["err_code"], 0);
    assert!(json["err_msg"].is_string());
    assert!(json.get("trace_id").is_some());
}

pub fn assert_err_envelope(json: &Value, err_code: i32) {
    assert_eq!(json["err_code"], err_code);
    assert!(json["err_msg"].is_string());
    assert!(json.get("trace_id").is_some());
    assert!(json.get("data").is_some());
    assert!(json["data"].is_null());
}

/// Asserts a 422 envelope and returns its field -> message map.
pub fn assert_validation_envelope(json: &Value) -> serde_json::Map<String, Value> {
    assert_eq!(json["err_code"], 1010);
    assert!(json["err_msg"].is_string());
    json["data"]["errors"]
        .as_object()
        .cloned()
        .expect("validation errors should be an object")
}

pub fn decode_data<T: DeserializeOwned>(json: &Value) -> T {
    serde_json::from_value(json["data"].clone()).expect("data should decode")
}

/// Creates a location through the API and returns its id.
pub async fn create_location(app: &axum::Router, name: &str) -> String {
    let (status, body, _) = request_json(
        app,
        "POST",
        "/v1/locations",
        Some(json!({
            "location_name": name,
            "barangay": "176-E",
            "latitude": 14.7565,
            "longitude": 121.0312
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["data"]["id"]
        .as_str()
        .expect("location id should exist")
        .to_string()
}

pub async fn create_post(app: &axum::Router, title: &str) -> String {
    let (status, body, _) = request_json(
        app,
        "POST",
        "/v1/posts",
        Some(json!({"title": title, "content": "Clean-up drive on Saturday.", "status": "draft"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["data"]["id"]
        .as_str()
        .expect("post id should exist")
        .to_string()
}
