pub mod cctv;
pub mod contacts;
pub mod iot_devices;
pub mod locations;
pub mod pagination;
pub mod posts;
pub mod users;

use crate::logging::TraceId;
use crate::state::AppState;
use axum::body::Bytes;
use axum::extract::{Extension, FromRequest, Request, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use bantay_common::types::{ArchiveRequest, Role};
use bantay_common::FieldErrors;
use bantay_rules::{RawRecord, ValidationError};
use bantay_storage::StorageError;
use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use utoipa::ToSchema;
use utoipa_axum::{router::OpenApiRouter, routes};

/// API error envelope
#[derive(Serialize, ToSchema)]
pub struct ApiError {
    /// Error code
    pub err_code: i32,
    /// Error message
    pub err_msg: String,
    /// Trace id of the request
    pub trace_id: String,
}

/// Envelope wrapping every response body
#[derive(Serialize)]
pub struct ApiResponse<T>
where
    T: Serialize,
{
    /// 0 on success
    pub err_code: i32,
    /// `success` on success
    pub err_msg: String,
    pub trace_id: String,
    pub data: Option<T>,
}

/// One page of a list endpoint
#[derive(Serialize, ToSchema)]
pub struct PaginatedData<T>
where
    T: Serialize,
{
    pub items: Vec<T>,
    /// Rows matching the filter across all pages
    pub total: u64,
    pub limit: usize,
    pub offset: usize,
}

/// Body of a 422 response: field name -> message
#[derive(Serialize, ToSchema)]
pub struct ValidationErrorData {
    pub errors: FieldErrors,
}

pub fn success_response<T>(status: StatusCode, trace_id: &str, data: T) -> Response
where
    T: Serialize,
{
    (
        status,
        Json(ApiResponse {
            err_code: 0,
            err_msg: "success".to_string(),
            trace_id: trace_id.to_string(),
            data: Some(data),
        }),
    )
        .into_response()
}

pub fn success_paginated_response<T>(
    status: StatusCode,
    trace_id: &str,
    items: Vec<T>,
    total: u64,
    limit: usize,
    offset: usize,
) -> Response
where
    T: Serialize,
{
    success_response(
        status,
        trace_id,
        PaginatedData {
            items,
            total,
            limit,
            offset,
        },
    )
}

fn to_custom_error_code(code: &str) -> i32 {
    match code {
        "bad_request" => 1001,
        "not_found" => 1004,
        "conflict" => 1005,
        "validation_failed" => 1010,
        "confirmation_required" => 1011,
        "payload_too_large" => 1012,
        "storage_error" => 1501,
        "internal_error" => 1500,
        _ => 1999,
    }
}

pub fn error_response(status: StatusCode, trace_id: &str, code: &str, msg: &str) -> Response {
    (
        status,
        Json(ApiResponse::<Value> {
            err_code: to_custom_error_code(code),
            err_msg: msg.to_string(),
            trace_id: trace_id.to_string(),
            data: None,
        }),
    )
        .into_response()
}

/// 422 with the per-field messages in `data.errors`.
pub fn field_errors_response(trace_id: &str, errors: FieldErrors) -> Response {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(ApiResponse {
            err_code: to_custom_error_code("validation_failed"),
            err_msg: "The given data was invalid".to_string(),
            trace_id: trace_id.to_string(),
            data: Some(ValidationErrorData { errors }),
        }),
    )
        .into_response()
}

pub fn validation_failure(trace_id: &str, err: ValidationError) -> Response {
    match err {
        ValidationError::Invalid(errors) => field_errors_response(trace_id, errors),
        ValidationError::Lookup(msg) => {
            tracing::error!(error = %msg, "Validation lookup failed");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                trace_id,
                "storage_error",
                "Internal storage error",
            )
        }
    }
}

pub fn storage_failure(trace_id: &str, err: StorageError, context: &str) -> Response {
    match err {
        StorageError::NotFound { entity, id } => error_response(
            StatusCode::NOT_FOUND,
            trace_id,
            "not_found",
            &format!("{entity} '{id}' not found"),
        ),
        StorageError::Conflict(msg) => {
            tracing::warn!(error = %msg, "{context}");
            error_response(StatusCode::CONFLICT, trace_id, "conflict", &msg)
        }
        other => {
            tracing::error!(error = %other, "{context}");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                trace_id,
                "storage_error",
                "Internal storage error",
            )
        }
    }
}

pub fn not_found(trace_id: &str, entity: &str, id: &str) -> Response {
    error_response(
        StatusCode::NOT_FOUND,
        trace_id,
        "not_found",
        &format!("{entity} '{id}' not found"),
    )
}

/// Responds with the record, 404 when the lookup came back empty.
pub fn found_response<T: Serialize>(
    trace_id: &str,
    entity: &str,
    id: &str,
    result: bantay_storage::Result<Option<T>>,
    context: &str,
) -> Response {
    match result {
        Ok(Some(record)) => success_response(StatusCode::OK, trace_id, record),
        Ok(None) => not_found(trace_id, entity, id),
        Err(e) => storage_failure(trace_id, e, context),
    }
}

/// Archive and restore need an explicit `{"confirm": true}` body.
pub fn require_confirmation(trace_id: &str, body: &Bytes) -> Result<(), Response> {
    let confirmed = serde_json::from_slice::<ArchiveRequest>(body)
        .map(|req| req.confirm)
        .unwrap_or(false);
    if confirmed {
        Ok(())
    } else {
        Err(error_response(
            StatusCode::BAD_REQUEST,
            trace_id,
            "confirmation_required",
            "Send {\"confirm\": true} to confirm this action",
        ))
    }
}

/// A submitted form as a raw JSON object, rejected with an envelope when
/// the body is not a JSON object.
pub struct RecordBody(pub RawRecord);

impl<S> FromRequest<S> for RecordBody
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let trace_id = req
            .extensions()
            .get::<TraceId>()
            .map(|t| t.0.clone())
            .unwrap_or_default();
        match Json::<Value>::from_request(req, state).await {
            Ok(Json(Value::Object(record))) => Ok(RecordBody(record)),
            Ok(_) => Err(error_response(
                StatusCode::BAD_REQUEST,
                &trace_id,
                "bad_request",
                "Request body must be a JSON object",
            )),
            Err(rejection) => Err(error_response(
                StatusCode::BAD_REQUEST,
                &trace_id,
                "bad_request",
                &rejection.body_text(),
            )),
        }
    }
}

/// Parses an optional enum-valued query parameter.
pub fn parse_filter<T: std::str::FromStr>(
    trace_id: &str,
    name: &str,
    raw: Option<&str>,
) -> Result<Option<T>, Response> {
    match raw.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(value) => value.parse::<T>().map(Some).map_err(|_| {
            error_response(
                StatusCode::BAD_REQUEST,
                trace_id,
                "bad_request",
                &format!("Invalid value '{value}' for '{name}'"),
            )
        }),
    }
}

/// Health status
#[derive(Serialize, ToSchema)]
struct HealthResponse {
    /// Server version
    version: String,
    /// Seconds since start
    uptime_secs: i64,
    /// `ok` when the database answers
    storage_status: String,
}

/// Service health. Storage is probed with a role lookup.
#[utoipa::path(
    get,
    path = "/v1/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service health", body = HealthResponse)
    )
)]
async fn health(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
) -> impl IntoResponse {
    let uptime = (Utc::now() - state.start_time).num_seconds();
    let storage_status = match state.store.list_roles() {
        Ok(_) => "ok".to_string(),
        Err(e) => {
            tracing::error!(error = %e, "Health check storage probe failed");
            "error".to_string()
        }
    };
    success_response(
        StatusCode::OK,
        &trace_id,
        HealthResponse {
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_secs: uptime,
            storage_status,
        },
    )
}

/// Roles a user can be assigned. Role 3 (Purok Leader) signs in with a PIN.
#[utoipa::path(
    get,
    path = "/v1/roles",
    tag = "Users",
    responses(
        (status = 200, description = "Role list", body = Vec<Role>),
        (status = 500, description = "Storage error", body = ApiError)
    )
)]
async fn list_roles(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
) -> impl IntoResponse {
    match state.store.list_roles() {
        Ok(roles) => success_response(StatusCode::OK, &trace_id, roles),
        Err(e) => storage_failure(&trace_id, e, "Failed to list roles"),
    }
}

pub fn public_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(routes!(health))
}

pub fn console_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(list_roles))
        .merge(locations::location_routes())
        .merge(cctv::cctv_routes())
        .merge(contacts::contact_routes())
        .merge(iot_devices::iot_device_routes())
        .merge(posts::post_routes())
        .merge(users::user_routes())
}
