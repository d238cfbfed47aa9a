use crate::api::pagination::{self, resolve_limit, resolve_offset};
use crate::api::{
    found_response, not_found, parse_filter, require_confirmation, storage_failure,
    success_paginated_response, success_response, validation_failure, ApiError, RecordBody,
    ValidationErrorData,
};
use crate::logging::TraceId;
use crate::state::AppState;
use axum::body::Bytes;
use axum::extract::{Extension, Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use bantay_common::types::{ArchiveRequest, CctvDevice, CctvDeviceInput, DeviceStatus};
use bantay_rules::{validate_cctv_device, Mode};
use bantay_storage::CctvFilter;
use serde::Deserialize;
use utoipa_axum::{router::OpenApiRouter, routes};

#[derive(Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
struct CctvListParams {
    /// Contains-match on device name or location name
    #[param(required = false)]
    search: Option<String>,
    /// active, inactive or maintenance
    #[param(required = false)]
    status: Option<String>,
    #[param(required = false)]
    location_id: Option<String>,
    #[param(required = false)]
    #[serde(default)]
    archived: bool,
    #[param(required = false)]
    #[serde(default, deserialize_with = "pagination::deserialize_optional_u64")]
    limit: Option<u64>,
    #[param(required = false)]
    #[serde(default, deserialize_with = "pagination::deserialize_optional_u64")]
    offset: Option<u64>,
}

/// List CCTV devices with their location names.
#[utoipa::path(
    get,
    path = "/v1/cctv-devices",
    tag = "CCTV",
    params(CctvListParams),
    responses(
        (status = 200, description = "CCTV device page", body = Vec<CctvDevice>),
        (status = 400, description = "Unknown status filter", body = ApiError)
    )
)]
async fn list_cctv_devices(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
    Query(params): Query<CctvListParams>,
) -> impl IntoResponse {
    let status = match parse_filter::<DeviceStatus>(&trace_id, "status", params.status.as_deref()) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    let limit = resolve_limit(params.limit, &state.config.pagination);
    let offset = resolve_offset(params.offset);
    let filter = CctvFilter {
        search: params.search,
        status,
        location_id: params.location_id.filter(|id| !id.trim().is_empty()),
        archived: params.archived,
    };

    let total = match state.store.count_cctv_devices(&filter) {
        Ok(c) => c,
        Err(e) => return storage_failure(&trace_id, e, "Failed to count CCTV devices"),
    };
    match state.store.list_cctv_devices(&filter, limit, offset) {
        Ok(items) => success_paginated_response(StatusCode::OK, &trace_id, items, total, limit, offset),
        Err(e) => storage_failure(&trace_id, e, "Failed to list CCTV devices"),
    }
}

/// Register a CCTV device at an existing location.
#[utoipa::path(
    post,
    path = "/v1/cctv-devices",
    tag = "CCTV",
    request_body = CctvDeviceInput,
    responses(
        (status = 201, description = "CCTV device created", body = CctvDevice),
        (status = 422, description = "Validation failed", body = ValidationErrorData)
    )
)]
async fn create_cctv_device(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
    RecordBody(record): RecordBody,
) -> impl IntoResponse {
    let input = match validate_cctv_device(&record, &Mode::Create, &*state.store) {
        Ok(input) => input,
        Err(e) => return validation_failure(&trace_id, e),
    };
    match state.store.insert_cctv_device(&input) {
        Ok(device) => {
            tracing::info!(id = %device.id, name = %device.device_name, "CCTV device created");
            success_response(StatusCode::CREATED, &trace_id, device)
        }
        Err(e) => storage_failure(&trace_id, e, "Failed to create CCTV device"),
    }
}

#[utoipa::path(
    get,
    path = "/v1/cctv-devices/{id}",
    tag = "CCTV",
    params(("id" = String, Path, description = "CCTV device id")),
    responses(
        (status = 200, description = "CCTV device", body = CctvDevice),
        (status = 404, description = "Unknown id", body = ApiError)
    )
)]
async fn get_cctv_device(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    found_response(
        &trace_id,
        "cctv device",
        &id,
        state.store.get_cctv_device(&id),
        "Failed to load CCTV device",
    )
}

#[utoipa::path(
    put,
    path = "/v1/cctv-devices/{id}",
    tag = "CCTV",
    params(("id" = String, Path, description = "CCTV device id")),
    request_body = CctvDeviceInput,
    responses(
        (status = 200, description = "CCTV device replaced", body = CctvDevice),
        (status = 404, description = "Unknown id", body = ApiError),
        (status = 422, description = "Validation failed", body = ValidationErrorData)
    )
)]
async fn replace_cctv_device(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
    Path(id): Path<String>,
    RecordBody(record): RecordBody,
) -> impl IntoResponse {
    match state.store.get_cctv_device(&id) {
        Ok(Some(_)) => {}
        Ok(None) => return not_found(&trace_id, "cctv device", &id),
        Err(e) => return storage_failure(&trace_id, e, "Failed to load CCTV device"),
    }
    let input =
        match validate_cctv_device(&record, &Mode::Update { id: &id }, &*state.store) {
            Ok(input) => input,
            Err(e) => return validation_failure(&trace_id, e),
        };
    found_response(
        &trace_id,
        "cctv device",
        &id,
        state.store.replace_cctv_device(&id, &input),
        "Failed to replace CCTV device",
    )
}

#[utoipa::path(
    post,
    path = "/v1/cctv-devices/{id}/archive",
    tag = "CCTV",
    params(("id" = String, Path, description = "CCTV device id")),
    request_body = ArchiveRequest,
    responses(
        (status = 200, description = "CCTV device archived", body = CctvDevice),
        (status = 400, description = "Missing confirmation", body = ApiError),
        (status = 404, description = "Unknown id", body = ApiError)
    )
)]
async fn archive_cctv_device(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> impl IntoResponse {
    if let Err(resp) = require_confirmation(&trace_id, &body) {
        return resp;
    }
    found_response(
        &trace_id,
        "cctv device",
        &id,
        state.store.set_cctv_device_archived(&id, true),
        "Failed to archive CCTV device",
    )
}

#[utoipa::path(
    post,
    path = "/v1/cctv-devices/{id}/restore",
    tag = "CCTV",
    params(("id" = String, Path, description = "CCTV device id")),
    request_body = ArchiveRequest,
    responses(
        (status = 200, description = "CCTV device restored", body = CctvDevice),
        (status = 400, description = "Missing confirmation", body = ApiError),
        (status = 404, description = "Unknown id", body = ApiError)
    )
)]
async fn restore_cctv_device(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> impl IntoResponse {
    if let Err(resp) = require_confirmation(&trace_id, &body) {
        return resp;
    }
    found_response(
        &trace_id,
        "cctv device",
        &id,
        state.store.set_cctv_device_archived(&id, false),
        "Failed to restore CCTV device",
    )
}

pub fn cctv_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(list_cctv_devices, create_cctv_device))
        .routes(routes!(get_cctv_device, replace_cctv_device))
        .routes(routes!(archive_cctv_device))
        .routes(routes!(restore_cctv_device))
}
