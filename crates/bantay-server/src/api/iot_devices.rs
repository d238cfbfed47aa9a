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
use bantay_common::types::{ArchiveRequest, DeviceStatus, IotDevice, IotDeviceInput};
use bantay_rules::{validate_iot_device, Mode};
use bantay_storage::IotFilter;
use serde::Deserialize;
use utoipa_axum::{router::OpenApiRouter, routes};

#[derive(Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
struct IotListParams {
    /// Contains-match on device name, location name or custom address
    #[param(required = false)]
    search: Option<String>,
    /// active, inactive or maintenance
    #[param(required = false)]
    status: Option<String>,
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

/// List IoT devices with their location and camera names.
#[utoipa::path(
    get,
    path = "/v1/iot-devices",
    tag = "IoT",
    params(IotListParams),
    responses(
        (status = 200, description = "IoT device page", body = Vec<IotDevice>),
        (status = 400, description = "Unknown status filter", body = ApiError)
    )
)]
async fn list_iot_devices(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
    Query(params): Query<IotListParams>,
) -> impl IntoResponse {
    let status = match parse_filter::<DeviceStatus>(&trace_id, "status", params.status.as_deref()) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    let limit = resolve_limit(params.limit, &state.config.pagination);
    let offset = resolve_offset(params.offset);
    let filter = IotFilter {
        search: params.search,
        status,
        archived: params.archived,
    };

    let total = match state.store.count_iot_devices(&filter) {
        Ok(c) => c,
        Err(e) => return storage_failure(&trace_id, e, "Failed to count IoT devices"),
    };
    match state.store.list_iot_devices(&filter, limit, offset) {
        Ok(items) => success_paginated_response(StatusCode::OK, &trace_id, items, total, limit, offset),
        Err(e) => storage_failure(&trace_id, e, "Failed to list IoT devices"),
    }
}

/// Register an IoT device.
///
/// The device is placed either at a predefined location (`location_id`) or
/// at a custom spot (`custom_address`, `custom_latitude` and
/// `custom_longitude` together). A predefined location wins when both are
/// sent.
#[utoipa::path(
    post,
    path = "/v1/iot-devices",
    tag = "IoT",
    request_body = IotDeviceInput,
    responses(
        (status = 201, description = "IoT device created", body = IotDevice),
        (status = 422, description = "Validation failed", body = ValidationErrorData)
    )
)]
async fn create_iot_device(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
    RecordBody(record): RecordBody,
) -> impl IntoResponse {
    let input = match validate_iot_device(&record, &Mode::Create, &*state.store) {
        Ok(input) => input,
        Err(e) => return validation_failure(&trace_id, e),
    };
    match state.store.insert_iot_device(&input) {
        Ok(device) => {
            tracing::info!(id = %device.id, name = %device.device_name, "IoT device created");
            success_response(StatusCode::CREATED, &trace_id, device)
        }
        Err(e) => storage_failure(&trace_id, e, "Failed to create IoT device"),
    }
}

#[utoipa::path(
    get,
    path = "/v1/iot-devices/{id}",
    tag = "IoT",
    params(("id" = String, Path, description = "IoT device id")),
    responses(
        (status = 200, description = "IoT device", body = IotDevice),
        (status = 404, description = "Unknown id", body = ApiError)
    )
)]
async fn get_iot_device(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    found_response(
        &trace_id,
        "iot device",
        &id,
        state.store.get_iot_device(&id),
        "Failed to load IoT device",
    )
}

/// Replace an IoT device. Switching to a predefined location clears the
/// stored custom address and coordinates.
#[utoipa::path(
    put,
    path = "/v1/iot-devices/{id}",
    tag = "IoT",
    params(("id" = String, Path, description = "IoT device id")),
    request_body = IotDeviceInput,
    responses(
        (status = 200, description = "IoT device replaced", body = IotDevice),
        (status = 404, description = "Unknown id", body = ApiError),
        (status = 422, description = "Validation failed", body = ValidationErrorData)
    )
)]
async fn replace_iot_device(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
    Path(id): Path<String>,
    RecordBody(record): RecordBody,
) -> impl IntoResponse {
    match state.store.get_iot_device(&id) {
        Ok(Some(_)) => {}
        Ok(None) => return not_found(&trace_id, "iot device", &id),
        Err(e) => return storage_failure(&trace_id, e, "Failed to load IoT device"),
    }
    let input = match validate_iot_device(&record, &Mode::Update { id: &id }, &*state.store) {
        Ok(input) => input,
        Err(e) => return validation_failure(&trace_id, e),
    };
    found_response(
        &trace_id,
        "iot device",
        &id,
        state.store.replace_iot_device(&id, &input),
        "Failed to replace IoT device",
    )
}

#[utoipa::path(
    post,
    path = "/v1/iot-devices/{id}/archive",
    tag = "IoT",
    params(("id" = String, Path, description = "IoT device id")),
    request_body = ArchiveRequest,
    responses(
        (status = 200, description = "IoT device archived", body = IotDevice),
        (status = 400, description = "Missing confirmation", body = ApiError),
        (status = 404, description = "Unknown id", body = ApiError)
    )
)]
async fn archive_iot_device(
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
        "iot device",
        &id,
        state.store.set_iot_device_archived(&id, true),
        "Failed to archive IoT device",
    )
}

#[utoipa::path(
    post,
    path = "/v1/iot-devices/{id}/restore",
    tag = "IoT",
    params(("id" = String, Path, description = "IoT device id")),
    request_body = ArchiveRequest,
    responses(
        (status = 200, description = "IoT device restored", body = IotDevice),
        (status = 400, description = "Missing confirmation", body = ApiError),
        (status = 404, description = "Unknown id", body = ApiError)
    )
)]
async fn restore_iot_device(
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
        "iot device",
        &id,
        state.store.set_iot_device_archived(&id, false),
        "Failed to restore IoT device",
    )
}

pub fn iot_device_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(list_iot_devices, create_iot_device))
        .routes(routes!(get_iot_device, replace_iot_device))
        .routes(routes!(archive_iot_device))
        .routes(routes!(restore_iot_device))
}
