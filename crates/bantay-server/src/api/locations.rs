use crate::api::pagination::{self, resolve_limit, resolve_offset};
use crate::api::{
    field_errors_response, found_response, not_found, require_confirmation, storage_failure,
    success_paginated_response, success_response, ApiError, RecordBody, ValidationErrorData,
};
use crate::logging::TraceId;
use crate::state::AppState;
use axum::body::Bytes;
use axum::extract::{Extension, Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use bantay_common::types::{ArchiveRequest, Location, LocationInput};
use bantay_rules::{validate_location, Mode};
use bantay_storage::LocationFilter;
use serde::Deserialize;
use utoipa_axum::{router::OpenApiRouter, routes};

#[derive(Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
struct LocationListParams {
    /// Contains-match on name, barangay or landmark
    #[param(required = false)]
    search: Option<String>,
    /// Exact barangay
    #[param(required = false)]
    barangay: Option<String>,
    /// List archived locations instead of active ones
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

/// List locations.
/// Default order: name; default page: `limit=20&offset=0`.
#[utoipa::path(
    get,
    path = "/v1/locations",
    tag = "Locations",
    params(LocationListParams),
    responses(
        (status = 200, description = "Location page", body = Vec<Location>),
        (status = 500, description = "Storage error", body = ApiError)
    )
)]
async fn list_locations(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
    Query(params): Query<LocationListParams>,
) -> impl IntoResponse {
    let limit = resolve_limit(params.limit, &state.config.pagination);
    let offset = resolve_offset(params.offset);
    let filter = LocationFilter {
        search: params.search,
        barangay: params.barangay.filter(|b| !b.trim().is_empty()),
        archived: params.archived,
    };

    let total = match state.store.count_locations(&filter) {
        Ok(c) => c,
        Err(e) => return storage_failure(&trace_id, e, "Failed to count locations"),
    };
    match state.store.list_locations(&filter, limit, offset) {
        Ok(items) => success_paginated_response(StatusCode::OK, &trace_id, items, total, limit, offset),
        Err(e) => storage_failure(&trace_id, e, "Failed to list locations"),
    }
}

/// Create a location.
#[utoipa::path(
    post,
    path = "/v1/locations",
    tag = "Locations",
    request_body = LocationInput,
    responses(
        (status = 201, description = "Location created", body = Location),
        (status = 400, description = "Body is not a JSON object", body = ApiError),
        (status = 422, description = "Validation failed", body = ValidationErrorData)
    )
)]
async fn create_location(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
    RecordBody(record): RecordBody,
) -> impl IntoResponse {
    let input = match validate_location(&record, &Mode::Create) {
        Ok(input) => input,
        Err(errors) => return field_errors_response(&trace_id, errors),
    };
    match state.store.insert_location(&input) {
        Ok(location) => {
            tracing::info!(id = %location.id, name = %location.location_name, "Location created");
            success_response(StatusCode::CREATED, &trace_id, location)
        }
        Err(e) => storage_failure(&trace_id, e, "Failed to create location"),
    }
}

#[utoipa::path(
    get,
    path = "/v1/locations/{id}",
    tag = "Locations",
    params(("id" = String, Path, description = "Location id")),
    responses(
        (status = 200, description = "Location", body = Location),
        (status = 404, description = "Unknown id", body = ApiError)
    )
)]
async fn get_location(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    found_response(
        &trace_id,
        "location",
        &id,
        state.store.get_location(&id),
        "Failed to load location",
    )
}

/// Replace every field of a location.
#[utoipa::path(
    put,
    path = "/v1/locations/{id}",
    tag = "Locations",
    params(("id" = String, Path, description = "Location id")),
    request_body = LocationInput,
    responses(
        (status = 200, description = "Location replaced", body = Location),
        (status = 404, description = "Unknown id", body = ApiError),
        (status = 422, description = "Validation failed", body = ValidationErrorData)
    )
)]
async fn replace_location(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
    Path(id): Path<String>,
    RecordBody(record): RecordBody,
) -> impl IntoResponse {
    match state.store.get_location(&id) {
        Ok(Some(_)) => {}
        Ok(None) => return not_found(&trace_id, "location", &id),
        Err(e) => return storage_failure(&trace_id, e, "Failed to load location"),
    }
    let input = match validate_location(&record, &Mode::Update { id: &id }) {
        Ok(input) => input,
        Err(errors) => return field_errors_response(&trace_id, errors),
    };
    found_response(
        &trace_id,
        "location",
        &id,
        state.store.replace_location(&id, &input),
        "Failed to replace location",
    )
}

/// Archive a location. Devices pointing at it keep their reference.
#[utoipa::path(
    post,
    path = "/v1/locations/{id}/archive",
    tag = "Locations",
    params(("id" = String, Path, description = "Location id")),
    request_body = ArchiveRequest,
    responses(
        (status = 200, description = "Location archived", body = Location),
        (status = 400, description = "Missing confirmation", body = ApiError),
        (status = 404, description = "Unknown id", body = ApiError)
    )
)]
async fn archive_location(
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
        "location",
        &id,
        state.store.set_location_archived(&id, true),
        "Failed to archive location",
    )
}

#[utoipa::path(
    post,
    path = "/v1/locations/{id}/restore",
    tag = "Locations",
    params(("id" = String, Path, description = "Location id")),
    request_body = ArchiveRequest,
    responses(
        (status = 200, description = "Location restored", body = Location),
        (status = 400, description = "Missing confirmation", body = ApiError),
        (status = 404, description = "Unknown id", body = ApiError)
    )
)]
async fn restore_location(
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
        "location",
        &id,
        state.store.set_location_archived(&id, false),
        "Failed to restore location",
    )
}

pub fn location_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(list_locations, create_location))
        .routes(routes!(get_location, replace_location))
        .routes(routes!(archive_location))
        .routes(routes!(restore_location))
}
