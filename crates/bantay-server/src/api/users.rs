use crate::api::pagination::{self, resolve_limit, resolve_offset};
use crate::api::{
    error_response, found_response, not_found, require_confirmation, storage_failure,
    success_paginated_response, success_response, validation_failure, ApiError, RecordBody,
    ValidationErrorData,
};
use crate::logging::TraceId;
use crate::state::AppState;
use axum::body::Bytes;
use axum::extract::{Extension, Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use bantay_common::types::{ArchiveRequest, User, UserInput};
use bantay_rules::{validate_user, Mode};
use bantay_storage::UserFilter;
use serde::Deserialize;
use utoipa_axum::{router::OpenApiRouter, routes};

#[derive(Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
struct UserListParams {
    /// Contains-match on any name part or the email
    #[param(required = false)]
    search: Option<String>,
    #[param(required = false)]
    role_id: Option<String>,
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

/// List console users. Credentials are never part of the response.
#[utoipa::path(
    get,
    path = "/v1/users",
    tag = "Users",
    params(UserListParams),
    responses(
        (status = 200, description = "User page", body = Vec<User>),
        (status = 400, description = "Malformed role filter", body = ApiError)
    )
)]
async fn list_users(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
    Query(params): Query<UserListParams>,
) -> impl IntoResponse {
    let role_id = match params.role_id.as_deref().map(str::trim).filter(|r| !r.is_empty()) {
        None => None,
        Some(raw) => match raw.parse::<i64>() {
            Ok(id) => Some(id),
            Err(_) => {
                return error_response(
                    StatusCode::BAD_REQUEST,
                    &trace_id,
                    "bad_request",
                    &format!("Invalid value '{raw}' for 'role_id'"),
                )
            }
        },
    };
    let limit = resolve_limit(params.limit, &state.config.pagination);
    let offset = resolve_offset(params.offset);
    let filter = UserFilter {
        search: params.search,
        role_id,
        archived: params.archived,
    };

    let total = match state.store.count_users(&filter) {
        Ok(c) => c,
        Err(e) => return storage_failure(&trace_id, e, "Failed to count users"),
    };
    match state.store.list_users(&filter, limit, offset) {
        Ok(items) => success_paginated_response(StatusCode::OK, &trace_id, items, total, limit, offset),
        Err(e) => storage_failure(&trace_id, e, "Failed to list users"),
    }
}

/// Create a console user.
///
/// Purok Leaders (role 3) send a numeric PIN of at least 4 digits in
/// `password`; every other role needs a password of at least 8 characters
/// with letters, numbers and symbols.
#[utoipa::path(
    post,
    path = "/v1/users",
    tag = "Users",
    request_body = UserInput,
    responses(
        (status = 201, description = "User created", body = User),
        (status = 422, description = "Validation failed", body = ValidationErrorData)
    )
)]
async fn create_user(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
    RecordBody(record): RecordBody,
) -> impl IntoResponse {
    let input = match validate_user(&record, &Mode::Create, &*state.store) {
        Ok(input) => input,
        Err(e) => return validation_failure(&trace_id, e),
    };
    match state.store.insert_user(&input) {
        Ok(user) => {
            tracing::info!(id = %user.id, role_id = user.role_id, "User created");
            success_response(StatusCode::CREATED, &trace_id, user)
        }
        Err(e) => storage_failure(&trace_id, e, "Failed to create user"),
    }
}

#[utoipa::path(
    get,
    path = "/v1/users/{id}",
    tag = "Users",
    params(("id" = String, Path, description = "User id")),
    responses(
        (status = 200, description = "User", body = User),
        (status = 404, description = "Unknown id", body = ApiError)
    )
)]
async fn get_user(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    found_response(
        &trace_id,
        "user",
        &id,
        state.store.get_user(&id),
        "Failed to load user",
    )
}

/// Replace a user. A blank `password` keeps the stored credential.
#[utoipa::path(
    put,
    path = "/v1/users/{id}",
    tag = "Users",
    params(("id" = String, Path, description = "User id")),
    request_body = UserInput,
    responses(
        (status = 200, description = "User replaced", body = User),
        (status = 404, description = "Unknown id", body = ApiError),
        (status = 422, description = "Validation failed", body = ValidationErrorData)
    )
)]
async fn replace_user(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
    Path(id): Path<String>,
    RecordBody(record): RecordBody,
) -> impl IntoResponse {
    match state.store.get_user(&id) {
        Ok(Some(_)) => {}
        Ok(None) => return not_found(&trace_id, "user", &id),
        Err(e) => return storage_failure(&trace_id, e, "Failed to load user"),
    }
    let input = match validate_user(&record, &Mode::Update { id: &id }, &*state.store) {
        Ok(input) => input,
        Err(e) => return validation_failure(&trace_id, e),
    };
    found_response(
        &trace_id,
        "user",
        &id,
        state.store.replace_user(&id, &input),
        "Failed to replace user",
    )
}

#[utoipa::path(
    post,
    path = "/v1/users/{id}/archive",
    tag = "Users",
    params(("id" = String, Path, description = "User id")),
    request_body = ArchiveRequest,
    responses(
        (status = 200, description = "User archived", body = User),
        (status = 400, description = "Missing confirmation", body = ApiError),
        (status = 404, description = "Unknown id", body = ApiError)
    )
)]
async fn archive_user(
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
        "user",
        &id,
        state.store.set_user_archived(&id, true),
        "Failed to archive user",
    )
}

#[utoipa::path(
    post,
    path = "/v1/users/{id}/restore",
    tag = "Users",
    params(("id" = String, Path, description = "User id")),
    request_body = ArchiveRequest,
    responses(
        (status = 200, description = "User restored", body = User),
        (status = 400, description = "Missing confirmation", body = ApiError),
        (status = 404, description = "Unknown id", body = ApiError)
    )
)]
async fn restore_user(
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
        "user",
        &id,
        state.store.set_user_archived(&id, false),
        "Failed to restore user",
    )
}

pub fn user_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(list_users, create_user))
        .routes(routes!(get_user, replace_user))
        .routes(routes!(archive_user))
        .routes(routes!(restore_user))
}
