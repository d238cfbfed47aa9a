use crate::api::pagination::{self, resolve_limit, resolve_offset};
use crate::api::{
    field_errors_response, found_response, not_found, parse_filter, require_confirmation,
    storage_failure, success_paginated_response, success_response, ApiError, RecordBody,
    ValidationErrorData,
};
use crate::logging::TraceId;
use crate::state::AppState;
use axum::body::Bytes;
use axum::extract::{Extension, Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use bantay_common::types::{ArchiveRequest, BranchUnit, Contact, ContactInput, ResponderType};
use bantay_rules::{validate_contact, Mode};
use bantay_storage::ContactFilter;
use serde::Deserialize;
use utoipa_axum::{router::OpenApiRouter, routes};

#[derive(Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
struct ContactListParams {
    /// Contains-match on either mobile number
    #[param(required = false)]
    search: Option<String>,
    /// bpso, bdrrmo, bhert, health_center, lupon or vawc_desk
    #[param(required = false)]
    branch_unit_name: Option<String>,
    /// police, fire, medical, rescue, disaster or tanod
    #[param(required = false)]
    responder_type: Option<String>,
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

/// List emergency contacts.
#[utoipa::path(
    get,
    path = "/v1/contacts",
    tag = "Contacts",
    params(ContactListParams),
    responses(
        (status = 200, description = "Contact page", body = Vec<Contact>),
        (status = 400, description = "Unknown branch unit or responder type", body = ApiError)
    )
)]
async fn list_contacts(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
    Query(params): Query<ContactListParams>,
) -> impl IntoResponse {
    let branch_unit_name = match parse_filter::<BranchUnit>(
        &trace_id,
        "branch_unit_name",
        params.branch_unit_name.as_deref(),
    ) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let responder_type = match parse_filter::<ResponderType>(
        &trace_id,
        "responder_type",
        params.responder_type.as_deref(),
    ) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let limit = resolve_limit(params.limit, &state.config.pagination);
    let offset = resolve_offset(params.offset);
    let filter = ContactFilter {
        search: params.search,
        branch_unit_name,
        responder_type,
        archived: params.archived,
    };

    let total = match state.store.count_contacts(&filter) {
        Ok(c) => c,
        Err(e) => return storage_failure(&trace_id, e, "Failed to count contacts"),
    };
    match state.store.list_contacts(&filter, limit, offset) {
        Ok(items) => success_paginated_response(StatusCode::OK, &trace_id, items, total, limit, offset),
        Err(e) => storage_failure(&trace_id, e, "Failed to list contacts"),
    }
}

/// Create an emergency contact. Mobile numbers are 11 digits.
#[utoipa::path(
    post,
    path = "/v1/contacts",
    tag = "Contacts",
    request_body = ContactInput,
    responses(
        (status = 201, description = "Contact created", body = Contact),
        (status = 422, description = "Validation failed", body = ValidationErrorData)
    )
)]
async fn create_contact(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
    RecordBody(record): RecordBody,
) -> impl IntoResponse {
    let input = match validate_contact(&record, &Mode::Create) {
        Ok(input) => input,
        Err(errors) => return field_errors_response(&trace_id, errors),
    };
    match state.store.insert_contact(&input) {
        Ok(contact) => {
            tracing::info!(
                id = %contact.id,
                branch_unit = %contact.branch_unit_name,
                "Contact created"
            );
            success_response(StatusCode::CREATED, &trace_id, contact)
        }
        Err(e) => storage_failure(&trace_id, e, "Failed to create contact"),
    }
}

#[utoipa::path(
    get,
    path = "/v1/contacts/{id}",
    tag = "Contacts",
    params(("id" = String, Path, description = "Contact id")),
    responses(
        (status = 200, description = "Contact", body = Contact),
        (status = 404, description = "Unknown id", body = ApiError)
    )
)]
async fn get_contact(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    found_response(
        &trace_id,
        "contact",
        &id,
        state.store.get_contact(&id),
        "Failed to load contact",
    )
}

#[utoipa::path(
    put,
    path = "/v1/contacts/{id}",
    tag = "Contacts",
    params(("id" = String, Path, description = "Contact id")),
    request_body = ContactInput,
    responses(
        (status = 200, description = "Contact replaced", body = Contact),
        (status = 404, description = "Unknown id", body = ApiError),
        (status = 422, description = "Validation failed", body = ValidationErrorData)
    )
)]
async fn replace_contact(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
    Path(id): Path<String>,
    RecordBody(record): RecordBody,
) -> impl IntoResponse {
    match state.store.get_contact(&id) {
        Ok(Some(_)) => {}
        Ok(None) => return not_found(&trace_id, "contact", &id),
        Err(e) => return storage_failure(&trace_id, e, "Failed to load contact"),
    }
    let input = match validate_contact(&record, &Mode::Update { id: &id }) {
        Ok(input) => input,
        Err(errors) => return field_errors_response(&trace_id, errors),
    };
    found_response(
        &trace_id,
        "contact",
        &id,
        state.store.replace_contact(&id, &input),
        "Failed to replace contact",
    )
}

#[utoipa::path(
    post,
    path = "/v1/contacts/{id}/archive",
    tag = "Contacts",
    params(("id" = String, Path, description = "Contact id")),
    request_body = ArchiveRequest,
    responses(
        (status = 200, description = "Contact archived", body = Contact),
        (status = 400, description = "Missing confirmation", body = ApiError),
        (status = 404, description = "Unknown id", body = ApiError)
    )
)]
async fn archive_contact(
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
        "contact",
        &id,
        state.store.set_contact_archived(&id, true),
        "Failed to archive contact",
    )
}

#[utoipa::path(
    post,
    path = "/v1/contacts/{id}/restore",
    tag = "Contacts",
    params(("id" = String, Path, description = "Contact id")),
    request_body = ArchiveRequest,
    responses(
        (status = 200, description = "Contact restored", body = Contact),
        (status = 400, description = "Missing confirmation", body = ApiError),
        (status = 404, description = "Unknown id", body = ApiError)
    )
)]
async fn restore_contact(
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
        "contact",
        &id,
        state.store.set_contact_archived(&id, false),
        "Failed to restore contact",
    )
}

pub fn contact_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(list_contacts, create_contact))
        .routes(routes!(get_contact, replace_contact))
        .routes(routes!(archive_contact))
        .routes(routes!(restore_contact))
}
