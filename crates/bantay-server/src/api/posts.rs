use crate::api::pagination::{self, resolve_limit, resolve_offset};
use crate::api::{
    error_response, field_errors_response, found_response, not_found, parse_filter,
    require_confirmation, storage_failure, success_paginated_response, success_response, ApiError,
    RecordBody, ValidationErrorData,
};
use crate::logging::TraceId;
use crate::state::AppState;
use axum::body::Bytes;
use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::{DefaultBodyLimit, Extension, Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use bantay_common::types::{
    ArchiveRequest, PostCategory, PostStatus, PublicPost, PublicPostInput, MAX_POST_IMAGE_BYTES,
};
use bantay_common::FieldErrors;
use bantay_rules::messages::message;
use bantay_rules::{validate_post, validate_post_image, Mode};
use bantay_storage::PostFilter;
use serde::Deserialize;
use std::path::PathBuf;
use utoipa_axum::{router::OpenApiRouter, routes};

/// Room for multipart boundaries and headers on top of the image itself, so
/// a slightly oversized image still reaches validation.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

#[derive(Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
struct PostListParams {
    /// Contains-match on title or content
    #[param(required = false)]
    search: Option<String>,
    /// draft, published or scheduled
    #[param(required = false)]
    status: Option<String>,
    /// announcement, advisory, event or emergency
    #[param(required = false)]
    category: Option<String>,
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

/// Multipart body of an image upload
#[derive(utoipa::ToSchema)]
#[allow(dead_code)]
struct PostImageUpload {
    /// jpeg, png or webp, at most 5 MB
    #[schema(value_type = String, format = Binary)]
    image: Vec<u8>,
}

/// List public posts, newest first.
#[utoipa::path(
    get,
    path = "/v1/posts",
    tag = "Posts",
    params(PostListParams),
    responses(
        (status = 200, description = "Post page", body = Vec<PublicPost>),
        (status = 400, description = "Unknown status or category filter", body = ApiError)
    )
)]
async fn list_posts(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
    Query(params): Query<PostListParams>,
) -> impl IntoResponse {
    let status = match parse_filter::<PostStatus>(&trace_id, "status", params.status.as_deref()) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    let category =
        match parse_filter::<PostCategory>(&trace_id, "category", params.category.as_deref()) {
            Ok(c) => c,
            Err(resp) => return resp,
        };
    let limit = resolve_limit(params.limit, &state.config.pagination);
    let offset = resolve_offset(params.offset);
    let filter = PostFilter {
        search: params.search,
        status,
        category,
        archived: params.archived,
    };

    let total = match state.store.count_posts(&filter) {
        Ok(c) => c,
        Err(e) => return storage_failure(&trace_id, e, "Failed to count posts"),
    };
    match state.store.list_posts(&filter, limit, offset) {
        Ok(items) => success_paginated_response(StatusCode::OK, &trace_id, items, total, limit, offset),
        Err(e) => storage_failure(&trace_id, e, "Failed to list posts"),
    }
}

/// Create a public post. `published_at` is required for scheduled posts.
#[utoipa::path(
    post,
    path = "/v1/posts",
    tag = "Posts",
    request_body = PublicPostInput,
    responses(
        (status = 201, description = "Post created", body = PublicPost),
        (status = 422, description = "Validation failed", body = ValidationErrorData)
    )
)]
async fn create_post(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
    RecordBody(record): RecordBody,
) -> impl IntoResponse {
    let input = match validate_post(&record, &Mode::Create) {
        Ok(input) => input,
        Err(errors) => return field_errors_response(&trace_id, errors),
    };
    match state.store.insert_post(&input) {
        Ok(post) => {
            tracing::info!(id = %post.id, status = %post.status, "Post created");
            success_response(StatusCode::CREATED, &trace_id, post)
        }
        Err(e) => storage_failure(&trace_id, e, "Failed to create post"),
    }
}

#[utoipa::path(
    get,
    path = "/v1/posts/{id}",
    tag = "Posts",
    params(("id" = String, Path, description = "Post id")),
    responses(
        (status = 200, description = "Post", body = PublicPost),
        (status = 404, description = "Unknown id", body = ApiError)
    )
)]
async fn get_post(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    found_response(&trace_id, "post", &id, state.store.get_post(&id), "Failed to load post")
}

/// Replace a post. The uploaded image is kept.
#[utoipa::path(
    put,
    path = "/v1/posts/{id}",
    tag = "Posts",
    params(("id" = String, Path, description = "Post id")),
    request_body = PublicPostInput,
    responses(
        (status = 200, description = "Post replaced", body = PublicPost),
        (status = 404, description = "Unknown id", body = ApiError),
        (status = 422, description = "Validation failed", body = ValidationErrorData)
    )
)]
async fn replace_post(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
    Path(id): Path<String>,
    RecordBody(record): RecordBody,
) -> impl IntoResponse {
    match state.store.get_post(&id) {
        Ok(Some(_)) => {}
        Ok(None) => return not_found(&trace_id, "post", &id),
        Err(e) => return storage_failure(&trace_id, e, "Failed to load post"),
    }
    let input = match validate_post(&record, &Mode::Update { id: &id }) {
        Ok(input) => input,
        Err(errors) => return field_errors_response(&trace_id, errors),
    };
    found_response(
        &trace_id,
        "post",
        &id,
        state.store.replace_post(&id, &input),
        "Failed to replace post",
    )
}

fn multipart_failure(trace_id: &str, err: MultipartError) -> Response {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return error_response(
            StatusCode::PAYLOAD_TOO_LARGE,
            trace_id,
            "payload_too_large",
            "Request body is too large",
        );
    }
    error_response(StatusCode::BAD_REQUEST, trace_id, "bad_request", &err.body_text())
}

/// Upload or replace the image of a post.
///
/// Send the file in the multipart field `image`. The stored file lives at
/// `uploads/posts/{id}.{ext}` under the data directory.
#[utoipa::path(
    post,
    path = "/v1/posts/{id}/image",
    tag = "Posts",
    params(("id" = String, Path, description = "Post id")),
    request_body(content = PostImageUpload, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Image stored", body = PublicPost),
        (status = 404, description = "Unknown id", body = ApiError),
        (status = 413, description = "Request body too large", body = ApiError),
        (status = 422, description = "Not an accepted image", body = ValidationErrorData)
    )
)]
async fn upload_post_image(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
    Path(id): Path<String>,
    multipart: Result<Multipart, MultipartRejection>,
) -> impl IntoResponse {
    let mut multipart = match multipart {
        Ok(m) => m,
        Err(rejection) => {
            return error_response(
                StatusCode::BAD_REQUEST,
                &trace_id,
                "bad_request",
                &rejection.body_text(),
            )
        }
    };
    let previous = match state.store.get_post(&id) {
        Ok(Some(post)) => post.image_path,
        Ok(None) => return not_found(&trace_id, "post", &id),
        Err(e) => return storage_failure(&trace_id, e, "Failed to load post"),
    };

    let mut upload = None;
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => return multipart_failure(&trace_id, e),
        };
        if field.name() != Some("image") {
            continue;
        }
        let content_type = field.content_type().map(str::to_string);
        let file_name = field.file_name().map(str::to_string);
        match field.bytes().await {
            Ok(data) => upload = Some((content_type, file_name, data)),
            Err(e) => return multipart_failure(&trace_id, e),
        }
        break;
    }

    let Some((content_type, file_name, data)) = upload else {
        let mut errors = FieldErrors::new();
        errors.add("image", message("image.required", &[]));
        return field_errors_response(&trace_id, errors);
    };
    let kind = match validate_post_image(content_type.as_deref(), file_name.as_deref(), data.len())
    {
        Ok(kind) => kind,
        Err(errors) => return field_errors_response(&trace_id, errors),
    };

    let relative = format!("uploads/posts/{id}.{}", kind.ext());
    let dir = state.uploads_dir().join("posts");
    if let Err(e) = tokio::fs::create_dir_all(&dir).await {
        tracing::error!(error = %e, dir = %dir.display(), "Failed to create upload directory");
        return error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            &trace_id,
            "internal_error",
            "Failed to store image",
        );
    }
    let target = PathBuf::from(&state.config.data_dir).join(&relative);
    if let Err(e) = tokio::fs::write(&target, &data).await {
        tracing::error!(error = %e, path = %target.display(), "Failed to write post image");
        return error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            &trace_id,
            "internal_error",
            "Failed to store image",
        );
    }

    if let Some(old) = previous.filter(|old| *old != relative) {
        let old_path = PathBuf::from(&state.config.data_dir).join(&old);
        if let Err(e) = tokio::fs::remove_file(&old_path).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(error = %e, path = %old_path.display(), "Failed to remove old post image");
            }
        }
    }

    tracing::info!(id = %id, mime = kind.mime(), bytes = data.len(), "Post image stored");
    found_response(
        &trace_id,
        "post",
        &id,
        state.store.set_post_image(&id, &relative),
        "Failed to record post image",
    )
}

#[utoipa::path(
    post,
    path = "/v1/posts/{id}/archive",
    tag = "Posts",
    params(("id" = String, Path, description = "Post id")),
    request_body = ArchiveRequest,
    responses(
        (status = 200, description = "Post archived", body = PublicPost),
        (status = 400, description = "Missing confirmation", body = ApiError),
        (status = 404, description = "Unknown id", body = ApiError)
    )
)]
async fn archive_post(
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
        "post",
        &id,
        state.store.set_post_archived(&id, true),
        "Failed to archive post",
    )
}

#[utoipa::path(
    post,
    path = "/v1/posts/{id}/restore",
    tag = "Posts",
    params(("id" = String, Path, description = "Post id")),
    request_body = ArchiveRequest,
    responses(
        (status = 200, description = "Post restored", body = PublicPost),
        (status = 400, description = "Missing confirmation", body = ApiError),
        (status = 404, description = "Unknown id", body = ApiError)
    )
)]
async fn restore_post(
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
        "post",
        &id,
        state.store.set_post_archived(&id, false),
        "Failed to restore post",
    )
}

fn post_image_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(upload_post_image))
        .layer(DefaultBodyLimit::max(
            MAX_POST_IMAGE_BYTES + MULTIPART_OVERHEAD_BYTES,
        ))
}

pub fn post_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(list_posts, create_post))
        .routes(routes!(get_post, replace_post))
        .routes(routes!(archive_post))
        .routes(routes!(restore_post))
        .merge(post_image_routes())
}
