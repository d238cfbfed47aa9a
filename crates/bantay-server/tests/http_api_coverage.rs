mod common;

use axum::http::StatusCode;
use bantay_common::types::{Location, PublicPost, User};
use common::{
    assert_err_envelope, assert_ok_envelope, assert_validation_envelope, build_test_context,
    confirm, create_location, create_post, decode_data, request_json, request_multipart,
    request_no_body,
};
use serde_json::json;

#[tokio::test]
async fn health_should_return_ok_envelope() {
    let ctx = build_test_context().expect("test context should build");
    let (status, body, trace) = request_no_body(&ctx.app, "GET", "/v1/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_ok_envelope(&body);
    assert!(body["data"]["version"].is_string());
    assert_eq!(body["data"]["storage_status"], "ok");
    assert_eq!(body["trace_id"].as_str(), trace.as_deref());
}

#[tokio::test]
async fn roles_should_list_seeded_roles() {
    let ctx = build_test_context().expect("test context should build");
    let (status, body, _) = request_no_body(&ctx.app, "GET", "/v1/roles").await;
    assert_eq!(status, StatusCode::OK);
    let roles = body["data"].as_array().expect("roles should be an array");
    assert_eq!(roles.len(), 3);
    assert_eq!(roles[2]["id"], 3);
    assert_eq!(roles[2]["name"], "Purok Leader");
}

#[tokio::test]
async fn location_crud_archive_and_restore() {
    let ctx = build_test_context().expect("test context should build");
    let id = create_location(&ctx.app, "Barangay Hall").await;

    let (status, body, _) = request_no_body(&ctx.app, "GET", &format!("/v1/locations/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    let location: Location = decode_data(&body);
    assert_eq!(location.location_name, "Barangay Hall");
    assert!(!location.archived);

    let (status, body, _) = request_json(
        &ctx.app,
        "PUT",
        &format!("/v1/locations/{id}"),
        Some(json!({
            "location_name": "  Barangay Hall Annex ",
            "barangay": "176-E",
            "landmark": "",
            "latitude": "14.7570",
            "longitude": 121.0315
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let location: Location = decode_data(&body);
    assert_eq!(location.location_name, "Barangay Hall Annex");
    assert_eq!(location.landmark, None);
    assert!((location.latitude - 14.757).abs() < 1e-9);

    let (status, body, _) = request_json(
        &ctx.app,
        "PUT",
        &format!("/v1/locations/{id}"),
        Some(json!({"location_name": "Hall", "barangay": "176-E", "latitude": 91, "longitude": 121})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let errors = assert_validation_envelope(&body);
    assert_eq!(errors["latitude"], "The latitude must be between -90 and 90.");

    let (status, body, _) =
        request_no_body(&ctx.app, "POST", &format!("/v1/locations/{id}/archive")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_err_envelope(&body, 1011);

    let (status, body, _) = request_json(
        &ctx.app,
        "POST",
        &format!("/v1/locations/{id}/archive"),
        Some(json!({"confirm": false})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_err_envelope(&body, 1011);

    let (status, body, _) = request_json(
        &ctx.app,
        "POST",
        &format!("/v1/locations/{id}/archive"),
        confirm(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["archived"], true);

    let (_, body, _) = request_no_body(&ctx.app, "GET", "/v1/locations").await;
    assert_eq!(body["data"]["total"], 0);
    let (_, body, _) = request_no_body(&ctx.app, "GET", "/v1/locations?archived=true").await;
    assert_eq!(body["data"]["total"], 1);

    let (status, body, _) = request_json(
        &ctx.app,
        "POST",
        &format!("/v1/locations/{id}/restore"),
        confirm(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["archived"], false);
    assert!(body["data"]["archived_at"].is_null());
}

#[tokio::test]
async fn unknown_ids_return_not_found() {
    let ctx = build_test_context().expect("test context should build");
    for uri in [
        "/v1/locations/404",
        "/v1/cctv-devices/404",
        "/v1/contacts/404",
        "/v1/iot-devices/404",
        "/v1/posts/404",
        "/v1/users/404",
    ] {
        let (status, body, _) = request_no_body(&ctx.app, "GET", uri).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
        assert_err_envelope(&body, 1004);
    }

    let (status, body, _) = request_json(
        &ctx.app,
        "PUT",
        "/v1/contacts/404",
        Some(json!({"branch_unit_name": "bpso"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_err_envelope(&body, 1004);

    let (status, body, _) =
        request_json(&ctx.app, "POST", "/v1/users/404/archive", confirm()).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_err_envelope(&body, 1004);
}

#[tokio::test]
async fn non_object_body_is_bad_request() {
    let ctx = build_test_context().expect("test context should build");
    let (status, body, _) =
        request_json(&ctx.app, "POST", "/v1/locations", Some(json!(["Barangay Hall"]))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_err_envelope(&body, 1001);
}

#[tokio::test]
async fn list_pagination_accepts_string_numbers() {
    let ctx = build_test_context().expect("test context should build");
    for name in ["Alpha", "Bravo", "Charlie"] {
        create_location(&ctx.app, name).await;
    }

    let (status, body, _) =
        request_no_body(&ctx.app, "GET", "/v1/locations?limit=2&offset=1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], 3);
    assert_eq!(body["data"]["limit"], 2);
    let items = body["data"]["items"].as_array().expect("items");
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["location_name"], "Bravo");

    let (_, body, _) = request_no_body(&ctx.app, "GET", "/v1/locations?limit=0&search=char").await;
    assert_eq!(body["data"]["limit"], 20);
    assert_eq!(body["data"]["total"], 1);
}

#[tokio::test]
async fn list_offset_past_the_end_is_empty() {
    let ctx = build_test_context().expect("test context should build");
    create_location(&ctx.app, "Alpha").await;

    for offset in ["5", "9223372036854775808", "18446744073709551615"] {
        let uri = format!("/v1/locations?offset={offset}");
        let (status, body, _) = request_no_body(&ctx.app, "GET", &uri).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["total"], 1);
        let items = body["data"]["items"].as_array().expect("items");
        assert!(items.is_empty(), "offset {offset} returned {items:?}");
    }
}

#[tokio::test]
async fn cctv_requires_existing_location_and_filters_by_status() {
    let ctx = build_test_context().expect("test context should build");
    let location_id = create_location(&ctx.app, "Main Gate").await;

    let (status, body, _) = request_json(
        &ctx.app,
        "POST",
        "/v1/cctv-devices",
        Some(json!({
            "device_name": "Gate Cam",
            "primary_rtsp_url": "ftp://10.0.0.5/stream1",
            "location_id": "999999",
            "status": "active",
            "fps": 240
        })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let errors = assert_validation_envelope(&body);
    assert_eq!(errors["location_id"], "The selected location does not exist.");
    assert_eq!(errors["primary_rtsp_url"], "The primary rtsp url must be a valid stream URL.");
    assert_eq!(errors["fps"], "The fps may not be greater than 120.");

    let (status, body, _) = request_json(
        &ctx.app,
        "POST",
        "/v1/cctv-devices",
        Some(json!({
            "device_name": "Gate Cam",
            "primary_rtsp_url": "rtsp://10.0.0.5/stream1",
            "location_id": location_id,
            "status": "Active",
            "fps": "30",
            "resolution": "1080p"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["location_name"], "Main Gate");
    assert_eq!(body["data"]["status"], "active");
    assert_eq!(body["data"]["fps"], 30);
    let cam_id = body["data"]["id"].as_str().expect("id").to_string();

    let (_, body, _) = request_no_body(&ctx.app, "GET", "/v1/cctv-devices?status=maintenance").await;
    assert_eq!(body["data"]["total"], 0);
    let (_, body, _) = request_no_body(
        &ctx.app,
        "GET",
        &format!("/v1/cctv-devices?status=active&location_id={location_id}"),
    )
    .await;
    assert_eq!(body["data"]["items"][0]["id"], cam_id.as_str());

    let (status, body, _) = request_no_body(&ctx.app, "GET", "/v1/cctv-devices?status=broken").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_err_envelope(&body, 1001);
}

#[tokio::test]
async fn contact_mobile_numbers_need_eleven_digits() {
    let ctx = build_test_context().expect("test context should build");
    let (status, body, _) = request_json(
        &ctx.app,
        "POST",
        "/v1/contacts",
        Some(json!({
            "branch_unit_name": "bdrrmo",
            "responder_type": "rescue",
            "primary_mobile": "0917123456",
            "backup_mobile": "0917-123-4567"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let errors = assert_validation_envelope(&body);
    assert_eq!(
        errors["primary_mobile"],
        "The primary mobile number must be exactly 11 digits."
    );
    assert_eq!(
        errors["backup_mobile"],
        "The backup mobile number must be exactly 11 digits."
    );

    let (status, _, _) = request_json(
        &ctx.app,
        "POST",
        "/v1/contacts",
        Some(json!({
            "branch_unit_name": "bdrrmo",
            "responder_type": "rescue",
            "primary_mobile": "09171234567"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, body, _) = request_no_body(&ctx.app, "GET", "/v1/contacts?responder_type=rescue").await;
    assert_eq!(body["data"]["total"], 1);
    let (_, body, _) = request_no_body(&ctx.app, "GET", "/v1/contacts?branch_unit_name=bpso").await;
    assert_eq!(body["data"]["total"], 0);
}

#[tokio::test]
async fn iot_device_needs_one_location_source() {
    let ctx = build_test_context().expect("test context should build");
    let location_id = create_location(&ctx.app, "Phase 1 Creek").await;

    let (status, body, _) = request_json(
        &ctx.app,
        "POST",
        "/v1/iot-devices",
        Some(json!({
            "device_name": "Water Level 1",
            "status": "active",
            "custom_address": "Phase 1 Creek"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let errors = assert_validation_envelope(&body);
    assert_eq!(
        errors["location"],
        "Select a location or provide a custom address, latitude and longitude."
    );

    let (status, body, _) = request_json(
        &ctx.app,
        "POST",
        "/v1/iot-devices",
        Some(json!({
            "device_name": "Water Level 1",
            "status": "active",
            "custom_address": "Phase 1 Creek",
            "custom_latitude": 14.7581,
            "custom_longitude": "121.0298"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(body["data"]["location_id"].is_null());
    let id = body["data"]["id"].as_str().expect("id").to_string();

    let (status, body, _) = request_json(
        &ctx.app,
        "PUT",
        &format!("/v1/iot-devices/{id}"),
        Some(json!({
            "device_name": "Water Level 1",
            "status": "maintenance",
            "location_id": location_id,
            "custom_address": "Phase 1 Creek",
            "custom_latitude": 14.7581,
            "custom_longitude": 121.0298
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["location_name"], "Phase 1 Creek");
    assert!(body["data"]["custom_address"].is_null());
    assert!(body["data"]["custom_latitude"].is_null());

    let (_, body, _) = request_no_body(&ctx.app, "GET", "/v1/iot-devices?status=maintenance").await;
    assert_eq!(body["data"]["total"], 1);
}

#[tokio::test]
async fn scheduled_post_needs_publish_date() {
    let ctx = build_test_context().expect("test context should build");
    let (status, body, _) = request_json(
        &ctx.app,
        "POST",
        "/v1/posts",
        Some(json!({"title": "Road closure", "content": "Main road closed.", "status": "scheduled"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let errors = assert_validation_envelope(&body);
    assert_eq!(
        errors["published_at"],
        "The publish date is required when the post is scheduled."
    );

    let (status, body, _) = request_json(
        &ctx.app,
        "POST",
        "/v1/posts",
        Some(json!({
            "title": "Road closure",
            "content": "Main road closed.",
            "category": "advisory",
            "status": "scheduled",
            "published_at": "2026-11-01 08:00"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["published_at"], "2026-11-01T08:00:00Z");

    let (_, body, _) = request_no_body(&ctx.app, "GET", "/v1/posts?category=advisory&status=scheduled").await;
    assert_eq!(body["data"]["total"], 1);
}

#[tokio::test]
async fn post_image_upload_stores_and_replaces_file() {
    let ctx = build_test_context().expect("test context should build");
    let id = create_post(&ctx.app, "Clean-up drive").await;
    let uri = format!("/v1/posts/{id}/image");

    let (status, body, _) =
        request_multipart(&ctx.app, &uri, "image", "poster.png", "image/png", b"png-bytes").await;
    assert_eq!(status, StatusCode::OK);
    let post: PublicPost = decode_data(&body);
    let png_path = format!("uploads/posts/{id}.png");
    assert_eq!(post.image_path.as_deref(), Some(png_path.as_str()));
    assert!(ctx.temp_dir.path().join(&png_path).exists());

    let (status, body, _) = request_multipart(
        &ctx.app,
        &uri,
        "image",
        "poster.jpg",
        "application/octet-stream",
        b"jpeg-bytes",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let jpg_path = format!("uploads/posts/{id}.jpg");
    assert_eq!(body["data"]["image_path"], jpg_path.as_str());
    assert!(ctx.temp_dir.path().join(&jpg_path).exists());
    assert!(!ctx.temp_dir.path().join(&png_path).exists());

    let (status, body, _) = request_json(
        &ctx.app,
        "PUT",
        &format!("/v1/posts/{id}"),
        Some(json!({"title": "Clean-up drive", "content": "Moved to Sunday.", "status": "published"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["image_path"], jpg_path.as_str());
}

#[tokio::test]
async fn post_image_rejects_wrong_type_and_size() {
    let ctx = build_test_context().expect("test context should build");
    let id = create_post(&ctx.app, "Fiesta").await;
    let uri = format!("/v1/posts/{id}/image");

    let (status, body, _) =
        request_multipart(&ctx.app, &uri, "image", "anim.gif", "image/gif", b"gif-bytes").await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let errors = assert_validation_envelope(&body);
    assert_eq!(
        errors["image"],
        "The image must be a file of type: jpeg, png, jpg, webp."
    );

    let just_over = vec![0u8; 5 * 1024 * 1024 + 1];
    let (status, body, _) =
        request_multipart(&ctx.app, &uri, "image", "big.webp", "image/webp", &just_over).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let errors = assert_validation_envelope(&body);
    assert_eq!(
        errors["image"],
        "The image may not be greater than 5120 kilobytes."
    );

    let (status, body, _) =
        request_multipart(&ctx.app, &uri, "file", "poster.png", "image/png", b"png").await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let errors = assert_validation_envelope(&body);
    assert_eq!(errors["image"], "The image field is required.");

    let way_over = vec![0u8; 6 * 1024 * 1024];
    let (status, body, _) =
        request_multipart(&ctx.app, &uri, "image", "huge.png", "image/png", &way_over).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_err_envelope(&body, 1012);

    let (status, body, _) = request_multipart(
        &ctx.app,
        "/v1/posts/404/image",
        "image",
        "poster.png",
        "image/png",
        b"png",
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_err_envelope(&body, 1004);

    let (_, body, _) = request_no_body(&ctx.app, "GET", &format!("/v1/posts/{id}")).await;
    assert!(body["data"]["image_path"].is_null());
}

#[tokio::test]
async fn purok_leader_signs_up_with_pin() {
    let ctx = build_test_context().expect("test context should build");
    let base = json!({
        "first_name": "Ana",
        "last_name": "Cruz",
        "email": "ana@barangay176.ph",
        "role_id": 3
    });

    let mut body = base.clone();
    body["password"] = json!("12ab");
    let (status, resp, _) = request_json(&ctx.app, "POST", "/v1/users", Some(body)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let errors = assert_validation_envelope(&resp);
    assert_eq!(errors["password"], "The PIN must contain digits only.");

    let mut body = base.clone();
    body["password"] = json!("123");
    let (_, resp, _) = request_json(&ctx.app, "POST", "/v1/users", Some(body)).await;
    let errors = assert_validation_envelope(&resp);
    assert_eq!(errors["password"], "The PIN must be at least 4 digits.");

    let mut body = base.clone();
    body["password"] = json!("4821");
    let (status, resp, _) = request_json(&ctx.app, "POST", "/v1/users", Some(body)).await;
    assert_eq!(status, StatusCode::CREATED);
    let user: User = decode_data(&resp);
    assert!(user.is_purok_leader());
    assert_eq!(user.role_name.as_deref(), Some("Purok Leader"));
    assert!(resp["data"].get("password").is_none());
    assert!(resp["data"].get("password_hash").is_none());
    assert!(ctx.state.store.verify_user_credential(&user.id, "4821").unwrap());
}

#[tokio::test]
async fn staff_password_rules_and_unique_email() {
    let ctx = build_test_context().expect("test context should build");
    let (status, resp, _) = request_json(
        &ctx.app,
        "POST",
        "/v1/users",
        Some(json!({
            "first_name": "Ben",
            "last_name": "Reyes",
            "email": "ben@barangay176.ph",
            "role_id": 2,
            "password": "password1"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let errors = assert_validation_envelope(&resp);
    assert_eq!(errors["password"], "The Password must contain at least one symbol.");

    let (status, resp, _) = request_json(
        &ctx.app,
        "POST",
        "/v1/users",
        Some(json!({
            "first_name": "Ben",
            "last_name": "Reyes",
            "email": "ben@barangay176.ph",
            "role_id": 2,
            "password": "Tanod#2024",
            "contact_number": "09181234567"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = resp["data"]["id"].as_str().expect("id").to_string();

    let (status, resp, _) = request_json(
        &ctx.app,
        "POST",
        "/v1/users",
        Some(json!({
            "first_name": "Benny",
            "last_name": "Reyes",
            "email": "BEN@barangay176.ph",
            "role_id": 1,
            "password": "Admin#2024"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let errors = assert_validation_envelope(&resp);
    assert_eq!(errors["email"], "This email address is already registered.");

    let (status, resp, _) = request_json(
        &ctx.app,
        "PUT",
        &format!("/v1/users/{id}"),
        Some(json!({
            "first_name": "Benjamin",
            "last_name": "Reyes",
            "email": "ben@barangay176.ph",
            "role_id": 2,
            "password": ""
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(resp["data"]["first_name"], "Benjamin");
    assert!(ctx.state.store.verify_user_credential(&id, "Tanod#2024").unwrap());

    let (_, resp, _) = request_no_body(&ctx.app, "GET", "/v1/users?role_id=2&search=benj").await;
    assert_eq!(resp["data"]["total"], 1);
    let (status, resp, _) = request_no_body(&ctx.app, "GET", "/v1/users?role_id=staff").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_err_envelope(&resp, 1001);
}

#[tokio::test]
async fn responses_carry_trace_header() {
    let ctx = build_test_context().expect("test context should build");
    let (_, body, trace) = request_no_body(&ctx.app, "GET", "/v1/locations").await;
    let trace = trace.expect("x-trace-id header should be set");
    assert_eq!(trace.len(), 16);
    assert_eq!(body["trace_id"], trace.as_str());
}
