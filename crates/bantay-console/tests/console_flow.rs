use bantay_common::types::{Contact, DeviceStatus, IotDevice, Location, PublicPost, User};
use bantay_console::filter::{ListFilter, LocationFilter};
use bantay_console::form::{ArchivePrompt, FormState, ToastKind, GENERIC_FAILURE};
use bantay_console::input::{CoordinateFields, MapPick};
use bantay_console::{ConsoleClient, ConsoleError, ListQuery, SubmitOutcome};
use bantay_server::app::build_http_app;
use bantay_server::config::ServerConfig;
use bantay_server::state::AppState;
use bantay_storage::ConsoleStore;
use std::sync::Arc;
use tempfile::TempDir;

async fn serve() -> (TempDir, ConsoleClient) {
    bantay_common::id::init(1, 1);
    let dir = tempfile::tempdir().expect("temp dir");
    let store = Arc::new(ConsoleStore::open(dir.path()).expect("store should open"));
    let config = ServerConfig {
        data_dir: dir.path().to_string_lossy().to_string(),
        ..Default::default()
    };
    let app = build_http_app(AppState::new(store, config));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("listener should bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });
    (dir, ConsoleClient::new(format!("http://{addr}")))
}

async fn submit_location(client: &ConsoleClient, name: &str) -> Location {
    let mut form = FormState::create();
    form.set("location_name", name);
    form.set("barangay", "176-E");
    MapPick {
        latitude: 14.7565,
        longitude: 121.0312,
    }
    .apply(&mut form.draft, CoordinateFields::STANDARD);
    let payload = form.begin_submit().expect("first submit");
    let outcome = client.create::<Location>(&payload).await;
    let location = form
        .apply_outcome(outcome, "Location saved")
        .expect("location should be accepted");
    assert!(!form.open);
    location
}

#[tokio::test]
async fn location_form_round_trip() {
    let (_dir, client) = serve().await;
    let plaza = submit_location(&client, "Plaza").await;
    submit_location(&client, "Barangay Hall").await;

    let page = client
        .list::<Location>(&ListQuery::new().page(10, 0))
        .await
        .expect("list");
    assert_eq!(page.total, 2);
    let filter = LocationFilter {
        search: "pla".into(),
        ..Default::default()
    };
    assert_eq!(filter.apply(&page.items)[0].id, plaza.id);

    let mut edit = FormState::edit(&plaza);
    edit.set("landmark", "Covered court");
    let payload = edit.begin_submit().expect("submit");
    let outcome = client.replace::<Location>(&plaza.id, &payload).await;
    let updated = edit.apply_outcome(outcome, "Location updated").expect("accepted");
    assert_eq!(updated.landmark.as_deref(), Some("Covered court"));

    let confirmed = ArchivePrompt::archive(&plaza.id, &plaza.location_name).confirm();
    let archived: Location = client.apply(&confirmed).await.expect("archive");
    assert!(archived.archived);
    let page = client
        .list::<Location>(&ListQuery::new().archived(true))
        .await
        .expect("list archived");
    assert_eq!(page.total, 1);

    let restored: Location = client
        .apply(&ArchivePrompt::restore(&plaza.id, "Plaza").confirm())
        .await
        .expect("restore");
    assert!(!restored.archived);
}

#[tokio::test]
async fn contact_form_shows_server_messages() {
    let (_dir, client) = serve().await;
    let mut form = FormState::create();
    form.set("branch_unit_name", "bhert");
    form.set("responder_type", "medical");
    form.set_mobile("primary_mobile", "0917-123-456");

    let payload = form.begin_submit().expect("submit");
    let outcome = client.create::<Contact>(&payload).await;
    assert!(form.apply_outcome(outcome, "Contact saved").is_none());
    assert!(form.open);
    assert_eq!(
        form.error("primary_mobile"),
        Some("The primary mobile number must be exactly 11 digits.")
    );

    form.set_mobile("primary_mobile", "0917-123-4567");
    let payload = form.begin_submit().expect("resubmit");
    let outcome = client.create::<Contact>(&payload).await;
    let contact = form.apply_outcome(outcome, "Contact saved").expect("accepted");
    assert_eq!(contact.primary_mobile, "09171234567");
    assert_eq!(form.toast.as_ref().map(|t| t.kind), Some(ToastKind::Success));
}

#[tokio::test]
async fn iot_form_accepts_custom_spot_from_map() {
    let (_dir, client) = serve().await;
    let mut form = FormState::create();
    form.set("device_name", "Water Level 1");
    form.set("status", "active");
    form.set("custom_address", "Phase 1 Creek");
    MapPick {
        latitude: 14.7581,
        longitude: 121.0298,
    }
    .apply(&mut form.draft, CoordinateFields::IOT_CUSTOM);

    let payload = form.begin_submit().expect("submit");
    let outcome = client.create::<IotDevice>(&payload).await;
    let device = form.apply_outcome(outcome, "Device saved").expect("accepted");
    assert_eq!(device.status, DeviceStatus::Active);
    assert_eq!(device.custom_latitude, Some(14.7581));

    let page = client
        .list::<IotDevice>(&ListQuery::new().filter("status", DeviceStatus::Active))
        .await
        .expect("list");
    assert_eq!(page.items.len(), 1);
}

#[tokio::test]
async fn user_form_uses_pin_for_purok_leaders() {
    let (_dir, client) = serve().await;
    let roles = client.roles().await.expect("roles");
    assert!(roles.iter().any(|r| r.id == 3));

    let mut form = FormState::create();
    form.set("first_name", "Ana");
    form.set("last_name", "Cruz");
    form.set("email", "ana@barangay176.ph");
    form.set("role_id", 3);
    form.set("password", "12345678a");

    let payload = form.begin_submit().expect("submit");
    let outcome = client.create::<User>(&payload).await;
    assert!(form.apply_outcome(outcome, "User saved").is_none());
    assert_eq!(form.error("password"), Some("The PIN must contain digits only."));

    form.set("password", "4821");
    let payload = form.begin_submit().expect("resubmit");
    let outcome = client.create::<User>(&payload).await;
    let user = form.apply_outcome(outcome, "User saved").expect("accepted");
    assert!(user.is_purok_leader());
}

#[tokio::test]
async fn post_image_upload_through_client() {
    let (dir, client) = serve().await;
    let mut form = FormState::create();
    form.set("title", "Clean-up drive");
    form.set("content", "Saturday, 6 AM.");
    form.set("status", "published");
    let payload = form.begin_submit().expect("submit");
    let outcome = client.create::<PublicPost>(&payload).await;
    let post = form.apply_outcome(outcome, "Post saved").expect("accepted");

    let outcome = client
        .upload_post_image(&post.id, "poster.webp", "image/webp", b"webp".to_vec())
        .await
        .expect("upload");
    let SubmitOutcome::Accepted(post) = outcome else {
        panic!("upload should be accepted");
    };
    let path = post.image_path.expect("image path");
    assert!(dir.path().join(&path).exists());

    let outcome = client
        .upload_post_image(&post.id, "poster.bmp", "image/bmp", b"bmp".to_vec())
        .await
        .expect("upload");
    assert!(matches!(outcome, SubmitOutcome::Rejected(errors) if errors.has("image")));
}

#[tokio::test]
async fn missing_records_and_dead_servers_are_errors() {
    let (_dir, client) = serve().await;
    let err = client.get::<Contact>("404").await.expect_err("unknown id");
    assert!(matches!(err, ConsoleError::Server { status: 404, code: 1004, .. }));

    let dead = ConsoleClient::new("http://127.0.0.1:1");
    let mut form = FormState::create();
    form.set("location_name", "Plaza");
    let payload = form.begin_submit().expect("submit");
    let outcome = dead.create::<Location>(&payload).await;
    assert!(matches!(outcome, Err(ConsoleError::Network(_))));
    assert!(form.apply_outcome(outcome, "Saved").is_none());
    assert_eq!(form.toast.as_ref().map(|t| t.message.as_str()), Some(GENERIC_FAILURE));
    assert_eq!(form.draft["location_name"], "Plaza");
}
