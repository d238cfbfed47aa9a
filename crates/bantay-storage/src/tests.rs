use crate::filter::*;
use crate::{ConsoleStore, StorageError};
use bantay_common::types::*;
use bantay_rules::RecordLookup;
use chrono::{TimeZone, Utc};
use tempfile::TempDir;

fn setup() -> (TempDir, ConsoleStore) {
    bantay_common::id::init(1, 1);
    let dir = TempDir::new().unwrap();
    let store = ConsoleStore::open(dir.path()).unwrap();
    (dir, store)
}

fn plaza() -> LocationInput {
    LocationInput {
        location_name: "Plaza".into(),
        barangay: "176-E".into(),
        landmark: Some("Covered court".into()),
        description: None,
        latitude: 14.7565,
        longitude: 121.0312,
    }
}

fn gate_cam(location_id: &str) -> CctvDeviceInput {
    CctvDeviceInput {
        device_name: "Gate Cam 1".into(),
        primary_rtsp_url: "rtsp://10.0.0.5/1".into(),
        backup_rtsp_url: None,
        location_id: location_id.into(),
        status: DeviceStatus::Active,
        fps: Some(30),
        resolution: Some(Resolution::Fhd1080p),
        description: None,
    }
}

fn staff_user(email: &str) -> UserInput {
    UserInput {
        first_name: "Jose".into(),
        middle_name: None,
        last_name: "Rizal".into(),
        suffix: None,
        email: email.into(),
        role_id: 2,
        password: Some("Bantay#2024".into()),
        contact_number: Some("09171234567".into()),
        street: None,
        purok: Some("Purok 3".into()),
        barangay: Some("176-E".into()),
        city: Some("Caloocan".into()),
    }
}

#[test]
fn roles_are_seeded_once() {
    let dir = TempDir::new().unwrap();
    let store = ConsoleStore::open(dir.path()).unwrap();
    drop(store);
    let store = ConsoleStore::open(dir.path()).unwrap();
    let roles = store.list_roles().unwrap();
    let names: Vec<_> = roles.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, ["Administrator", "Barangay Staff", "Purok Leader"]);
    assert_eq!(roles[2].id, PUROK_LEADER_ROLE_ID);
    assert!(store.db_path().ends_with("bantay.db"));
}

#[test]
fn location_crud_and_archive() {
    let (_dir, store) = setup();
    let created = store.insert_location(&plaza()).unwrap();
    assert!(!created.archived);
    assert_eq!(store.get_location(&created.id).unwrap(), Some(created.clone()));

    let mut edit = plaza();
    edit.location_name = "Plaza Rizal".into();
    edit.landmark = None;
    let replaced = store.replace_location(&created.id, &edit).unwrap().unwrap();
    assert_eq!(replaced.location_name, "Plaza Rizal");
    assert_eq!(replaced.landmark, None);

    let archived = store.set_location_archived(&created.id, true).unwrap().unwrap();
    assert!(archived.archived);
    assert!(archived.archived_at.is_some());
    assert_eq!(store.count_locations(&LocationFilter::default()).unwrap(), 0);
    let only_archived = LocationFilter {
        archived: true,
        ..Default::default()
    };
    assert_eq!(store.count_locations(&only_archived).unwrap(), 1);

    let restored = store.set_location_archived(&created.id, false).unwrap().unwrap();
    assert!(!restored.archived);
    assert_eq!(restored.archived_at, None);
}

#[test]
fn unknown_ids_are_none() {
    let (_dir, store) = setup();
    assert_eq!(store.get_contact("404").unwrap(), None);
    assert_eq!(store.replace_location("404", &plaza()).unwrap(), None);
    assert_eq!(store.set_post_archived("404", true).unwrap(), None);
    assert_eq!(store.set_post_image("404", "uploads/posts/404.png").unwrap(), None);
}

#[test]
fn location_named_lookup_ignores_case() {
    let (_dir, store) = setup();
    let plaza = store.insert_location(&plaza()).unwrap();
    store.set_location_archived(&plaza.id, true).unwrap();
    assert!(store.location_exists_named("PLAZA", "176-e").unwrap());
    assert!(!store.location_exists_named("Plaza", "176-F").unwrap());
}

#[test]
fn offset_past_the_end_returns_no_rows() {
    let (_dir, store) = setup();
    store.insert_location(&plaza()).unwrap();
    let filter = LocationFilter::default();
    assert_eq!(store.list_locations(&filter, 20, 1).unwrap().len(), 0);
    assert_eq!(store.list_locations(&filter, 20, (1u64 << 63) as usize).unwrap().len(), 0);
    assert_eq!(store.list_locations(&filter, 20, usize::MAX).unwrap().len(), 0);
    assert_eq!(store.list_locations(&filter, usize::MAX, 0).unwrap().len(), 1);
}

#[test]
fn location_search_and_paging() {
    let (_dir, store) = setup();
    for (name, barangay) in [("Plaza", "176-E"), ("Health Center", "176-E"), ("Market 100%", "176-F")] {
        let mut input = plaza();
        input.location_name = name.into();
        input.barangay = barangay.into();
        store.insert_location(&input).unwrap();
    }
    let search = |term: &str| LocationFilter {
        search: Some(term.into()),
        ..Default::default()
    };
    assert_eq!(store.count_locations(&search("health")).unwrap(), 1);
    assert_eq!(store.count_locations(&search("100%")).unwrap(), 1);
    assert_eq!(store.count_locations(&search("%")).unwrap(), 1);

    let by_barangay = LocationFilter {
        barangay: Some("176-E".into()),
        ..Default::default()
    };
    let page = store.list_locations(&by_barangay, 1, 1).unwrap();
    assert_eq!(page.len(), 1);
    assert_eq!(page[0].location_name, "Plaza");
    assert_eq!(store.count_locations(&by_barangay).unwrap(), 2);
}

#[test]
fn cctv_joins_location_name_and_filters() {
    let (_dir, store) = setup();
    let location = store.insert_location(&plaza()).unwrap();
    let cam = store.insert_cctv_device(&gate_cam(&location.id)).unwrap();
    assert_eq!(cam.location_name.as_deref(), Some("Plaza"));
    assert_eq!(cam.resolution, Some(Resolution::Fhd1080p));

    let mut other = gate_cam(&location.id);
    other.device_name = "Alley Cam".into();
    other.status = DeviceStatus::Maintenance;
    store.insert_cctv_device(&other).unwrap();

    let maintenance = CctvFilter {
        status: Some(DeviceStatus::Maintenance),
        ..Default::default()
    };
    let listed = store.list_cctv_devices(&maintenance, 20, 0).unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].device_name, "Alley Cam");

    let by_location_name = CctvFilter {
        search: Some("plaza".into()),
        ..Default::default()
    };
    assert_eq!(store.count_cctv_devices(&by_location_name).unwrap(), 2);
}

#[test]
fn cctv_requires_existing_location() {
    let (_dir, store) = setup();
    let err = store.insert_cctv_device(&gate_cam("999")).unwrap_err();
    assert!(matches!(err, StorageError::Conflict(_)), "{err}");
}

#[test]
fn iot_switches_location_source_on_replace() {
    let (_dir, store) = setup();
    let location = store.insert_location(&plaza()).unwrap();
    let cam = store.insert_cctv_device(&gate_cam(&location.id)).unwrap();

    let custom = IotDeviceInput {
        device_name: "Flood Sensor A".into(),
        status: DeviceStatus::Active,
        location_id: None,
        custom_address: Some("Phase 1 creek".into()),
        custom_latitude: Some(14.75),
        custom_longitude: Some(121.03),
        cctv_id: Some(cam.id.clone()),
        description: None,
    };
    let device = store.insert_iot_device(&custom).unwrap();
    assert_eq!(device.cctv_name.as_deref(), Some("Gate Cam 1"));
    assert_eq!(device.location_name, None);

    let predefined = IotDeviceInput {
        location_id: Some(location.id.clone()),
        custom_address: None,
        custom_latitude: None,
        custom_longitude: None,
        ..custom
    };
    let device = store.replace_iot_device(&device.id, &predefined).unwrap().unwrap();
    assert_eq!(device.location_name.as_deref(), Some("Plaza"));
    assert_eq!(device.custom_address, None);

    let search = IotFilter {
        search: Some("plaza".into()),
        ..Default::default()
    };
    assert_eq!(store.count_iot_devices(&search).unwrap(), 1);
}

#[test]
fn contact_filters_by_enum_columns() {
    let (_dir, store) = setup();
    for (unit, responder) in [
        (BranchUnit::DisasterRisk, ResponderType::Rescue),
        (BranchUnit::HealthEmergency, ResponderType::Medical),
    ] {
        store
            .insert_contact(&ContactInput {
                branch_unit_name: unit,
                responder_type: responder,
                primary_mobile: "09171234567".into(),
                backup_mobile: None,
                latitude: None,
                longitude: None,
            })
            .unwrap();
    }
    let medical = ContactFilter {
        responder_type: Some(ResponderType::Medical),
        ..Default::default()
    };
    let listed = store.list_contacts(&medical, 20, 0).unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].branch_unit_name, BranchUnit::HealthEmergency);
}

#[test]
fn post_keeps_image_across_replace() {
    let (_dir, store) = setup();
    let input = PublicPostInput {
        title: "Clean-up drive".into(),
        content: "Saturday".into(),
        category: Some(PostCategory::Event),
        status: PostStatus::Scheduled,
        published_at: Some(Utc.with_ymd_and_hms(2026, 11, 1, 0, 0, 0).unwrap()),
    };
    let post = store.insert_post(&input).unwrap();
    assert_eq!(post.published_at, input.published_at);

    let post = store
        .set_post_image(&post.id, "uploads/posts/1.png")
        .unwrap()
        .unwrap();
    let replaced = store
        .replace_post(
            &post.id,
            &PublicPostInput {
                status: PostStatus::Published,
                ..input
            },
        )
        .unwrap()
        .unwrap();
    assert_eq!(replaced.image_path.as_deref(), Some("uploads/posts/1.png"));
    assert_eq!(replaced.status, PostStatus::Published);

    let events = PostFilter {
        category: Some(PostCategory::Event),
        ..Default::default()
    };
    assert_eq!(store.count_posts(&events).unwrap(), 1);
}

#[test]
fn user_replace_without_password_keeps_hash() {
    let (_dir, store) = setup();
    let user = store.insert_user(&staff_user("jose@barangay176.ph")).unwrap();
    assert_eq!(user.role_name.as_deref(), Some("Barangay Staff"));
    assert!(store.verify_user_credential(&user.id, "Bantay#2024").unwrap());

    let mut edit = staff_user("jose@barangay176.ph");
    edit.password = None;
    edit.last_name = "Mercado".into();
    let edited = store.replace_user(&user.id, &edit).unwrap().unwrap();
    assert_eq!(edited.last_name, "Mercado");
    assert!(store.verify_user_credential(&user.id, "Bantay#2024").unwrap());

    edit.password = Some("4821".into());
    edit.role_id = PUROK_LEADER_ROLE_ID;
    store.replace_user(&user.id, &edit).unwrap().unwrap();
    assert!(store.verify_user_credential(&user.id, "4821").unwrap());
    assert!(!store.verify_user_credential(&user.id, "Bantay#2024").unwrap());
    assert!(!store.verify_user_credential("404", "4821").unwrap());
}

#[test]
fn user_email_is_unique_ignoring_case() {
    let (_dir, store) = setup();
    let first = store.insert_user(&staff_user("jose@barangay176.ph")).unwrap();
    let err = store
        .insert_user(&staff_user("JOSE@barangay176.ph"))
        .unwrap_err();
    assert!(matches!(err, StorageError::Conflict(_)));

    assert!(store.email_taken("Jose@Barangay176.ph", None).unwrap());
    assert!(!store.email_taken("jose@barangay176.ph", Some(&first.id)).unwrap());
    assert!(!store.email_taken("maria@barangay176.ph", None).unwrap());
}

#[test]
fn user_filters_by_role_and_name() {
    let (_dir, store) = setup();
    store.insert_user(&staff_user("jose@barangay176.ph")).unwrap();
    let mut leader = staff_user("maria@barangay176.ph");
    leader.first_name = "Maria".into();
    leader.role_id = PUROK_LEADER_ROLE_ID;
    leader.password = Some("4821".into());
    store.insert_user(&leader).unwrap();

    let leaders = UserFilter {
        role_id: Some(PUROK_LEADER_ROLE_ID),
        ..Default::default()
    };
    let listed = store.list_users(&leaders, 20, 0).unwrap();
    assert_eq!(listed.len(), 1);
    assert!(listed[0].is_purok_leader());

    let by_name = UserFilter {
        search: Some("mar".into()),
        ..Default::default()
    };
    assert_eq!(store.count_users(&by_name).unwrap(), 1);
}

#[test]
fn lookup_sees_archived_rows() {
    let (_dir, store) = setup();
    let location = store.insert_location(&plaza()).unwrap();
    store.set_location_archived(&location.id, true).unwrap();
    assert!(store.location_exists(&location.id).unwrap());
    assert!(!store.location_exists("404").unwrap());
    assert!(!store.cctv_exists("404").unwrap());
    assert!(store.role_exists(3).unwrap());
    assert!(!store.role_exists(4).unwrap());
}

#[test]
fn store_backs_the_validation_rules() {
    let (_dir, store) = setup();
    let location = store.insert_location(&plaza()).unwrap();
    let record = serde_json::json!({
        "device_name": "Gate Cam 1",
        "primary_rtsp_url": "rtsp://x/1",
        "location_id": location.id,
        "status": "active",
    });
    let input = bantay_rules::validate_cctv_device(
        record.as_object().unwrap(),
        &bantay_rules::Mode::Create,
        &store,
    )
    .unwrap();
    assert_eq!(input.location_id, location.id);
}
