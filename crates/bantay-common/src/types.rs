use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Role id reserved for Purok Leaders, who sign in with a numeric PIN
/// instead of a password.
pub const PUROK_LEADER_ROLE_ID: i64 = 3;

/// Maximum size of a public post image upload (5 MB).
pub const MAX_POST_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// Declares a closed set of string values with serde, `Display` and a
/// case-insensitive `FromStr`.
macro_rules! string_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
        pub enum $name {
            $(
                #[serde(rename = $text)]
                $variant,
            )+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text,)+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let wanted = s.trim();
                $name::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str().eq_ignore_ascii_case(wanted))
                    .ok_or_else(|| format!("unknown {}: {s}", stringify!($name)))
            }
        }
    };
}

string_enum! {
    /// Operational state shared by CCTV and IoT devices.
    ///
    /// ```
    /// use bantay_common::types::DeviceStatus;
    ///
    /// let status: DeviceStatus = "Maintenance".parse().unwrap();
    /// assert_eq!(status, DeviceStatus::Maintenance);
    /// assert_eq!(status.to_string(), "maintenance");
    /// ```
    DeviceStatus {
        Active => "active",
        Inactive => "inactive",
        Maintenance => "maintenance",
    }
}

string_enum! {
    /// Stream resolution of a CCTV device.
    Resolution {
        Uhd4k => "4k",
        Fhd1080p => "1080p",
        Hd720p => "720p",
        Sd480p => "480p",
    }
}

string_enum! {
    PostStatus {
        Draft => "draft",
        Published => "published",
        Scheduled => "scheduled",
    }
}

string_enum! {
    PostCategory {
        Announcement => "announcement",
        Advisory => "advisory",
        Event => "event",
        Emergency => "emergency",
    }
}

string_enum! {
    /// Barangay office an emergency contact belongs to.
    BranchUnit {
        PublicSafety => "bpso",
        DisasterRisk => "bdrrmo",
        HealthEmergency => "bhert",
        HealthCenter => "health_center",
        Lupon => "lupon",
        VawcDesk => "vawc_desk",
    }
}

string_enum! {
    ResponderType {
        Police => "police",
        Fire => "fire",
        Medical => "medical",
        Rescue => "rescue",
        Disaster => "disaster",
        Tanod => "tanod",
    }
}

// ---- validated inputs (what a rule set hands to persistence) ----

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct LocationInput {
    pub location_name: String,
    pub barangay: String,
    pub landmark: Option<String>,
    pub description: Option<String>,
    /// Decimal degrees, -90 to 90
    pub latitude: f64,
    /// Decimal degrees, -180 to 180
    pub longitude: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct CctvDeviceInput {
    pub device_name: String,
    /// rtsp://, rtsps://, http:// or https:// stream URL
    pub primary_rtsp_url: String,
    pub backup_rtsp_url: Option<String>,
    pub location_id: String,
    pub status: DeviceStatus,
    /// Frames per second, 1 to 120
    pub fps: Option<u32>,
    pub resolution: Option<Resolution>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ContactInput {
    pub branch_unit_name: BranchUnit,
    pub responder_type: ResponderType,
    /// Exactly 11 digits, e.g. 09171234567
    pub primary_mobile: String,
    pub backup_mobile: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// Where an IoT device is installed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum IotLocation<'a> {
    Predefined(&'a str),
    Custom {
        address: &'a str,
        latitude: f64,
        longitude: f64,
    },
}

/// Either `location_id` is set and the custom fields are empty, or all
/// three custom fields are set and `location_id` is empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct IotDeviceInput {
    pub device_name: String,
    pub status: DeviceStatus,
    pub location_id: Option<String>,
    pub custom_address: Option<String>,
    pub custom_latitude: Option<f64>,
    pub custom_longitude: Option<f64>,
    /// Camera watching the same spot, if any
    pub cctv_id: Option<String>,
    pub description: Option<String>,
}

impl IotDeviceInput {
    pub fn location(&self) -> Option<IotLocation<'_>> {
        if let Some(id) = self.location_id.as_deref() {
            return Some(IotLocation::Predefined(id));
        }
        match (
            self.custom_address.as_deref(),
            self.custom_latitude,
            self.custom_longitude,
        ) {
            (Some(address), Some(latitude), Some(longitude)) => Some(IotLocation::Custom {
                address,
                latitude,
                longitude,
            }),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct PublicPostInput {
    pub title: String,
    pub content: String,
    pub category: Option<PostCategory>,
    pub status: PostStatus,
    /// Required when status is `scheduled`
    pub published_at: Option<DateTime<Utc>>,
}

#[derive(Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct UserInput {
    pub first_name: String,
    pub middle_name: Option<String>,
    pub last_name: String,
    pub suffix: Option<String>,
    pub email: String,
    pub role_id: i64,
    /// Password, or numeric PIN for Purok Leaders. `None` on update keeps
    /// the stored credential.
    pub password: Option<String>,
    pub contact_number: Option<String>,
    pub street: Option<String>,
    pub purok: Option<String>,
    pub barangay: Option<String>,
    pub city: Option<String>,
}

impl std::fmt::Debug for UserInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserInput")
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("email", &self.email)
            .field("role_id", &self.role_id)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish_non_exhaustive()
    }
}

// ---- stored records ----

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Location {
    pub id: String,
    pub location_name: String,
    pub barangay: String,
    pub landmark: Option<String>,
    pub description: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub archived: bool,
    pub archived_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct CctvDevice {
    pub id: String,
    pub device_name: String,
    pub primary_rtsp_url: String,
    pub backup_rtsp_url: Option<String>,
    pub location_id: String,
    /// Joined from `locations` for list display
    pub location_name: Option<String>,
    pub status: DeviceStatus,
    pub fps: Option<u32>,
    pub resolution: Option<Resolution>,
    pub description: Option<String>,
    pub archived: bool,
    pub archived_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Contact {
    pub id: String,
    pub branch_unit_name: BranchUnit,
    pub responder_type: ResponderType,
    pub primary_mobile: String,
    pub backup_mobile: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub archived: bool,
    pub archived_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct IotDevice {
    pub id: String,
    pub device_name: String,
    pub status: DeviceStatus,
    pub location_id: Option<String>,
    /// Joined from `locations` when `location_id` is set
    pub location_name: Option<String>,
    pub custom_address: Option<String>,
    pub custom_latitude: Option<f64>,
    pub custom_longitude: Option<f64>,
    pub cctv_id: Option<String>,
    /// Joined from `cctv_devices` when `cctv_id` is set
    pub cctv_name: Option<String>,
    pub description: Option<String>,
    pub archived: bool,
    pub archived_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct PublicPost {
    pub id: String,
    pub title: String,
    pub content: String,
    pub category: Option<PostCategory>,
    pub status: PostStatus,
    pub published_at: Option<DateTime<Utc>>,
    /// Relative path of the uploaded image under the data directory
    pub image_path: Option<String>,
    pub archived: bool,
    pub archived_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Console account. The credential hash never leaves the storage layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct User {
    pub id: String,
    pub first_name: String,
    pub middle_name: Option<String>,
    pub last_name: String,
    pub suffix: Option<String>,
    pub email: String,
    pub role_id: i64,
    pub role_name: Option<String>,
    pub contact_number: Option<String>,
    pub street: Option<String>,
    pub purok: Option<String>,
    pub barangay: Option<String>,
    pub city: Option<String>,
    pub archived: bool,
    pub archived_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn full_name(&self) -> String {
        let mut parts = vec![self.first_name.as_str()];
        if let Some(middle) = self.middle_name.as_deref() {
            parts.push(middle);
        }
        parts.push(self.last_name.as_str());
        if let Some(suffix) = self.suffix.as_deref() {
            parts.push(suffix);
        }
        parts.join(" ")
    }

    pub fn is_purok_leader(&self) -> bool {
        self.role_id == PUROK_LEADER_ROLE_ID
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Role {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
}

/// Body of archive/restore requests; the console only sends it after the
/// user confirms the dialog.
#[derive(Debug, Clone, Default, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ArchiveRequest {
    #[serde(default)]
    pub confirm: bool,
}
