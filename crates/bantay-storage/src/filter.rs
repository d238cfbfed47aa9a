//! List filters. Every filter shows active records unless `archived` is set,
//! in which case only archived records are listed.

use bantay_common::types::{BranchUnit, DeviceStatus, PostCategory, PostStatus, ResponderType};

/// Name, barangay or landmark search over locations.
#[derive(Debug, Clone, Default)]
pub struct LocationFilter {
    pub search: Option<String>,
    pub barangay: Option<String>,
    pub archived: bool,
}

#[derive(Debug, Clone, Default)]
pub struct CctvFilter {
    /// Matches device name or location name.
    pub search: Option<String>,
    pub status: Option<DeviceStatus>,
    pub location_id: Option<String>,
    pub archived: bool,
}

#[derive(Debug, Clone, Default)]
pub struct ContactFilter {
    /// Matches either mobile number.
    pub search: Option<String>,
    pub branch_unit_name: Option<BranchUnit>,
    pub responder_type: Option<ResponderType>,
    pub archived: bool,
}

#[derive(Debug, Clone, Default)]
pub struct IotFilter {
    /// Matches device name, location name or custom address.
    pub search: Option<String>,
    pub status: Option<DeviceStatus>,
    pub archived: bool,
}

#[derive(Debug, Clone, Default)]
pub struct PostFilter {
    /// Matches title or content.
    pub search: Option<String>,
    pub status: Option<PostStatus>,
    pub category: Option<PostCategory>,
    pub archived: bool,
}

#[derive(Debug, Clone, Default)]
pub struct UserFilter {
    /// Matches any name part or the email.
    pub search: Option<String>,
    pub role_id: Option<i64>,
    pub archived: bool,
}
