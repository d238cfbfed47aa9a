//! Narrowing of an already-loaded page. Text matches are case-insensitive
//! contains-matches; enum and reference matches are exact. An empty filter
//! keeps everything.

use bantay_common::types::{
    BranchUnit, CctvDevice, Contact, DeviceStatus, IotDevice, Location, PostCategory, PostStatus,
    PublicPost, ResponderType, User,
};

pub trait ListFilter<T> {
    fn matches(&self, item: &T) -> bool;

    fn apply<'a>(&self, items: &'a [T]) -> Vec<&'a T> {
        items.iter().filter(|item| self.matches(item)).collect()
    }
}

fn search_term(search: &str) -> Option<String> {
    let term = search.trim();
    (!term.is_empty()).then(|| term.to_lowercase())
}

/// True when `term` is unset or any of `fields` contains it.
fn any_contains(term: Option<&str>, fields: &[Option<&str>]) -> bool {
    let Some(term) = term else {
        return true;
    };
    fields
        .iter()
        .flatten()
        .any(|field| field.to_lowercase().contains(term))
}

fn eq_or_unset<V: PartialEq>(wanted: &Option<V>, actual: &V) -> bool {
    wanted.as_ref().map_or(true, |w| w == actual)
}

#[derive(Debug, Clone, Default)]
pub struct LocationFilter {
    /// Name, barangay or landmark
    pub search: String,
    pub barangay: Option<String>,
}

impl ListFilter<Location> for LocationFilter {
    fn matches(&self, item: &Location) -> bool {
        let term = search_term(&self.search);
        any_contains(
            term.as_deref(),
            &[
                Some(item.location_name.as_str()),
                Some(item.barangay.as_str()),
                item.landmark.as_deref(),
            ],
        ) && self
            .barangay
            .as_deref()
            .map_or(true, |b| b.eq_ignore_ascii_case(&item.barangay))
    }
}

#[derive(Debug, Clone, Default)]
pub struct CctvFilter {
    /// Device name or location name
    pub search: String,
    pub status: Option<DeviceStatus>,
    pub location_id: Option<String>,
}

impl ListFilter<CctvDevice> for CctvFilter {
    fn matches(&self, item: &CctvDevice) -> bool {
        let term = search_term(&self.search);
        any_contains(
            term.as_deref(),
            &[Some(item.device_name.as_str()), item.location_name.as_deref()],
        ) && eq_or_unset(&self.status, &item.status)
            && eq_or_unset(&self.location_id, &item.location_id)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ContactFilter {
    /// Either mobile number
    pub search: String,
    pub branch_unit_name: Option<BranchUnit>,
    pub responder_type: Option<ResponderType>,
}

impl ListFilter<Contact> for ContactFilter {
    fn matches(&self, item: &Contact) -> bool {
        let term = search_term(&self.search);
        any_contains(
            term.as_deref(),
            &[Some(item.primary_mobile.as_str()), item.backup_mobile.as_deref()],
        ) && eq_or_unset(&self.branch_unit_name, &item.branch_unit_name)
            && eq_or_unset(&self.responder_type, &item.responder_type)
    }
}

#[derive(Debug, Clone, Default)]
pub struct IotFilter {
    /// Device name, location name or custom address
    pub search: String,
    pub status: Option<DeviceStatus>,
}

impl ListFilter<IotDevice> for IotFilter {
    fn matches(&self, item: &IotDevice) -> bool {
        let term = search_term(&self.search);
        any_contains(
            term.as_deref(),
            &[
                Some(item.device_name.as_str()),
                item.location_name.as_deref(),
                item.custom_address.as_deref(),
            ],
        ) && eq_or_unset(&self.status, &item.status)
    }
}

#[derive(Debug, Clone, Default)]
pub struct PostFilter {
    /// Title or category name
    pub search: String,
    pub status: Option<PostStatus>,
    pub category: Option<PostCategory>,
}

impl ListFilter<PublicPost> for PostFilter {
    fn matches(&self, item: &PublicPost) -> bool {
        let term = search_term(&self.search);
        any_contains(
            term.as_deref(),
            &[Some(item.title.as_str()), item.category.as_ref().map(PostCategory::as_str)],
        ) && eq_or_unset(&self.status, &item.status)
            && self.category.map_or(true, |c| item.category == Some(c))
    }
}

#[derive(Debug, Clone, Default)]
pub struct UserFilter {
    /// Full name or email
    pub search: String,
    pub role_id: Option<i64>,
}

impl ListFilter<User> for UserFilter {
    fn matches(&self, item: &User) -> bool {
        let term = search_term(&self.search);
        let full_name = item.full_name();
        any_contains(term.as_deref(), &[Some(full_name.as_str()), Some(item.email.as_str())])
            && eq_or_unset(&self.role_id, &item.role_id)
    }
}
