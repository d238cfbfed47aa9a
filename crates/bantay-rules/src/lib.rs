//! Request validation for every record the console manages.
//!
//! Each entity has one pure function taking the raw submitted record (field
//! name -> JSON value), the operation [`Mode`] and, where a rule needs the
//! database, a [`RecordLookup`]. It returns the typed, trimmed input ready
//! for persistence or a [`FieldErrors`] map for the form to display.
//!
//! Per-field rules run first. Cross-field rules (IoT location source,
//! scheduled post date) run only once every field passed on its own.

mod cctv;
mod contact;
mod fields;
mod iot;
mod location;
pub mod messages;
mod post;
mod user;


pub use bantay_common::FieldErrors;
pub use cctv::validate_cctv_device;
pub use contact::validate_contact;
pub use iot::validate_iot_device;
pub use location::validate_location;
pub use post::{validate_post, validate_post_image, ImageKind};
pub use user::{validate_user, CredentialKind};

/// A submitted form: field name -> raw JSON value.
pub type RawRecord = serde_json::Map<String, serde_json::Value>;

/// Whether the submission creates a record or replaces an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode<'a> {
    Create,
    /// Full-record replace of the record with this id.
    Update { id: &'a str },
}

impl Mode<'_> {
    pub fn is_update(&self) -> bool {
        matches!(self, Mode::Update { .. })
    }

    pub fn record_id(&self) -> Option<&str> {
        match self {
            Mode::Create => None,
            Mode::Update { id } => Some(id),
        }
    }
}

/// Existence and uniqueness checks backed by persistence.
pub trait RecordLookup {
    type Error: std::fmt::Display;

    fn location_exists(&self, id: &str) -> Result<bool, Self::Error>;

    fn cctv_exists(&self, id: &str) -> Result<bool, Self::Error>;

    fn role_exists(&self, id: i64) -> Result<bool, Self::Error>;

    /// True when another user (not `except_id`) already uses `email`,
    /// compared case-insensitively.
    fn email_taken(&self, email: &str, except_id: Option<&str>) -> Result<bool, Self::Error>;
}

#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    /// The submission broke one or more rules.
    #[error("validation failed: {0}")]
    Invalid(FieldErrors),
    /// An exists/unique check could not reach persistence.
    #[error("record lookup failed: {0}")]
    Lookup(String),
}

impl From<FieldErrors> for ValidationError {
    fn from(errors: FieldErrors) -> Self {
        ValidationError::Invalid(errors)
    }
}

impl ValidationError {
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            ValidationError::Invalid(errors) => Some(errors),
            ValidationError::Lookup(_) => None,
        }
    }
}
