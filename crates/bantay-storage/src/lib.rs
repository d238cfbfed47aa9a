//! SQLite persistence for the barangay console.
//!
//! A single [`ConsoleStore`] owns the `bantay.db` connection and exposes
//! insert/get/list/count/replace/archive operations for every entity. It
//! also answers the exists/unique questions of the validation rules through
//! [`bantay_rules::RecordLookup`].

pub mod auth;
pub mod error;
pub mod filter;
pub mod store;

#[cfg(test)]
mod tests;

pub use error::{Result, StorageError};
pub use filter::{
    CctvFilter, ContactFilter, IotFilter, LocationFilter, PostFilter, UserFilter,
};
pub use store::ConsoleStore;
