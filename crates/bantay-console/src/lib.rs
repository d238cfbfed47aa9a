//! Console-side building blocks for the barangay admin panel.
//!
//! A screen owns a [`form::FormState`] per open dialog, coerces raw input
//! with the helpers in [`input`], narrows an already-loaded page with the
//! predicates in [`filter`], and talks to the server through
//! [`client::ConsoleClient`]. Server-side rules stay authoritative; nothing
//! here rejects a submission on its own.

pub mod client;
pub mod filter;
pub mod form;
pub mod input;

pub use client::{ConsoleClient, ConsoleError, ListQuery, Page, Resource, SubmitOutcome};
pub use form::{ArchivePrompt, Draft, FormState, Toast, ToastKind};
