use crate::client::{ConsoleError, SubmitOutcome};
use crate::input::sanitize_mobile;
use bantay_common::FieldErrors;
use serde::Serialize;
use serde_json::{Map, Value};

/// Editable field values of one form: field name -> value as submitted.
pub type Draft = Map<String, Value>;

/// Shown when a request fails for reasons the user cannot fix in the form.
pub const GENERIC_FAILURE: &str = "Something went wrong. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub kind: ToastKind,
    pub message: String,
}

impl Toast {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: ToastKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: ToastKind::Error,
            message: message.into(),
        }
    }
}

/// State of one create or edit dialog.
///
/// At most one submission is in flight: [`FormState::begin_submit`] hands
/// out the payload and refuses again until [`FormState::apply_outcome`]
/// records how the request ended.
#[derive(Debug, Clone, Default)]
pub struct FormState {
    pub draft: Draft,
    pub errors: FieldErrors,
    pub submitting: bool,
    pub toast: Option<Toast>,
    /// False once a submission was accepted and the dialog should close.
    pub open: bool,
}

impl FormState {
    /// An empty create form.
    pub fn create() -> Self {
        Self {
            open: true,
            ..Self::default()
        }
    }

    /// An edit form pre-filled from a stored record.
    ///
    /// Bookkeeping columns are left out of the draft. A record that does
    /// not serialize to an object yields an empty draft.
    pub fn edit<T: Serialize>(record: &T) -> Self {
        let mut draft = match serde_json::to_value(record) {
            Ok(Value::Object(map)) => map,
            _ => Draft::new(),
        };
        for key in ["id", "archived", "archived_at", "created_at", "updated_at"] {
            draft.remove(key);
        }
        Self {
            draft,
            open: true,
            ..Self::default()
        }
    }

    /// Sets a field and clears its stale error message.
    pub fn set(&mut self, field: &str, value: impl Into<Value>) {
        self.draft.insert(field.to_string(), value.into());
        self.errors.remove(field);
    }

    /// Sets a mobile number field from raw keyboard input.
    pub fn set_mobile(&mut self, field: &str, raw: &str) {
        self.set(field, sanitize_mobile(raw));
    }

    pub fn error(&self, field: &str) -> Option<&str> {
        self.errors.get(field)
    }

    /// Returns the payload to submit, or `None` while a request is already
    /// outstanding.
    pub fn begin_submit(&mut self) -> Option<Draft> {
        if self.submitting {
            return None;
        }
        self.submitting = true;
        self.toast = None;
        Some(self.draft.clone())
    }

    /// Reconciles the form with the result of its submission.
    ///
    /// Accepted: errors clear, the dialog closes, a success toast shows and
    /// the stored record is returned. Rejected: the per-field messages are
    /// shown next to the inputs. Transport failure: the draft is kept as
    /// typed and a generic error toast shows.
    pub fn apply_outcome<T>(
        &mut self,
        result: Result<SubmitOutcome<T>, ConsoleError>,
        success_message: &str,
    ) -> Option<T> {
        self.submitting = false;
        match result {
            Ok(SubmitOutcome::Accepted(record)) => {
                self.errors.clear();
                self.open = false;
                self.toast = Some(Toast::success(success_message));
                Some(record)
            }
            Ok(SubmitOutcome::Rejected(errors)) => {
                self.errors = errors;
                None
            }
            Err(e) => {
                tracing::warn!(error = %e, "Form submission failed");
                self.toast = Some(Toast::error(GENERIC_FAILURE));
                None
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveAction {
    Archive,
    Restore,
}

impl ArchiveAction {
    pub fn verb(&self) -> &'static str {
        match self {
            ArchiveAction::Archive => "archive",
            ArchiveAction::Restore => "restore",
        }
    }
}

/// Confirmation dialog shown before a record is archived or restored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchivePrompt {
    pub id: String,
    pub label: String,
    pub action: ArchiveAction,
}

/// An archive or restore the user agreed to. Only
/// [`ArchivePrompt::confirm`] creates one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmedAction {
    pub(crate) id: String,
    pub(crate) action: ArchiveAction,
}

impl ConfirmedAction {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn action(&self) -> ArchiveAction {
        self.action
    }
}

impl ArchivePrompt {
    pub fn archive(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            action: ArchiveAction::Archive,
        }
    }

    pub fn restore(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            action: ArchiveAction::Restore,
        }
    }

    pub fn question(&self) -> String {
        match self.action {
            ArchiveAction::Archive => format!(
                "Archive {}? It will be hidden from the list until restored.",
                self.label
            ),
            ArchiveAction::Restore => format!("Restore {}?", self.label),
        }
    }

    pub fn confirm(self) -> ConfirmedAction {
        ConfirmedAction {
            id: self.id,
            action: self.action,
        }
    }
}
