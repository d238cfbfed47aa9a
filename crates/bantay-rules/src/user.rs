use bantay_common::types::{UserInput, PUROK_LEADER_ROLE_ID};
use serde_json::Value;

use crate::fields::{Checker, Presence, Presence::*, DIGITS_REGEX, EMAIL_REGEX};
use crate::{contact::mobile, Mode, RawRecord, RecordLookup, ValidationError};

const PIN_MIN_DIGITS: usize = 4;
const PASSWORD_MIN_CHARS: usize = 8;
/// bcrypt only reads the first 72 bytes.
const CREDENTIAL_MAX_BYTES: usize = 72;

/// Which credential a role signs in with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialKind {
    /// Numeric PIN, used by Purok Leaders.
    Pin,
    Password,
}

impl CredentialKind {
    pub fn for_role(role_id: Option<i64>) -> Self {
        if role_id == Some(PUROK_LEADER_ROLE_ID) {
            CredentialKind::Pin
        } else {
            CredentialKind::Password
        }
    }

    /// Word substituted into credential messages.
    pub fn label(&self) -> &'static str {
        match self {
            CredentialKind::Pin => "PIN",
            CredentialKind::Password => "Password",
        }
    }
}

/// Validates a user account.
///
/// The credential rules depend on the submitted role: Purok Leaders need a
/// PIN of at least 4 digits, every other role a password of at least 8
/// characters mixing letters, numbers and symbols. On update a blank
/// credential means "keep the stored one" and the email uniqueness check
/// skips the user being edited.
pub fn validate_user<L: RecordLookup + ?Sized>(
    record: &RawRecord,
    mode: &Mode,
    lookup: &L,
) -> Result<UserInput, ValidationError> {
    let mut c = Checker::new(record);

    let first_name = c.string("first_name", Required, 100);
    let middle_name = c.string("middle_name", Optional, 100);
    let last_name = c.string("last_name", Required, 100);
    let suffix = c.string("suffix", Optional, 20);

    let email = c.string("email", Required, 255).filter(|email| {
        c.pattern("email", email, &EMAIL_REGEX, "email", &[])
    });
    if let Some(address) = email.as_deref() {
        c.unique("email", lookup, |l| l.email_taken(address, mode.record_id()))?;
    }

    let role_id = c.integer("role_id", Required, 1, i64::MAX);
    if let Some(id) = role_id {
        c.exists("role_id", lookup, |l| l.role_exists(id))?;
    }

    let kind = CredentialKind::for_role(role_id);
    let presence = if mode.is_update() { Optional } else { Required };
    let password = credential(&mut c, kind, presence);

    let contact_number = mobile(&mut c, "contact_number", Optional);
    let street = c.string("street", Optional, 255);
    let purok = c.string("purok", Optional, 100);
    let barangay = c.string("barangay", Optional, 100);
    let city = c.string("city", Optional, 100);

    match (first_name, last_name, email, role_id) {
        (Some(first_name), Some(last_name), Some(email), Some(role_id)) if !c.has_errors() => {
            Ok(UserInput {
                first_name,
                middle_name,
                last_name,
                suffix,
                email,
                role_id,
                password,
                contact_number,
                street,
                purok,
                barangay,
                city,
            })
        }
        _ => Err(c.into_errors().into()),
    }
}

/// The password or PIN, untrimmed. `None` when left blank on update.
fn credential(c: &mut Checker<'_>, kind: CredentialKind, presence: Presence) -> Option<String> {
    let label = kind.label();
    let secret = match c.value("password") {
        None => {
            if presence == Required {
                c.fail("password", "required", &[("label", label)]);
            }
            return None;
        }
        Some(Value::String(s)) => s.as_str(),
        Some(_) => {
            c.fail("password", "string", &[]);
            return None;
        }
    };

    if secret.len() > CREDENTIAL_MAX_BYTES {
        c.fail(
            "password",
            "max_length",
            &[("max", &CREDENTIAL_MAX_BYTES.to_string())],
        );
        return None;
    }

    match kind {
        CredentialKind::Pin => {
            if !DIGITS_REGEX.is_match(secret) {
                c.fail("password", "pin_digits", &[("label", label)]);
                return None;
            }
            if secret.len() < PIN_MIN_DIGITS {
                let min = PIN_MIN_DIGITS.to_string();
                c.fail("password", "pin_min", &[("label", label), ("min", &min)]);
                return None;
            }
        }
        CredentialKind::Password => {
            if secret.chars().count() < PASSWORD_MIN_CHARS {
                let min = PASSWORD_MIN_CHARS.to_string();
                c.fail("password", "min", &[("label", label), ("min", &min)]);
                return None;
            }
            if !secret.chars().any(char::is_alphabetic) {
                c.fail("password", "letters", &[("label", label)]);
                return None;
            }
            if !secret.chars().any(|ch| ch.is_ascii_digit()) {
                c.fail("password", "numbers", &[("label", label)]);
                return None;
            }
            if secret.chars().all(char::is_alphanumeric) {
                c.fail("password", "symbols", &[("label", label)]);
                return None;
            }
        }
    }

    Some(secret.to_string())
}
