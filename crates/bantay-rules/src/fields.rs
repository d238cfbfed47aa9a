use bantay_common::FieldErrors;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;
use std::str::FromStr;

use crate::messages::message;
use crate::{RawRecord, RecordLookup, ValidationError};

lazy_static! {
    pub(crate) static ref EMAIL_REGEX: Regex = Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)+$"
    )
    .unwrap();
    pub(crate) static ref STREAM_URL_REGEX: Regex =
        Regex::new(r"^(?i)(rtsp|rtsps|http|https)://\S+$").unwrap();
    pub(crate) static ref MOBILE_REGEX: Regex = Regex::new(r"^[0-9]{11}$").unwrap();
    pub(crate) static ref DIGITS_REGEX: Regex = Regex::new(r"^[0-9]+$").unwrap();
}

/// Whether a field may be left empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Presence {
    Required,
    Optional,
}

use Presence::Required;

/// Reads fields out of a raw record and accumulates the first failure per
/// field. Empty and whitespace-only strings count as absent, the same way a
/// submitted blank input does.
pub(crate) struct Checker<'a> {
    record: &'a RawRecord,
    errors: FieldErrors,
}

impl<'a> Checker<'a> {
    pub fn new(record: &'a RawRecord) -> Self {
        Self {
            record,
            errors: FieldErrors::new(),
        }
    }

    pub fn fail(&mut self, field: &str, rule: &str, params: &[(&str, &str)]) {
        self.errors
            .add(field, message(&format!("{field}.{rule}"), params));
    }

    pub fn failed(&self, field: &str) -> bool {
        self.errors.has(field)
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn into_errors(self) -> FieldErrors {
        self.errors
    }

    /// Raw value when the field was filled in.
    pub fn value(&self, field: &str) -> Option<&'a Value> {
        match self.record.get(field)? {
            Value::Null => None,
            Value::String(s) if s.trim().is_empty() => None,
            other => Some(other),
        }
    }

    pub fn is_filled(&self, field: &str) -> bool {
        self.value(field).is_some()
    }

    fn absent(&mut self, field: &str, presence: Presence) {
        if presence == Required {
            self.fail(field, "required", &[]);
        }
    }

    /// Trimmed text of at most `max` characters.
    pub fn string(&mut self, field: &str, presence: Presence, max: usize) -> Option<String> {
        let Some(value) = self.value(field) else {
            self.absent(field, presence);
            return None;
        };
        let Value::String(raw) = value else {
            self.fail(field, "string", &[]);
            return None;
        };
        let text = raw.trim();
        if text.chars().count() > max {
            self.fail(field, "max_length", &[("max", &max.to_string())]);
            return None;
        }
        Some(text.to_string())
    }

    /// Number within `min..=max`, accepting JSON numbers and numeric text.
    pub fn number(&mut self, field: &str, presence: Presence, min: f64, max: f64) -> Option<f64> {
        let Some(value) = self.value(field) else {
            self.absent(field, presence);
            return None;
        };
        let parsed = match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        let Some(number) = parsed.filter(|n| n.is_finite()) else {
            self.fail(field, "numeric", &[]);
            return None;
        };
        if number < min || number > max {
            self.fail(
                field,
                "between",
                &[("min", &min.to_string()), ("max", &max.to_string())],
            );
            return None;
        }
        Some(number)
    }

    /// Whole number within `min..=max`.
    pub fn integer(&mut self, field: &str, presence: Presence, min: i64, max: i64) -> Option<i64> {
        let Some(value) = self.value(field) else {
            self.absent(field, presence);
            return None;
        };
        let Some(number) = as_integer(value) else {
            self.fail(field, "integer", &[]);
            return None;
        };
        if number < min {
            self.fail(field, "min", &[("min", &min.to_string())]);
            return None;
        }
        if number > max {
            self.fail(field, "max", &[("max", &max.to_string())]);
            return None;
        }
        Some(number)
    }

    /// One of a closed set of string values.
    pub fn choice<T: FromStr>(&mut self, field: &str, presence: Presence) -> Option<T> {
        let Some(value) = self.value(field) else {
            self.absent(field, presence);
            return None;
        };
        match value.as_str().map(str::parse::<T>) {
            Some(Ok(parsed)) => Some(parsed),
            _ => {
                self.fail(field, "in", &[]);
                None
            }
        }
    }

    /// Foreign key in decimal form, from a JSON number or digit string.
    pub fn reference(&mut self, field: &str, presence: Presence) -> Option<String> {
        let Some(value) = self.value(field) else {
            self.absent(field, presence);
            return None;
        };
        let id = match value {
            Value::Number(n) => n.as_u64().map(|v| v.to_string()),
            Value::String(s) => Some(s.trim().to_string()),
            _ => None,
        };
        match id.filter(|id| bantay_common::id::looks_like_id(id)) {
            Some(id) => Some(id),
            None => {
                self.fail(field, "exists", &[]);
                None
            }
        }
    }

    /// Date or date-time. Values without an offset are taken as UTC.
    pub fn date(&mut self, field: &str, presence: Presence) -> Option<DateTime<Utc>> {
        let Some(value) = self.value(field) else {
            self.absent(field, presence);
            return None;
        };
        match value.as_str().and_then(parse_date) {
            Some(date) => Some(date),
            None => {
                self.fail(field, "date", &[]);
                None
            }
        }
    }

    /// Fails `field` with `rule` unless `text` matches `pattern`.
    pub fn pattern(
        &mut self,
        field: &str,
        text: &str,
        pattern: &Regex,
        rule: &str,
        params: &[(&str, &str)],
    ) -> bool {
        if pattern.is_match(text) {
            true
        } else {
            self.fail(field, rule, params);
            false
        }
    }

    /// Runs an exists-style lookup for a field that already passed its
    /// format checks.
    pub fn exists<L, F>(
        &mut self,
        field: &str,
        lookup: &L,
        probe: F,
    ) -> Result<(), ValidationError>
    where
        L: RecordLookup + ?Sized,
        F: FnOnce(&L) -> Result<bool, L::Error>,
    {
        match probe(lookup) {
            Ok(true) => Ok(()),
            Ok(false) => {
                self.fail(field, "exists", &[]);
                Ok(())
            }
            Err(e) => {
                tracing::error!(field, error = %e, "record lookup failed during validation");
                Err(ValidationError::Lookup(e.to_string()))
            }
        }
    }

    /// Runs a unique-style lookup: `probe` answers whether the value is
    /// already taken.
    pub fn unique<L, F>(&mut self, field: &str, lookup: &L, probe: F) -> Result<(), ValidationError>
    where
        L: RecordLookup + ?Sized,
        F: FnOnce(&L) -> Result<bool, L::Error>,
    {
        match probe(lookup) {
            Ok(false) => Ok(()),
            Ok(true) => {
                self.fail(field, "unique", &[]);
                Ok(())
            }
            Err(e) => {
                tracing::error!(field, error = %e, "record lookup failed during validation");
                Err(ValidationError::Lookup(e.to_string()))
            }
        }
    }
}

fn as_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                .map(|f| f as i64)
        }),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

pub(crate) fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
