use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Field name -> human-readable message for one rejected submission.
///
/// Only the first failing rule per field is kept, which is what a form
/// renders inline under each input. Cross-field failures use a synthetic
/// key such as `location`.
///
/// # Examples
///
/// ```
/// use bantay_common::FieldErrors;
///
/// let mut errors = FieldErrors::new();
/// errors.add("fps", "The fps may not be greater than 120.");
/// errors.add("fps", "ignored, fps already has a message");
/// assert_eq!(errors.get("fps"), Some("The fps may not be greater than 120."));
/// assert_eq!(errors.len(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `message` for `field` unless the field already failed.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_insert_with(|| message.into());
    }

    pub fn has(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn remove(&mut self, field: &str) -> Option<String> {
        self.0.remove(field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Message of the alphabetically first failing field, used when only one
    /// line can be shown.
    pub fn first(&self) -> Option<(&str, &str)> {
        self.iter().next()
    }

    /// `Ok(value)` when nothing failed, otherwise the collected errors.
    pub fn into_result<T>(self, value: T) -> Result<T, FieldErrors> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in self.iter() {
            if !first {
                f.write_str("; ")?;
            }
            first = false;
            write!(f, "{field}: {message}")?;
        }
        Ok(())
    }
}

impl std::error::Error for FieldErrors {}

impl FromIterator<(String, String)> for FieldErrors {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        let mut errors = FieldErrors::new();
        for (field, message) in iter {
            errors.add(field, message);
        }
        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_as_flat_object() {
        let mut errors = FieldErrors::new();
        errors.add("location", "Select a location or provide a custom address.");
        let json = serde_json::to_value(&errors).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"location": "Select a location or provide a custom address."})
        );
        let back: FieldErrors = serde_json::from_value(json).unwrap();
        assert_eq!(back, errors);
    }

    #[test]
    fn into_result_passes_value_through_when_empty() {
        assert_eq!(FieldErrors::new().into_result(7), Ok(7));
        let mut errors = FieldErrors::new();
        errors.add("title", "The title field is required.");
        assert!(errors.into_result(7).is_err());
    }

    #[test]
    fn first_is_alphabetical_by_field() {
        let mut errors = FieldErrors::new();
        errors.add("title", "The title field is required.");
        errors.add("content", "The content field is required.");
        assert_eq!(errors.first(), Some(("content", "The content field is required.")));
        assert_eq!(FieldErrors::new().first(), None);
    }
}
