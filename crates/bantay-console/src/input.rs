use crate::form::Draft;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Mobile numbers are stored as exactly this many digits.
pub const MOBILE_DIGITS: usize = 11;

/// Keeps only ASCII digits, at most [`MOBILE_DIGITS`] of them.
///
/// ```
/// use bantay_console::input::sanitize_mobile;
///
/// assert_eq!(sanitize_mobile("0917-123-4567"), "09171234567");
/// assert_eq!(sanitize_mobile("+63 917 123 45678"), "63917123456");
/// ```
pub fn sanitize_mobile(raw: &str) -> String {
    raw.chars()
        .filter(char::is_ascii_digit)
        .take(MOBILE_DIGITS)
        .collect()
}

/// Parses a typed coordinate. Blank or non-numeric text gives `None`.
pub fn parse_coordinate(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Where a form keeps the two halves of a coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoordinateFields {
    pub latitude: &'static str,
    pub longitude: &'static str,
}

impl CoordinateFields {
    /// Locations and contacts.
    pub const STANDARD: CoordinateFields = CoordinateFields {
        latitude: "latitude",
        longitude: "longitude",
    };

    /// IoT devices placed at a custom spot.
    pub const IOT_CUSTOM: CoordinateFields = CoordinateFields {
        latitude: "custom_latitude",
        longitude: "custom_longitude",
    };
}

/// A point chosen on the map picker.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapPick {
    pub latitude: f64,
    pub longitude: f64,
}

impl MapPick {
    /// Writes the point into `draft`, replacing whatever was typed.
    pub fn apply(&self, draft: &mut Draft, fields: CoordinateFields) {
        draft.insert(fields.latitude.to_string(), Value::from(self.latitude));
        draft.insert(fields.longitude.to_string(), Value::from(self.longitude));
    }

    /// Reads a point back from a draft, e.g. to center the picker on an
    /// existing record.
    pub fn from_draft(draft: &Draft, fields: CoordinateFields) -> Option<MapPick> {
        let read = |key: &str| match draft.get(key)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => parse_coordinate(s),
            _ => None,
        };
        Some(MapPick {
            latitude: read(fields.latitude)?,
            longitude: read(fields.longitude)?,
        })
    }
}
