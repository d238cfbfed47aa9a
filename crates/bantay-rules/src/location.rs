use bantay_common::types::LocationInput;
use bantay_common::FieldErrors;

use crate::fields::{Checker, Presence::*};
use crate::{Mode, RawRecord};

/// Validates a location record. Locations have no cross-field rules and
/// need no lookups, so create and update share the same checks.
pub fn validate_location(record: &RawRecord, _mode: &Mode) -> Result<LocationInput, FieldErrors> {
    let mut c = Checker::new(record);

    let location_name = c.string("location_name", Required, 255);
    let barangay = c.string("barangay", Required, 100);
    let landmark = c.string("landmark", Optional, 255);
    let description = c.string("description", Optional, 1000);
    let latitude = c.number("latitude", Required, -90.0, 90.0);
    let longitude = c.number("longitude", Required, -180.0, 180.0);

    match (location_name, barangay, latitude, longitude) {
        (Some(location_name), Some(barangay), Some(latitude), Some(longitude))
            if !c.has_errors() =>
        {
            Ok(LocationInput {
                location_name,
                barangay,
                landmark,
                description,
                latitude,
                longitude,
            })
        }
        _ => Err(c.into_errors()),
    }
}
