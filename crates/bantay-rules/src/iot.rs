use bantay_common::types::{DeviceStatus, IotDeviceInput};

use crate::fields::{Checker, Presence::*};
use crate::{Mode, RawRecord, RecordLookup, ValidationError};

const CUSTOM_FIELDS: [&str; 3] = ["custom_address", "custom_latitude", "custom_longitude"];

/// Validates an IoT device. The device sits either at a predefined
/// location (`location_id`) or at a custom address with coordinates; when
/// both are sent the predefined location wins and the custom fields are
/// dropped from the result.
pub fn validate_iot_device<L: RecordLookup + ?Sized>(
    record: &RawRecord,
    _mode: &Mode,
    lookup: &L,
) -> Result<IotDeviceInput, ValidationError> {
    let mut c = Checker::new(record);

    let device_name = c.string("device_name", Required, 255);
    let status = c.choice::<DeviceStatus>("status", Required);
    let location_id = c.reference("location_id", Optional);
    if let Some(id) = location_id.as_deref() {
        c.exists("location_id", lookup, |l| l.location_exists(id))?;
    }
    let custom_address = c.string("custom_address", Optional, 500);
    let custom_latitude = c.number("custom_latitude", Optional, -90.0, 90.0);
    let custom_longitude = c.number("custom_longitude", Optional, -180.0, 180.0);
    let cctv_id = c.reference("cctv_id", Optional);
    if let Some(id) = cctv_id.as_deref() {
        c.exists("cctv_id", lookup, |l| l.cctv_exists(id))?;
    }
    let description = c.string("description", Optional, 1000);

    let (Some(device_name), Some(status)) = (device_name, status) else {
        return Err(c.into_errors().into());
    };
    if c.has_errors() {
        return Err(c.into_errors().into());
    }

    let mut input = IotDeviceInput {
        device_name,
        status,
        location_id,
        custom_address,
        custom_latitude,
        custom_longitude,
        cctv_id,
        description,
    };

    if input.location_id.is_some() {
        input.custom_address = None;
        input.custom_latitude = None;
        input.custom_longitude = None;
    } else if CUSTOM_FIELDS.iter().any(|f| !c.is_filled(f)) {
        c.fail("location", "required", &[]);
        return Err(c.into_errors().into());
    }

    Ok(input)
}
