use bantay_common::types::{CctvDeviceInput, DeviceStatus, Resolution};

use crate::fields::{Checker, Presence, Presence::*, STREAM_URL_REGEX};
use crate::{Mode, RawRecord, RecordLookup, ValidationError};

pub fn validate_cctv_device<L: RecordLookup + ?Sized>(
    record: &RawRecord,
    _mode: &Mode,
    lookup: &L,
) -> Result<CctvDeviceInput, ValidationError> {
    let mut c = Checker::new(record);

    let device_name = c.string("device_name", Required, 255);
    let primary_rtsp_url = stream_url(&mut c, "primary_rtsp_url", Required);
    let backup_rtsp_url = stream_url(&mut c, "backup_rtsp_url", Optional);
    let location_id = c.reference("location_id", Required);
    if let Some(id) = location_id.as_deref() {
        c.exists("location_id", lookup, |l| l.location_exists(id))?;
    }
    let status = c.choice::<DeviceStatus>("status", Required);
    let fps = c.integer("fps", Optional, 1, 120);
    let resolution = c.choice::<Resolution>("resolution", Optional);
    let description = c.string("description", Optional, 1000);

    match (device_name, primary_rtsp_url, location_id, status) {
        (Some(device_name), Some(primary_rtsp_url), Some(location_id), Some(status))
            if !c.has_errors() =>
        {
            Ok(CctvDeviceInput {
                device_name,
                primary_rtsp_url,
                backup_rtsp_url,
                location_id,
                status,
                fps: fps.map(|f| f as u32),
                resolution,
                description,
            })
        }
        _ => Err(c.into_errors().into()),
    }
}

fn stream_url(c: &mut Checker<'_>, field: &str, presence: Presence) -> Option<String> {
    let url = c.string(field, presence, 500)?;
    c.pattern(field, &url, &STREAM_URL_REGEX, "url", &[])
        .then_some(url)
}
