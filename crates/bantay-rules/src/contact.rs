use bantay_common::types::{BranchUnit, ContactInput, ResponderType};
use bantay_common::FieldErrors;

use crate::fields::{Checker, Presence, Presence::*, MOBILE_REGEX};
use crate::{Mode, RawRecord};

pub fn validate_contact(record: &RawRecord, _mode: &Mode) -> Result<ContactInput, FieldErrors> {
    let mut c = Checker::new(record);

    let branch_unit_name = c.choice::<BranchUnit>("branch_unit_name", Required);
    let responder_type = c.choice::<ResponderType>("responder_type", Required);
    let primary_mobile = mobile(&mut c, "primary_mobile", Required);
    let backup_mobile = mobile(&mut c, "backup_mobile", Optional);
    let latitude = c.number("latitude", Optional, -90.0, 90.0);
    let longitude = c.number("longitude", Optional, -180.0, 180.0);

    match (branch_unit_name, responder_type, primary_mobile) {
        (Some(branch_unit_name), Some(responder_type), Some(primary_mobile))
            if !c.has_errors() =>
        {
            Ok(ContactInput {
                branch_unit_name,
                responder_type,
                primary_mobile,
                backup_mobile,
                latitude,
                longitude,
            })
        }
        _ => Err(c.into_errors()),
    }
}

/// Trimmed mobile number of exactly 11 digits.
pub(crate) fn mobile(c: &mut Checker<'_>, field: &str, presence: Presence) -> Option<String> {
    let number = c.string(field, presence, usize::MAX)?;
    c.pattern(field, &number, &MOBILE_REGEX, "digits", &[])
        .then_some(number)
}
