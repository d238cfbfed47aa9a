//! Static error messages keyed by `field.rule`.
//!
//! A key without a specific entry falls back to the generic text for its
//! rule. Substitution is limited to `{attribute}` (the field name with
//! underscores as spaces) and the named parameters passed by the caller.

const SPECIFIC: &[(&str, &str)] = &[
    (
        "primary_mobile.digits",
        "The primary mobile number must be exactly 11 digits.",
    ),
    (
        "backup_mobile.digits",
        "The backup mobile number must be exactly 11 digits.",
    ),
    (
        "contact_number.digits",
        "The contact number must be exactly 11 digits.",
    ),
    (
        "location.required",
        "Select a location or provide a custom address, latitude and longitude.",
    ),
    (
        "published_at.required_if",
        "The publish date is required when the post is scheduled.",
    ),
    ("location_id.exists", "The selected location does not exist."),
    ("cctv_id.exists", "The selected camera does not exist."),
    ("role_id.exists", "The selected role does not exist."),
    ("email.unique", "This email address is already registered."),
    ("password.required", "The {label} field is required."),
    ("password.pin_digits", "The {label} must contain digits only."),
    ("password.pin_min", "The {label} must be at least {min} digits."),
    ("password.min", "The {label} must be at least {min} characters."),
    ("password.letters", "The {label} must contain at least one letter."),
    ("password.numbers", "The {label} must contain at least one number."),
    ("password.symbols", "The {label} must contain at least one symbol."),
    (
        "image.mimes",
        "The image must be a file of type: jpeg, png, jpg, webp.",
    ),
    ("image.max", "The image may not be greater than {max} kilobytes."),
];

fn generic(rule: &str) -> &'static str {
    match rule {
        "required" => "The {attribute} field is required.",
        "string" => "The {attribute} must be a string.",
        "max_length" => "The {attribute} may not be greater than {max} characters.",
        "numeric" => "The {attribute} must be a number.",
        "integer" => "The {attribute} must be an integer.",
        "between" => "The {attribute} must be between {min} and {max}.",
        "min" => "The {attribute} must be at least {min}.",
        "max" => "The {attribute} may not be greater than {max}.",
        "in" | "exists" => "The selected {attribute} is invalid.",
        "url" => "The {attribute} must be a valid stream URL.",
        "email" => "The {attribute} must be a valid email address.",
        "date" => "The {attribute} is not a valid date.",
        "unique" => "The {attribute} has already been taken.",
        "digits" => "The {attribute} must be exactly {digits} digits.",
        _ => "The {attribute} is invalid.",
    }
}

/// Resolves `key` (`field.rule`) to its message.
///
/// ```
/// use bantay_rules::messages::message;
///
/// assert_eq!(
///     message("fps.max", &[("max", "120")]),
///     "The fps may not be greater than 120."
/// );
/// assert_eq!(
///     message("password.pin_min", &[("label", "PIN"), ("min", "4")]),
///     "The PIN must be at least 4 digits."
/// );
/// ```
pub fn message(key: &str, params: &[(&str, &str)]) -> String {
    let (field, rule) = key.split_once('.').unwrap_or((key, ""));
    let template = SPECIFIC
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, text)| *text)
        .unwrap_or_else(|| generic(rule));

    let mut text = template.replace("{attribute}", &field.replace('_', " "));
    for (name, value) in params {
        text = text.replace(&format!("{{{name}}}"), value);
    }
    text
}
