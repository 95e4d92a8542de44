/// Canonical form of an email/phone identifier: trimmed and lowercased.
/// Absent input normalizes to the empty string.
#[must_use]
pub fn normalize(raw: Option<&str>) -> String {
    raw.map(|value| value.trim().to_lowercase())
        .unwrap_or_default()
}

/// Signup accepts either an email or a phone number; the email wins unless it
/// is absent or empty.
#[must_use]
pub fn signup_identifier(email: Option<&str>, phone: Option<&str>) -> String {
    normalize(email.filter(|value| !value.is_empty()).or(phone))
}
