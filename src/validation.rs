//! Shared messages and helpers for validating submitted forms.

/// The message shown next to a form field that was left empty.
pub const REQUIRED_FIELD_MSG: &str = "This field is required.";

/// Trim `value` and return it, or [REQUIRED_FIELD_MSG] if nothing is left.
pub fn required(value: &str) -> Result<&str, &'static str> {
    let value = value.trim();

    if value.is_empty() {
        Err(REQUIRED_FIELD_MSG)
    } else {
        Ok(value)
    }
}
