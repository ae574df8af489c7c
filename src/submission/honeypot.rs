use crate::forms::RawFields;

/// Check if the honeypot field is filled. Returns true if spam detected.
pub fn is_spam(raw: &RawFields, honeypot_field: Option<&str>) -> bool {
    let Some(field) = honeypot_field.filter(|f| !f.is_empty()) else {
        return false;
    };

    raw.get(field).is_some_and(|value| !value.is_empty())
}
