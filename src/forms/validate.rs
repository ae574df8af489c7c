use std::sync::LazyLock;

use regex::Regex;

use crate::models::{FieldValue, NormalizedFields};

use super::sanitize::{sanitize, sanitize_list};
use super::schema::{self, ANSWER_ERROR, ANSWER_FIELD, Rule};
use super::{FormType, RawFields};

static NON_DIGIT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^0-9]").unwrap());

const MIN_PHONE_DIGITS: usize = 10;

/// Sanitize and check every field of `form_type`.
///
/// All failures are collected; an empty error list means the submission is
/// accepted. The anti-automation answer is checked but not carried into the
/// normalized fields.
pub fn validate(form_type: FormType, raw: &RawFields) -> (NormalizedFields, Vec<String>) {
    let mut fields = NormalizedFields::new();
    let mut errors = Vec::new();

    for spec in schema::fields_for(form_type) {
        let value = match spec.rule {
            Rule::List => FieldValue::List(sanitize_list(&raw.list(spec.name))),
            _ => FieldValue::Text(sanitize(raw.text(spec.name).unwrap_or_default())),
        };

        let text = value.as_text().unwrap_or_default();
        let failure = match spec.rule {
            Rule::Required(msg) if text.is_empty() => Some(msg),
            Rule::Email(msg) if !is_valid_email(text) => Some(msg),
            Rule::Phone(msg) if !is_valid_phone(text) => Some(msg),
            _ => None,
        };
        if let Some(msg) = failure {
            errors.push(msg.to_string());
        }

        fields.insert(spec.name, value);
    }

    let answer = sanitize(raw.text(ANSWER_FIELD).unwrap_or_default());
    if answer != form_type.expected_answer() {
        errors.push(ANSWER_ERROR.to_string());
    }

    (fields, errors)
}

/// RFC 5322 address check.
pub fn is_valid_email(email: &str) -> bool {
    !email.is_empty() && email.parse::<lettre::Address>().is_ok()
}

/// At least ten digits once punctuation and spaces are stripped.
pub fn is_valid_phone(phone: &str) -> bool {
    NON_DIGIT_RE.replace_all(phone, "").len() >= MIN_PHONE_DIGITS
}
