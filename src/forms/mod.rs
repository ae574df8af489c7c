//! Form definitions, input sanitizing, and validation.

pub mod sanitize;
pub mod schema;
pub mod validate;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::models::FieldValue;

pub use validate::validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormType {
    Contact,
    Referral,
    Complaint,
}

impl FormType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FormType::Contact => "contact",
            FormType::Referral => "referral",
            FormType::Complaint => "complaint",
        }
    }

    /// Expected value of the `math_answer` field.
    pub fn expected_answer(&self) -> &'static str {
        match self {
            FormType::Contact | FormType::Complaint => "4",
            FormType::Referral => "5",
        }
    }

    pub fn notice_subject(&self, site_name: &str) -> String {
        match self {
            FormType::Contact => format!("New Contact Form Submission - {site_name}"),
            FormType::Referral => format!("New Referral Submission - {site_name}"),
            FormType::Complaint => format!("New Complaint Submission - {site_name}"),
        }
    }
}

impl std::fmt::Display for FormType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for FormType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "contact" => Ok(FormType::Contact),
            "referral" => Ok(FormType::Referral),
            "complaint" => Ok(FormType::Complaint),
            other => Err(format!("Unknown form type: {other}")),
        }
    }
}

/// Fields as decoded from the request body, before sanitizing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawFields {
    values: HashMap<String, FieldValue>,
}

impl RawFields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a single-valued field. A later value replaces an earlier one.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values
            .insert(name.into(), FieldValue::Text(value.into()));
    }

    /// Append to a list field, converting a single value into a list.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let value = value.into();
        let entry = self
            .values
            .entry(name.into())
            .or_insert_with(|| FieldValue::List(Vec::new()));
        if let FieldValue::Text(existing) = entry {
            let first = std::mem::take(existing);
            *entry = FieldValue::List(vec![first]);
        }
        if let FieldValue::List(items) = entry {
            items.push(value);
        }
    }

    /// Insert a decoded key, treating a `name[]` suffix as a list field.
    pub fn insert_pair(&mut self, key: &str, value: impl Into<String>) {
        match key.strip_suffix("[]") {
            Some(name) => self.push(name, value),
            None => self.set(key, value),
        }
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.values.get(name)
    }

    /// Single value of a field. Lists yield their first element.
    pub fn text(&self, name: &str) -> Option<&str> {
        match self.values.get(name)? {
            FieldValue::Text(s) => Some(s),
            FieldValue::List(items) => items.first().map(String::as_str),
        }
    }

    /// List value of a field. A single non-empty value becomes a one-item list.
    pub fn list(&self, name: &str) -> Vec<String> {
        match self.values.get(name) {
            Some(FieldValue::List(items)) => items.clone(),
            Some(FieldValue::Text(s)) if !s.trim().is_empty() => vec![s.clone()],
            _ => Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RawFields {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut raw = RawFields::new();
        for (k, v) in iter {
            let key: String = k.into();
            raw.insert_pair(&key, v);
        }
        raw
    }
}
