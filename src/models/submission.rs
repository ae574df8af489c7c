use chrono::{DateTime, Utc};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use uuid::Uuid;

use crate::forms::FormType;

/// A submitted value: a single string or a multi-select list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    List(Vec<String>),
}

impl FieldValue {
    /// Display form used in mail bodies: lists are comma-joined.
    pub fn display(&self) -> String {
        match self {
            FieldValue::Text(s) => s.clone(),
            FieldValue::List(items) => items.join(", "),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            FieldValue::List(_) => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Text(s) => s.is_empty(),
            FieldValue::List(items) => items.iter().all(|s| s.is_empty()),
        }
    }
}

/// Trimmed, escaped fields in form order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedFields {
    entries: Vec<(String, FieldValue)>,
}

impl NormalizedFields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: &str, value: FieldValue) {
        match self.entries.iter_mut().find(|(n, _)| n == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name.to_string(), value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    /// Text value of a field, `None` when absent or empty.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.get(name)
            .and_then(FieldValue::as_text)
            .filter(|s| !s.is_empty())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The submitter's own address: `email`, else `referrer_email`.
    pub fn reply_address(&self) -> Option<&str> {
        self.text("email").or_else(|| self.text("referrer_email"))
    }

    /// Name used to greet the submitter.
    pub fn greeting_name(&self) -> Option<&str> {
        self.text("first_name")
            .or_else(|| self.text("referrer_name"))
    }
}

impl Serialize for NormalizedFields {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// A validated form submission. Built once per request and never mutated.
#[derive(Debug, Clone, Serialize)]
pub struct Submission {
    pub id: Uuid,
    pub form_type: FormType,
    pub fields: NormalizedFields,
    pub submitted_at: DateTime<Utc>,
    pub client_ip: String,
    pub user_agent: String,
}
