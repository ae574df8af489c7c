use askama::Template;

use crate::config::{OfficePhone, SiteConfig};
use crate::models::Submission;

struct FieldRow {
    label: String,
    /// Already escaped during sanitizing; rendered verbatim.
    value: String,
}

#[derive(Template)]
#[template(path = "email/operator_notice.html")]
struct OperatorNoticeTemplate<'a> {
    subject: &'a str,
    rows: Vec<FieldRow>,
    submitted_at: String,
    client_ip: &'a str,
}

#[derive(Template)]
#[template(path = "email/confirmation.html")]
struct ConfirmationTemplate<'a> {
    /// Already escaped during sanitizing; rendered verbatim.
    name: &'a str,
    site_name: &'a str,
    office_phones: &'a [OfficePhone],
}

pub fn render_operator_notice(submission: &Submission, subject: &str) -> Result<String, String> {
    let rows = submission
        .fields
        .iter()
        .map(|(name, value)| FieldRow {
            label: field_label(name),
            value: nl2br(&value.display()),
        })
        .collect();

    OperatorNoticeTemplate {
        subject,
        rows,
        submitted_at: submission
            .submitted_at
            .format("%B %-d, %Y %-I:%M %p UTC")
            .to_string(),
        client_ip: &submission.client_ip,
    }
    .render()
    .map_err(|e| format!("Failed to render operator notice: {e}"))
}

pub fn render_confirmation(submission: &Submission, site: &SiteConfig) -> Result<String, String> {
    ConfirmationTemplate {
        name: submission
            .fields
            .greeting_name()
            .unwrap_or("Valued Contact"),
        site_name: &site.name,
        office_phones: &site.office_phones,
    }
    .render()
    .map_err(|e| format!("Failed to render confirmation: {e}"))
}

/// `participant_email` -> `Participant Email`
pub fn field_label(name: &str) -> String {
    name.split('_')
        .filter(|w| !w.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn nl2br(value: &str) -> String {
    value.replace("\r\n", "\n").replace('\n', "<br>\n")
}
