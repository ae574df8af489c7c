use super::FormType;

/// How a single field is checked.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Rule {
    /// Accepted as-is, may be empty.
    Optional,
    /// Must be non-empty after trimming.
    Required(&'static str),
    /// Must parse as an email address.
    Email(&'static str),
    /// Must contain at least ten digits.
    Phone(&'static str),
    /// Multi-valued, may be empty.
    List,
}

#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub rule: Rule,
}

const fn field(name: &'static str, rule: Rule) -> FieldSpec {
    FieldSpec { name, rule }
}

pub const ANSWER_FIELD: &str = "math_answer";
pub const ANSWER_ERROR: &str = "Incorrect math answer";

const CONTACT: &[FieldSpec] = &[
    field("first_name", Rule::Required("First name is required")),
    field("last_name", Rule::Required("Last name is required")),
    field("email", Rule::Email("Valid email is required")),
    field("phone", Rule::Phone("Valid phone number is required")),
    field("message", Rule::Required("Message is required")),
];

const REFERRAL: &[FieldSpec] = &[
    field("referrer_name", Rule::Required("Referrer name is required")),
    field("organization", Rule::Optional),
    field("referrer_phone", Rule::Phone("Valid referrer phone is required")),
    field("referrer_email", Rule::Email("Valid referrer email is required")),
    field("participant_name", Rule::Required("Participant name is required")),
    field(
        "relationship",
        Rule::Required("Relationship to participant is required"),
    ),
    field("participant_phone", Rule::Optional),
    field("participant_email", Rule::Optional),
    field("address", Rule::Required("Address is required")),
    field("reason", Rule::Required("Reason for referral is required")),
    field("services_needed", Rule::List),
    field("additional_details", Rule::Optional),
];

const COMPLAINT: &[FieldSpec] = &[
    field("first_name", Rule::Required("First name is required")),
    field("last_name", Rule::Required("Last name is required")),
    field("email", Rule::Email("Valid email is required")),
    field("phone", Rule::Phone("Valid phone number is required")),
    field("complaint", Rule::Required("Complaint details are required")),
];

/// Fields of a form in the order they are rendered and stored.
pub fn fields_for(form_type: FormType) -> &'static [FieldSpec] {
    match form_type {
        FormType::Contact => CONTACT,
        FormType::Referral => REFERRAL,
        FormType::Complaint => COMPLAINT,
    }
}
