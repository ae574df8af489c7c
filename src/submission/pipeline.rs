use chrono::Utc;
use uuid::Uuid;

use crate::error::AppError;
use crate::forms::sanitize::sanitize;
use crate::forms::{self, FormType, RawFields};
use crate::models::Submission;
use crate::state::SharedState;

use super::honeypot;
use super::metadata::ClientMeta;

pub const TOKEN_FIELD: &str = "csrf_token";
pub const FORM_TYPE_FIELD: &str = "form_type";

pub enum PipelineResult {
    Accepted(Submission),
    /// Honeypot tripped; answered like a success with no side effects.
    Spam,
}

/// Token check, rate limit, honeypot, validation, then mail and storage.
pub async fn run(
    state: &SharedState,
    session_id: Option<&str>,
    meta: ClientMeta,
    raw: RawFields,
) -> Result<PipelineResult, AppError> {
    if !state
        .sessions
        .verify(session_id, raw.text(TOKEN_FIELD))
        .await
    {
        tracing::warn!("Rejected submission from {} with invalid security token", meta.ip);
        return Err(invalid_token());
    }

    if let Err(retry_after) = state.submission_limiter.check(&meta.ip).await {
        tracing::warn!("Rate limited submission from {}", meta.ip);
        return Err(AppError::RateLimited { retry_after });
    }

    if honeypot::is_spam(&raw, state.config.honeypot_field.as_deref()) {
        tracing::debug!("Honeypot filled, discarding submission from {}", meta.ip);
        return Ok(PipelineResult::Spam);
    }

    let form_type = resolve_form_type(&raw)?;

    let (fields, errors) = forms::validate(form_type, &raw);
    if !errors.is_empty() {
        tracing::debug!("Validation failed for {form_type} form: {errors:?}");
        return Err(AppError::Validation(errors));
    }

    let submission = Submission {
        id: Uuid::now_v7(),
        form_type,
        fields,
        submitted_at: Utc::now(),
        client_ip: meta.ip,
        user_agent: meta.user_agent,
    };

    state.notifier.deliver(&submission).await;
    state.persistence.save(&submission).await;

    Ok(PipelineResult::Accepted(submission))
}

pub fn invalid_token() -> AppError {
    AppError::Forbidden("Invalid security token. Please refresh and try again.".to_string())
}

/// An absent `form_type` means the contact form. A present value, even an
/// empty one, must name a known form.
fn resolve_form_type(raw: &RawFields) -> Result<FormType, AppError> {
    let Some(requested) = raw.text(FORM_TYPE_FIELD) else {
        return Ok(FormType::Contact);
    };

    sanitize(requested)
        .parse()
        .map_err(|_| AppError::BadRequest("Invalid form type".to_string()))
}
