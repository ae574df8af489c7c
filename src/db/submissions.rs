use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::Submission;

/// A stored row of `form_submissions`.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SubmissionRow {
    pub id: Uuid,
    pub form_type: String,
    pub data: serde_json::Value,
    pub ip_address: String,
    pub user_agent: String,
    pub submitted_at: DateTime<Utc>,
}

pub async fn create(pool: &PgPool, submission: &Submission) -> Result<(), sqlx::Error> {
    let data = serde_json::to_value(&submission.fields)
        .map_err(|e| sqlx::Error::Encode(Box::new(e)))?;

    sqlx::query(
        "INSERT INTO form_submissions (id, form_type, data, ip_address, user_agent, submitted_at)
         VALUES ($1, $2, $3, $4, $5, $6)",
    )
    .bind(submission.id)
    .bind(submission.form_type.as_str())
    .bind(data)
    .bind(&submission.client_ip)
    .bind(&submission.user_agent)
    .bind(submission.submitted_at)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<SubmissionRow>, sqlx::Error> {
    sqlx::query_as::<_, SubmissionRow>("SELECT * FROM form_submissions WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}
