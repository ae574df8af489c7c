pub mod submissions;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use crate::models::Submission;

/// Destination for accepted submissions.
#[async_trait]
pub trait SubmissionSink: Send + Sync {
    async fn save(&self, submission: &Submission) -> Result<(), String>;
}

pub struct PgSubmissionStore {
    pool: PgPool,
}

impl PgSubmissionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SubmissionSink for PgSubmissionStore {
    async fn save(&self, submission: &Submission) -> Result<(), String> {
        submissions::create(&self.pool, submission)
            .await
            .map_err(|e| format!("Database insert failed: {e}"))
    }
}

/// Whether accepted submissions are stored, and why not.
pub enum Persistence {
    /// No database configured.
    Disabled,
    /// Configured, but unreachable when the server started.
    Unavailable(String),
    Enabled(Arc<dyn SubmissionSink>),
}

impl Persistence {
    /// Connect and migrate. Failure yields `Unavailable` rather than an error so
    /// the form keeps working without storage.
    pub async fn connect(database_url: Option<&str>) -> Self {
        let Some(url) = database_url else {
            tracing::info!("DATABASE_URL not set, submissions will not be stored");
            return Persistence::Disabled;
        };

        let pool = match PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(5))
            .connect(url)
            .await
        {
            Ok(pool) => pool,
            Err(e) => {
                let reason = format!("Database connection failed: {e}");
                tracing::error!("{reason}");
                return Persistence::Unavailable(reason);
            }
        };

        if let Err(e) = sqlx::migrate!("./migrations").run(&pool).await {
            let reason = format!("Database migrations failed: {e}");
            tracing::error!("{reason}");
            return Persistence::Unavailable(reason);
        }

        tracing::info!("Migrations applied");
        Persistence::Enabled(Arc::new(PgSubmissionStore::new(pool)))
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Persistence::Unavailable(_))
    }

    /// Best-effort save. Failures are logged and swallowed.
    pub async fn save(&self, submission: &Submission) {
        let Persistence::Enabled(sink) = self else {
            return;
        };

        if let Err(e) = sink.save(submission).await {
            tracing::error!(
                "Failed to store {} submission {}: {e}",
                submission.form_type,
                submission.id
            );
        }
    }
}
