use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tokio::sync::Mutex;

use crate::config::RateLimitConfig;
use crate::store::{StateStore, StoreError};

/// Per-client submission rate limiter using a sliding window.
///
/// Each client identity owns a record of submission timestamps (unix seconds)
/// in the state store. Checks for the same client are serialized so the
/// load-prune-append-persist cycle cannot hand out the last slot twice.
pub struct SubmissionRateLimiter {
    store: Arc<dyn StateStore>,
    config: RateLimitConfig,
    /// client -> lock held across one read-modify-write of its record
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl SubmissionRateLimiter {
    pub fn new(store: Arc<dyn StateStore>, config: RateLimitConfig) -> Self {
        Self {
            store,
            config,
            locks: DashMap::new(),
        }
    }

    /// Check if a submission from `client` is allowed now. Returns Ok(()) or Err
    /// with retry-after seconds.
    pub async fn check(&self, client: &str) -> Result<(), u64> {
        self.check_at(client, Utc::now()).await
    }

    /// Same as [`check`](Self::check) with an explicit clock.
    ///
    /// State store failures are logged and the submission is allowed.
    pub async fn check_at(&self, client: &str, now: DateTime<Utc>) -> Result<(), u64> {
        let lock = self
            .locks
            .entry(client.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();

        let outcome = {
            let _guard = lock.lock().await;
            self.record(client, now.timestamp()).await
        };

        drop(lock);
        self.locks
            .remove_if(client, |_, lock| Arc::strong_count(lock) == 1);

        match outcome {
            Ok(decision) => decision,
            Err(e) => {
                tracing::error!("Rate limit store unavailable for {client}: {e}");
                Ok(())
            }
        }
    }

    async fn record(&self, client: &str, now: i64) -> Result<Result<(), u64>, StoreError> {
        let key = record_key(client);
        let window = self.config.window_secs as i64;
        let cutoff = now - window;

        let mut timestamps: Vec<i64> = match self.store.get(&key).await? {
            Some(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                tracing::warn!("Discarding unreadable rate limit record for {client}: {e}");
                Vec::new()
            }),
            None => Vec::new(),
        };

        timestamps.retain(|ts| *ts > cutoff);
        timestamps.sort_unstable();

        if timestamps.len() >= self.config.max_submissions as usize {
            let oldest = timestamps.first().copied().unwrap_or(now);
            let retry_after = (oldest + window - now).max(1) as u64;
            return Ok(Err(retry_after));
        }

        timestamps.push(now);
        let encoded = serde_json::to_string(&timestamps)
            .map_err(|e| StoreError::Corrupt(format!("Failed to encode rate limit record: {e}")))?;
        self.store
            .set(&key, encoded, Duration::from_secs(self.config.window_secs))
            .await?;

        Ok(Ok(()))
    }
}

fn record_key(client: &str) -> String {
    format!("rate:{client}")
}
