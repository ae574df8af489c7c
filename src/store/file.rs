use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use super::{SWEEP_INTERVAL, StateStore, StoreError};

/// One JSON file per key under a directory.
///
/// File names are the SHA-256 of the key, so client addresses never appear on
/// disk. Writes go through a temporary file and a rename.
pub struct FileStore {
    dir: PathBuf,
    writes: AtomicU64,
}

#[derive(Serialize, Deserialize)]
struct Entry {
    value: String,
    /// Unix timestamp in milliseconds.
    expires_at: i64,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            writes: AtomicU64::new(0),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Delete every expired entry file. Returns how many were removed.
    ///
    /// Unreadable files are left for `get` to report.
    pub async fn sweep(&self) -> Result<usize, StoreError> {
        let mut dir = match tokio::fs::read_dir(&self.dir).await {
            Ok(dir) => dir,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(e.into()),
        };

        let now = Utc::now().timestamp_millis();
        let mut removed = 0;
        while let Some(item) = dir.next_entry().await? {
            let path = item.path();
            if path.extension().is_none_or(|ext| ext != "json") {
                continue;
            }

            let expired = match tokio::fs::read_to_string(&path).await {
                Ok(contents) => serde_json::from_str::<Entry>(&contents)
                    .is_ok_and(|entry| entry.expires_at <= now),
                Err(_) => false,
            };
            if !expired {
                continue;
            }

            match tokio::fs::remove_file(&path).await {
                Ok(()) => removed += 1,
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => tracing::warn!("Failed to remove expired entry {}: {e}", path.display()),
            }
        }

        Ok(removed)
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let digest = Sha256::digest(key.as_bytes());
        self.dir.join(format!("{}.json", hex::encode(digest)))
    }
}

#[async_trait]
impl StateStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(key);

        let contents = match tokio::fs::read_to_string(&path).await {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let entry: Entry = serde_json::from_str(&contents)
            .map_err(|e| StoreError::Corrupt(format!("{}: {e}", path.display())))?;

        if entry.expires_at <= Utc::now().timestamp_millis() {
            match tokio::fs::remove_file(&path).await {
                Ok(()) => {}
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => tracing::warn!("Failed to remove expired entry {}: {e}", path.display()),
            }
            return Ok(None);
        }

        Ok(Some(entry.value))
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), StoreError> {
        tokio::fs::create_dir_all(&self.dir).await?;

        let ttl_ms = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX);
        let entry = Entry {
            value,
            expires_at: Utc::now().timestamp_millis().saturating_add(ttl_ms),
        };
        let json = serde_json::to_string(&entry)
            .map_err(|e| StoreError::Corrupt(format!("Failed to encode entry: {e}")))?;

        let path = self.path_for(key);
        let tmp = path.with_extension(format!("{}.tmp", Uuid::now_v7().simple()));
        tokio::fs::write(&tmp, json).await?;
        if let Err(e) = tokio::fs::rename(&tmp, &path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(e.into());
        }

        if (self.writes.fetch_add(1, Ordering::Relaxed) + 1) % SWEEP_INTERVAL == 0 {
            match self.sweep().await {
                Ok(0) => {}
                Ok(n) => tracing::debug!("Swept {n} expired entries from {}", self.dir.display()),
                Err(e) => tracing::warn!("Failed to sweep {}: {e}", self.dir.display()),
            }
        }

        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        match tokio::fs::remove_file(self.path_for(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
