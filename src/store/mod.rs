//! Per-client state kept between requests (rate-limit windows, session tokens).
//!
//! Everything goes through [`StateStore`] so the request path never touches
//! process-global mutable state directly.

pub mod file;
pub mod memory;

use std::time::Duration;

use async_trait::async_trait;

pub use file::FileStore;
pub use memory::MemoryStore;

/// Every this many writes, a store drops its expired entries.
///
/// Keys nobody reads again (abandoned sessions, clients that never return)
/// would otherwise stay forever.
pub const SWEEP_INTERVAL: u64 = 64;

#[derive(Debug)]
pub enum StoreError {
    Io(std::io::Error),
    Corrupt(String),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Io(err) => write!(f, "I/O error: {err}"),
            StoreError::Corrupt(msg) => write!(f, "Corrupt entry: {msg}"),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError::Io(err)
    }
}

/// Key-value storage with per-entry expiry.
///
/// Expired entries read as absent.
#[async_trait]
pub trait StateStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), StoreError>;
    async fn remove(&self, key: &str) -> Result<(), StoreError>;
}
