use std::sync::Arc;
use std::time::Duration;

use subtle::ConstantTimeEq;

use crate::store::{StateStore, StoreError};

pub const SESSION_COOKIE: &str = "formdesk_session";

/// Anti-forgery tokens bound to a browser session.
///
/// The session id travels in a cookie; the token is handed to the page and
/// must come back in the `csrf_token` form field.
pub struct SessionTokens {
    store: Arc<dyn StateStore>,
    ttl: Duration,
}

pub struct IssuedToken {
    pub session_id: String,
    pub token: String,
}

impl SessionTokens {
    pub fn new(store: Arc<dyn StateStore>, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Return the token for an existing session, or start a new session.
    /// Either way the session's expiry is pushed out by one TTL.
    pub async fn issue(&self, session_id: Option<&str>) -> Result<IssuedToken, StoreError> {
        if let Some(session_id) = session_id.filter(|id| is_well_formed(id)) {
            if let Some(token) = self.store.get(&token_key(session_id)).await? {
                self.store
                    .set(&token_key(session_id), token.clone(), self.ttl)
                    .await?;
                return Ok(IssuedToken {
                    session_id: session_id.to_string(),
                    token,
                });
            }
        }

        let session_id = random_hex();
        let token = random_hex();
        self.store
            .set(&token_key(&session_id), token.clone(), self.ttl)
            .await?;

        tracing::debug!("Started form session");

        Ok(IssuedToken { session_id, token })
    }

    /// Compare the submitted token against the session's token in constant time.
    /// Missing session, missing token, and store failures all fail closed.
    pub async fn verify(&self, session_id: Option<&str>, submitted: Option<&str>) -> bool {
        let (Some(session_id), Some(submitted)) = (session_id, submitted) else {
            return false;
        };

        if !is_well_formed(session_id) || submitted.is_empty() {
            return false;
        }

        let expected = match self.store.get(&token_key(session_id)).await {
            Ok(Some(token)) => token,
            Ok(None) => return false,
            Err(e) => {
                tracing::error!("Failed to load session token: {e}");
                return false;
            }
        };

        expected.as_bytes().ct_eq(submitted.as_bytes()).into()
    }
}

fn token_key(session_id: &str) -> String {
    format!("csrf:{session_id}")
}

fn random_hex() -> String {
    let bytes: [u8; 32] = rand::random();
    hex::encode(bytes)
}

fn is_well_formed(session_id: &str) -> bool {
    session_id.len() == 64 && session_id.bytes().all(|b| b.is_ascii_hexdigit())
}
