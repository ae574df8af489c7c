use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::db::Persistence;
use crate::email::{MailTransport, Notifier};
use crate::rate_limit::SubmissionRateLimiter;
use crate::session::SessionTokens;
use crate::store::StateStore;

pub type SharedState = Arc<AppState>;

pub struct AppState {
    pub config: Config,
    pub sessions: SessionTokens,
    pub submission_limiter: SubmissionRateLimiter,
    pub notifier: Notifier,
    pub persistence: Persistence,
}

impl AppState {
    pub fn new(
        config: Config,
        store: Arc<dyn StateStore>,
        mailer: Arc<dyn MailTransport>,
        persistence: Persistence,
    ) -> Self {
        Self {
            sessions: SessionTokens::new(
                store.clone(),
                Duration::from_secs(config.session_ttl_secs),
            ),
            submission_limiter: SubmissionRateLimiter::new(store, config.rate_limit.clone()),
            notifier: Notifier::new(mailer, config.site.clone()),
            persistence,
            config,
        }
    }
}
