pub mod config;
pub mod db;
pub mod email;
pub mod error;
pub mod forms;
pub mod logging;
pub mod models;
pub mod rate_limit;
pub mod routes;
pub mod session;
pub mod state;
pub mod store;
pub mod submission;

use std::sync::Arc;

use axum::Router;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::{HeaderName, HeaderValue, Method, header};
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::config::{Config, StateBackend};
use crate::email::{DisabledMailer, MailTransport, SmtpMailer};
use crate::state::{AppState, SharedState};
use crate::store::{FileStore, MemoryStore, StateStore};

/// Build the state store selected by configuration.
pub fn build_store(config: &Config) -> Arc<dyn StateStore> {
    match &config.state_backend {
        StateBackend::Memory => Arc::new(MemoryStore::new()),
        StateBackend::File(dir) => Arc::new(FileStore::new(dir.clone())),
    }
}

/// Build the mail transport. Without SMTP settings every message is dropped
/// and logged.
pub fn build_mailer(config: &Config) -> Arc<dyn MailTransport> {
    let Some(smtp) = config.smtp.as_ref() else {
        tracing::warn!("SMTP not configured, notification emails will not be sent");
        return Arc::new(DisabledMailer);
    };

    match SmtpMailer::new(smtp, &config.site.mail_from) {
        Ok(mailer) => {
            tracing::info!("SMTP configured ({}:{})", smtp.host, smtp.port);
            Arc::new(mailer)
        }
        Err(e) => {
            tracing::error!("SMTP not available: {e}");
            Arc::new(DisabledMailer)
        }
    }
}

pub fn build_app(state: AppState) -> Router {
    let state: SharedState = Arc::new(state);
    let max_body_size = state.config.max_body_size;
    let cors = cors_layer(&state.config.allowed_origins);

    let app = Router::new()
        .merge(routes::form_routes())
        .route("/health", axum::routing::get(health))
        .layer(DefaultBodyLimit::disable())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(SetResponseHeaderLayer::overriding(
                    HeaderName::from_static("x-content-type-options"),
                    HeaderValue::from_static("nosniff"),
                ))
                .layer(SetResponseHeaderLayer::overriding(
                    HeaderName::from_static("x-frame-options"),
                    HeaderValue::from_static("DENY"),
                ))
                .layer(SetResponseHeaderLayer::overriding(
                    HeaderName::from_static("referrer-policy"),
                    HeaderValue::from_static("strict-origin-when-cross-origin"),
                ))
                .layer(RequestBodyLimitLayer::new(max_body_size)),
        );

    let app = match cors {
        Some(cors) => app.layer(cors),
        None => app,
    };

    app.with_state(state)
}

fn cors_layer(origins: &[String]) -> Option<CorsLayer> {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(v) => Some(v),
            Err(e) => {
                tracing::warn!("Ignoring invalid CORS origin '{o}': {e}");
                None
            }
        })
        .collect();

    if origins.is_empty() {
        return None;
    }

    Some(
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods([Method::GET, Method::POST])
            .allow_headers([header::CONTENT_TYPE])
            .allow_credentials(true),
    )
}

async fn health(State(state): State<SharedState>) -> &'static str {
    if state.persistence.is_degraded() {
        "degraded"
    } else {
        "ok"
    }
}
