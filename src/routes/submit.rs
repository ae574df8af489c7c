use std::net::{IpAddr, SocketAddr};

use axum::Json;
use axum::body::Bytes;
use axum::extract::{ConnectInfo, State};
use axum::http::HeaderMap;
use axum_extra::extract::CookieJar;
use serde::Serialize;

use crate::error::AppError;
use crate::session::SESSION_COOKIE;
use crate::state::SharedState;
use crate::submission::pipeline::{self, PipelineResult};
use crate::submission::{metadata, parser};

pub const SUCCESS_MESSAGE: &str =
    "Thank you! Your submission has been received. We will contact you within 24 hours.";

#[derive(Serialize)]
pub struct SubmitResponse {
    pub success: bool,
    pub message: String,
}

pub async fn submit(
    State(state): State<SharedState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    jar: CookieJar,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<SubmitResponse>, AppError> {
    // Parse body
    let content_type = headers
        .get("content-type")
        .and_then(|v| v.to_str().ok());

    let session_id = jar.get(SESSION_COOKIE).map(|c| c.value().to_string());

    let decoded = if content_type.is_some_and(|ct| ct.contains("multipart/form-data")) {
        parser::parse_multipart(&headers, body).await
    } else {
        parser::parse_body(content_type, &body)
    };

    let raw = match decoded {
        Ok(raw) => raw,
        // Without a session there can be no valid token in any body
        Err(_) if session_id.is_none() => return Err(pipeline::invalid_token()),
        Err(e) => return Err(AppError::BadRequest(format!("Invalid request body: {e}"))),
    };

    let peer_ip: Option<IpAddr> = Some(addr.ip());
    let meta = metadata::extract(&headers, peer_ip, &state.config.trusted_proxies);

    // Spam is answered exactly like a success
    match pipeline::run(&state, session_id.as_deref(), meta, raw).await? {
        PipelineResult::Accepted(submission) => tracing::info!(
            "Accepted {} submission {} from {}",
            submission.form_type,
            submission.id,
            submission.client_ip
        ),
        PipelineResult::Spam => {}
    }

    Ok(Json(SubmitResponse {
        success: true,
        message: SUCCESS_MESSAGE.to_string(),
    }))
}

pub async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}
