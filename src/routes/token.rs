use axum::Json;
use axum::extract::State;
use axum_extra::extract::CookieJar;
use axum_extra::extract::cookie::{Cookie, SameSite};
use serde::Serialize;

use crate::error::AppError;
use crate::session::SESSION_COOKIE;
use crate::state::SharedState;

#[derive(Serialize)]
pub struct TokenResponse {
    pub csrf_token: String,
}

/// Hand out the anti-forgery token for the caller's session, starting one if needed.
pub async fn issue(
    State(state): State<SharedState>,
    jar: CookieJar,
) -> Result<(CookieJar, Json<TokenResponse>), AppError> {
    let existing = jar.get(SESSION_COOKIE).map(|c| c.value().to_string());
    let issued = state.sessions.issue(existing.as_deref()).await?;

    let max_age = time::Duration::seconds(
        i64::try_from(state.sessions.ttl().as_secs()).unwrap_or(i64::MAX),
    );
    let cookie = Cookie::build((SESSION_COOKIE, issued.session_id))
        .path("/")
        .http_only(true)
        .secure(state.config.secure_cookies)
        .same_site(SameSite::Lax)
        .max_age(max_age)
        .build();

    Ok((
        jar.add(cookie),
        Json(TokenResponse {
            csrf_token: issued.token,
        }),
    ))
}
