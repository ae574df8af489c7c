pub mod submit;
pub mod token;

use axum::Router;
use axum::routing::{get, post};

use crate::state::SharedState;

pub fn form_routes() -> Router<SharedState> {
    Router::new()
        .route(
            "/api/v1/forms",
            post(submit::submit).fallback(submit::method_not_allowed),
        )
        .route(
            "/api/v1/forms/token",
            get(token::issue).fallback(submit::method_not_allowed),
        )
}
