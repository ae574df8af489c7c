use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::store::StoreError;

/// Client-facing failures of the form endpoint.
///
/// Infrastructure failures (mail, persistence) never reach this type; they are
/// logged where they happen and the request carries on.
#[derive(Debug)]
pub enum AppError {
    MethodNotAllowed,
    Forbidden(String),
    BadRequest(String),
    Validation(Vec<String>),
    RateLimited { retry_after: u64 },
    Internal(String),
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppError::MethodNotAllowed => write!(f, "Method Not Allowed"),
            AppError::Forbidden(msg) => write!(f, "Forbidden: {msg}"),
            AppError::BadRequest(msg) => write!(f, "Bad Request: {msg}"),
            AppError::Validation(errors) => write!(f, "Validation failed: {}", errors.join("; ")),
            AppError::RateLimited { retry_after } => {
                write!(f, "Rate Limited: retry after {retry_after}s")
            }
            AppError::Internal(msg) => write!(f, "Internal Error: {msg}"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message, errors) = match &self {
            AppError::MethodNotAllowed => (
                StatusCode::METHOD_NOT_ALLOWED,
                "Invalid request method".to_string(),
                Vec::new(),
            ),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.clone(), Vec::new()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone(), Vec::new()),
            AppError::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                "Validation failed".to_string(),
                errors.clone(),
            ),
            AppError::RateLimited { .. } => (
                StatusCode::TOO_MANY_REQUESTS,
                "Too many submissions. Please try again later.".to_string(),
                Vec::new(),
            ),
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                    Vec::new(),
                )
            }
        };

        let body = json!({
            "success": false,
            "message": message,
            "errors": errors,
        });
        let mut response = (status, axum::Json(body)).into_response();

        if let AppError::RateLimited { retry_after } = self {
            if let Ok(value) = HeaderValue::from_str(&retry_after.to_string()) {
                response.headers_mut().insert(header::RETRY_AFTER, value);
            }
        }

        response
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        AppError::Internal(format!("State store error: {err}"))
    }
}
